//! MongoDB personality store.

use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document, doc, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

use super::validate_identifier;
use crate::domain::error::BotError;
use crate::domain::personality::PersonalityRecord;
use crate::domain::traits::PersonalityStore;

const PERSONALITY_COLLECTION: &str = "personalities";

pub struct MongoStore {
    client: Client,
    database: String,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, BotError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| BotError::config(format!("failed to parse MongoDB URI: {e}")))?;
        options.app_name = Some("marsbot".to_string());

        let client = Client::with_options(options)
            .map_err(|e| BotError::Store(format!("failed to create MongoDB client: {e}")))?;

        Ok(Self {
            client,
            database: database.to_string(),
        })
    }

    fn collection(&self) -> Collection<Document> {
        self.client
            .database(&self.database)
            .collection(PERSONALITY_COLLECTION)
    }
}

/// Filter on `_id` as an ObjectId when the identifier parses as one.
fn id_filter(id: &str) -> Document {
    match ObjectId::parse_str(id) {
        Ok(oid) => doc! { "_id": oid },
        Err(_) => doc! { "_id": id },
    }
}

/// Project a stored document onto the record schema. Unknown fields are dropped;
/// missing required fields are configuration errors.
pub fn project(mut document: Document) -> Result<PersonalityRecord, BotError> {
    let id = match document.remove("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(id)) => id,
        Some(other) => other.to_string(),
        None => return Err(BotError::config("stored personality has no _id")),
    };
    document.insert("id", id);

    bson::from_document(document)
        .map_err(|e| BotError::config(format!("invalid stored personality: {e}")))
}

#[async_trait]
impl PersonalityStore for MongoStore {
    async fn load(&self, id: &str) -> Result<PersonalityRecord, BotError> {
        validate_identifier(id)?;
        let document = self
            .collection()
            .find_one(id_filter(id), None)
            .await
            .map_err(|e| BotError::Store(e.to_string()))?
            .ok_or_else(|| BotError::NotFound(format!("personality `{id}`")))?;
        project(document)
    }
}
