//! Recording fakes shared by the application tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::character::Character;
use crate::application::context::{BotContext, BotIdentity};
use crate::application::router::CommandRouter;
use crate::domain::error::BotError;
use crate::domain::message::{Author, InboundMessage};
use crate::domain::personality::PersonalityRecord;
use crate::domain::traits::ChatProvider;

/// Records every outbound call as `typing:<channel>` or `reply:<message>:<text>`.
#[derive(Default)]
pub struct RecordingChat {
    events: Mutex<Vec<String>>,
    typing_delay: Option<Duration>,
    fail_typing: bool,
}

impl RecordingChat {
    pub fn with_typing_delay(delay: Duration) -> Self {
        Self {
            typing_delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn failing_typing() -> Self {
        Self {
            fail_typing: true,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn reply(&self, message: &InboundMessage, content: &str) -> Result<String, BotError> {
        self.push(format!("reply:{}:{content}", message.id));
        Ok("sent".to_string())
    }

    async fn typing(&self, channel_id: &str) -> Result<(), BotError> {
        if self.fail_typing {
            return Err(BotError::Transport("typing unavailable".to_string()));
        }
        if let Some(delay) = self.typing_delay {
            tokio::time::sleep(delay).await;
        }
        self.push(format!("typing:{channel_id}"));
        Ok(())
    }
}

pub fn message(content: &str, guild: Option<&str>) -> InboundMessage {
    InboundMessage {
        id: "m1".to_string(),
        channel_id: "10".to_string(),
        guild_id: guild.map(str::to_string),
        author: Author {
            id: "5".to_string(),
            display_name: "alice".to_string(),
            bot: false,
        },
        content: content.to_string(),
        mentions: Vec::new(),
    }
}

pub fn personality() -> PersonalityRecord {
    PersonalityRecord {
        id: "rex".to_string(),
        name: "Rex".to_string(),
        intents: None,
        capabilities: Vec::new(),
        command_prefix: None,
        prompt: None,
    }
}

/// Context for a bot named Rex with user id 42 and no command prefix.
pub fn context(chat: Arc<RecordingChat>, character: Option<Arc<Character>>) -> BotContext {
    BotContext {
        identity: BotIdentity {
            id: Some("42".to_string()),
            name: "Rex".to_string(),
        },
        personality: Arc::new(personality()),
        chat,
        character,
        commands: CommandRouter::new(None),
    }
}
