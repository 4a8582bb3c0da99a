//! # Bot Runtime
//!
//! Startup wiring (store, personality, capabilities, character service,
//! transport) and the gateway event handler that feeds messages into the
//! capability pipeline.

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info};

use crate::application::capabilities::{self, CompiledCapability};
use crate::application::character::Character;
use crate::application::context::{BotContext, BotIdentity};
use crate::application::router::CommandRouter;
use crate::domain::config::{AppConfig, OPENAI_API_KEY_ENV};
use crate::domain::error::BotError;
use crate::domain::personality::{Intent, PersonalityRecord};
use crate::domain::traits::ChatProvider;
use crate::infrastructure::cache::open_cache;
use crate::infrastructure::discord::events::{
    INTENT_DIRECT_MESSAGES, INTENT_GUILD_MEMBERS, INTENT_GUILD_MESSAGES, INTENT_GUILD_PRESENCES,
    INTENT_GUILDS, INTENT_MESSAGE_CONTENT, MessageCreate, ReadyEvent,
};
use crate::infrastructure::discord::{DiscordApiClient, DiscordChat, Gateway, GatewayHandler};
use crate::infrastructure::llm::{Client as LlmClient, ProviderConfig};
use crate::infrastructure::store::open_store;
use crate::strings::logs;

/// Gateway intent bits for a personality. Message and message-content intents
/// are always requested.
pub fn gateway_intents(personality: &PersonalityRecord) -> u32 {
    let mut intents =
        INTENT_GUILDS | INTENT_GUILD_MESSAGES | INTENT_DIRECT_MESSAGES | INTENT_MESSAGE_CONTENT;
    if personality.wants(Intent::Presence) {
        intents |= INTENT_GUILD_PRESENCES;
    }
    if personality.wants(Intent::Members) {
        intents |= INTENT_GUILD_MEMBERS;
    }
    intents
}

/// Prompt and API key for the character service, or the reason it cannot start.
pub fn character_inputs<'a>(
    personality: &'a PersonalityRecord,
    api_key: Option<&'a str>,
) -> Result<(&'a str, &'a str), BotError> {
    let prompt = personality
        .prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            BotError::config(format!(
                "personality `{}` has no prompt; character_reply needs one",
                personality.id
            ))
        })?;
    let api_key = api_key.ok_or_else(|| {
        BotError::config(format!(
            "{OPENAI_API_KEY_ENV} is required when character_reply is configured"
        ))
    })?;
    Ok((prompt, api_key))
}

pub struct BotRuntime {
    handler: Arc<EventHandler>,
    gateway: Gateway,
}

impl BotRuntime {
    /// Everything that can fail before connecting happens here.
    pub async fn bootstrap(config: &AppConfig, bot_id: &str) -> Result<Self, BotError> {
        let token = config
            .secrets
            .discord_token
            .clone()
            .ok_or_else(|| BotError::config("DISCORD_TOKEN is not set"))?;

        let store = open_store(config).await?;
        let personality = Arc::new(store.load(bot_id).await?);
        let compiled = capabilities::compile(&personality.capabilities)?;
        info!(
            "{}",
            logs::personality_loaded(&personality.name, compiled.len())
        );

        let character = if compiled.iter().any(CompiledCapability::requires_character) {
            let (prompt, api_key) =
                character_inputs(&personality, config.secrets.openai_api_key.as_deref())?;
            let llm = LlmClient::new(ProviderConfig::from_llm_config(
                &config.llm,
                api_key.to_string(),
            ))
            .map_err(|e| BotError::Llm(e.to_string()))?;
            info!(model = llm.model(), "character service enabled");
            let cache = open_cache(config.secrets.redis_uri.as_deref()).await?;
            Some(Arc::new(Character::new(
                personality.name.clone(),
                prompt,
                Arc::new(llm),
                cache,
                config.character.history_limit,
            )))
        } else {
            None
        };

        let chat: Arc<dyn ChatProvider> =
            Arc::new(DiscordChat::new(Arc::new(DiscordApiClient::new(token.clone()))));
        let gateway = Gateway::new(token, gateway_intents(&personality));

        Ok(Self {
            handler: Arc::new(EventHandler::new(personality, compiled, chat, character)),
            gateway,
        })
    }

    pub fn personality(&self) -> &PersonalityRecord {
        &self.handler.personality
    }

    /// Connect and serve until a fatal gateway error.
    pub async fn run(self) -> Result<(), BotError> {
        info!(intents = self.gateway.intents(), "connecting to gateway");
        self.gateway.run(self.handler).await
    }
}

/// Receives gateway events. The dispatch context only exists after READY,
/// since the bot's own id is unknown before then.
pub struct EventHandler {
    personality: Arc<PersonalityRecord>,
    capabilities: Arc<Vec<CompiledCapability>>,
    chat: Arc<dyn ChatProvider>,
    character: Option<Arc<Character>>,
    context: OnceLock<Arc<BotContext>>,
}

impl EventHandler {
    pub fn new(
        personality: Arc<PersonalityRecord>,
        capabilities: Vec<CompiledCapability>,
        chat: Arc<dyn ChatProvider>,
        character: Option<Arc<Character>>,
    ) -> Self {
        Self {
            personality,
            capabilities: Arc::new(capabilities),
            chat,
            character,
            context: OnceLock::new(),
        }
    }

    pub fn context(&self) -> Option<&Arc<BotContext>> {
        self.context.get()
    }
}

#[async_trait]
impl GatewayHandler for EventHandler {
    async fn on_ready(&self, ready: ReadyEvent) {
        let context = Arc::new(BotContext {
            identity: BotIdentity {
                id: Some(ready.user.id),
                name: self.personality.name.clone(),
            },
            personality: self.personality.clone(),
            chat: self.chat.clone(),
            character: self.character.clone(),
            commands: CommandRouter::new(self.personality.command_prefix.clone()),
        });
        // READY repeats after a fresh (non-resumed) reconnect; the user id does not change.
        if self.context.set(context).is_err() {
            debug!("context already built, keeping it");
        }
        info!("{}", logs::running(&self.personality.name));
    }

    async fn on_message(&self, event: MessageCreate) {
        let Some(ctx) = self.context.get().cloned() else {
            debug!(message_id = %event.id, "message before READY, dropping");
            return;
        };
        let message = event.into_inbound();
        let compiled = self.capabilities.clone();
        tokio::spawn(async move {
            if let Err(e) = capabilities::dispatch(&ctx, &compiled, &message).await {
                error!("{}", logs::dispatch_failed(&message.id, &e.to_string()));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::capabilities::{Behavior, Trigger};
    use crate::application::testing::{RecordingChat, personality};
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn ready() -> ReadyEvent {
        serde_json::from_value(serde_json::json!({
            "v": 10,
            "user": { "id": "42", "username": "rex", "bot": true },
            "session_id": "s1"
        }))
        .unwrap()
    }

    fn message_create(content: &str, author_bot: bool) -> MessageCreate {
        serde_json::from_value(serde_json::json!({
            "id": "m1",
            "channel_id": "10",
            "guild_id": "20",
            "content": content,
            "author": { "id": "5", "username": "alice", "bot": author_bot }
        }))
        .unwrap()
    }

    fn handler(chat: Arc<RecordingChat>) -> EventHandler {
        let caps = vec![CompiledCapability {
            trigger: Trigger::Mention,
            checks: vec![],
            behaviors: vec![Behavior::Say("hello!".to_string())],
        }];
        EventHandler::new(Arc::new(personality()), caps, chat, None)
    }

    async fn wait_for_events(chat: &RecordingChat, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let events = chat.events();
            if events.len() >= count {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        chat.events()
    }

    #[test]
    fn intents_always_include_messages() {
        let mut record = personality();
        let base = gateway_intents(&record);
        assert_ne!(base & INTENT_GUILD_MESSAGES, 0);
        assert_ne!(base & INTENT_DIRECT_MESSAGES, 0);
        assert_ne!(base & INTENT_MESSAGE_CONTENT, 0);
        assert_eq!(base & (INTENT_GUILD_PRESENCES | INTENT_GUILD_MEMBERS), 0);

        record.intents = Some(BTreeSet::from([Intent::Presence, Intent::Members]));
        let all = gateway_intents(&record);
        assert_eq!(all, base | INTENT_GUILD_PRESENCES | INTENT_GUILD_MEMBERS);
    }

    #[test]
    fn character_needs_prompt_and_key() {
        let mut record = personality();
        assert!(matches!(
            character_inputs(&record, Some("sk")),
            Err(BotError::Configuration(_))
        ));
        record.prompt = Some("You are Rex.".to_string());
        let err = character_inputs(&record, None).unwrap_err();
        assert!(err.to_string().contains(OPENAI_API_KEY_ENV));
        assert_eq!(
            character_inputs(&record, Some("sk")).unwrap(),
            ("You are Rex.", "sk")
        );
    }

    #[test]
    fn bundled_manifest_compiles() {
        let record = crate::infrastructure::store::parse_manifest(
            include_str!("../../bots/rex/manifest.yaml"),
            std::path::Path::new("bots/rex/manifest.yaml"),
        )
        .unwrap();
        let compiled = capabilities::compile(&record.capabilities).unwrap();
        assert_eq!(compiled.len(), 3);
        assert!(compiled[0].requires_character());
        assert!(character_inputs(&record, Some("sk")).is_ok());
    }

    #[tokio::test]
    async fn messages_before_ready_are_dropped() {
        let chat = Arc::new(RecordingChat::default());
        let handler = handler(chat.clone());
        handler.on_message(message_create("<@42> hi", false)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(chat.events().is_empty());
        assert!(handler.context().is_none());
    }

    #[tokio::test]
    async fn ready_builds_context_and_messages_dispatch() {
        let chat = Arc::new(RecordingChat::default());
        let handler = handler(chat.clone());
        handler.on_ready(ready()).await;
        assert_eq!(handler.context().unwrap().identity.id(), Some("42"));

        let mut event = message_create("<@42> hi", false);
        event.mentions = serde_json::from_value(serde_json::json!([
            { "id": "42", "username": "rex" }
        ]))
        .unwrap();
        handler.on_message(event).await;
        assert_eq!(
            wait_for_events(&chat, 1).await,
            vec!["reply:m1:hello!".to_string()]
        );
    }

    #[tokio::test]
    async fn bot_authors_are_ignored() {
        let chat = Arc::new(RecordingChat::default());
        let handler = handler(chat.clone());
        handler.on_ready(ready()).await;
        let mut event = message_create("<@42> hi", true);
        event.mentions = serde_json::from_value(serde_json::json!([
            { "id": "42", "username": "rex" }
        ]))
        .unwrap();
        handler.on_message(event).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(chat.events().is_empty());
    }
}
