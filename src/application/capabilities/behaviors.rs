//! Behaviors: the side-effecting half of a capability.

use tracing::{debug, info};

use crate::application::capabilities::registry::{required_value, unknown};
use crate::application::context::BotContext;
use crate::application::normalizer;
use crate::domain::error::BotError;
use crate::domain::message::InboundMessage;
use crate::domain::personality::{CapabilityRole, ComponentSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    Typing,
    /// Reply with fixed text.
    Say(String),
    /// Reply with the normalized message text.
    Echo,
    /// Reply in character through the language model.
    CharacterReply,
    Log,
}

impl Behavior {
    pub fn resolve(spec: &ComponentSpec) -> Result<Self, BotError> {
        let role = CapabilityRole::Behavior;
        Ok(match spec.name() {
            "typing" => Behavior::Typing,
            "say" => Behavior::Say(required_value(spec, role)?),
            "echo" => Behavior::Echo,
            "character_reply" => Behavior::CharacterReply,
            "log" => Behavior::Log,
            other => return Err(unknown(role, other)),
        })
    }

    /// Registry identifier, as authored.
    pub fn name(&self) -> &'static str {
        match self {
            Behavior::Typing => "typing",
            Behavior::Say(_) => "say",
            Behavior::Echo => "echo",
            Behavior::CharacterReply => "character_reply",
            Behavior::Log => "log",
        }
    }

    pub fn requires_character(&self) -> bool {
        matches!(self, Behavior::CharacterReply)
    }

    pub async fn run(&self, ctx: &BotContext, message: &InboundMessage) -> Result<(), BotError> {
        match self {
            Behavior::Typing => ctx.chat.typing(&message.channel_id).await,
            Behavior::Say(text) => ctx.chat.reply(message, text).await.map(|_| ()),
            Behavior::Echo => {
                let text = normalizer::preprocess(message);
                if text.is_empty() {
                    debug!(message_id = %message.id, "nothing to echo");
                    return Ok(());
                }
                ctx.chat.reply(message, &text).await.map(|_| ())
            }
            Behavior::CharacterReply => {
                let character = ctx.character.as_ref().ok_or_else(|| {
                    BotError::config("character_reply configured without a character service")
                })?;
                let text = normalizer::preprocess(message);
                if text.is_empty() {
                    debug!(message_id = %message.id, "empty prompt, skipping character reply");
                    return Ok(());
                }
                ctx.chat.typing(&message.channel_id).await?;
                let reply = character
                    .reply_to_message(&message.channel_id, &message.author.display_name, &text)
                    .await?;
                ctx.chat.reply(message, &reply).await.map(|_| ())
            }
            Behavior::Log => {
                info!(
                    bot = %ctx.identity.name,
                    message_id = %message.id,
                    channel_id = %message.channel_id,
                    guild_id = message.guild_id.as_deref().unwrap_or("-"),
                    author = %message.author.display_name,
                    content = %message.content,
                    "{}",
                    crate::strings::logs::MESSAGE_OBSERVED
                );
                Ok(())
            }
        }
    }
}
