//! # Command Router
//!
//! Prefix-command fallback that runs after the capability pipeline. Parses
//! `<prefix><command> <args>` and hands it to the handlers in
//! `interface/commands`. Without a configured prefix the router never matches.

use tracing::{debug, info};

use crate::application::context::BotContext;
use crate::domain::error::BotError;
use crate::domain::message::InboundMessage;
use crate::interface::commands;

#[derive(Debug, Clone, Default)]
pub struct CommandRouter {
    prefix: Option<String>,
}

impl CommandRouter {
    /// Blank prefixes count as unset.
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Split `content` into a lowercased command name and its argument text.
    pub fn parse(&self, content: &str) -> Option<(String, String)> {
        let rest = content.trim().strip_prefix(self.prefix.as_deref()?)?;
        let (cmd, args) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim()),
            None => (rest, ""),
        };
        if cmd.is_empty() {
            return None;
        }
        Some((cmd.to_lowercase(), args.to_string()))
    }

    pub async fn route(&self, ctx: &BotContext, message: &InboundMessage) -> Result<(), BotError> {
        let Some((cmd, args)) = self.parse(&message.content) else {
            return Ok(());
        };
        let prefix = self.prefix().unwrap_or_default();
        info!(
            "Router dispatching cmd='{}' args='{}' sender='{}'",
            cmd, args, message.author.id
        );

        match cmd.as_str() {
            "help" => commands::help::handle_help(ctx, message, prefix).await,
            "ping" => commands::misc::handle_ping(ctx, message).await,
            "about" => commands::misc::handle_about(ctx, message, prefix).await,
            _ => {
                debug!(cmd = %cmd, "ignoring unknown command");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{RecordingChat, context, message};
    use crate::strings::messages::PONG;
    use std::sync::Arc;

    fn router(prefix: &str) -> CommandRouter {
        CommandRouter::new(Some(prefix.to_string()))
    }

    #[test]
    fn parse_splits_command_and_args() {
        assert_eq!(
            router("!").parse("!Ping  now please"),
            Some(("ping".to_string(), "now please".to_string()))
        );
        assert_eq!(router("!").parse("!about"), Some(("about".to_string(), String::new())));
        assert_eq!(router("!").parse("ping"), None);
        assert_eq!(router("!").parse("! ping"), None);
    }

    #[test]
    fn unset_or_blank_prefix_never_matches() {
        assert_eq!(CommandRouter::new(None).parse("!ping"), None);
        assert_eq!(CommandRouter::new(Some("  ".to_string())).prefix(), None);
    }

    #[tokio::test]
    async fn routes_known_commands() {
        let chat = Arc::new(RecordingChat::default());
        let mut ctx = context(chat.clone(), None);
        ctx.commands = router("!");

        ctx.commands.route(&ctx, &message("!ping", Some("20"))).await.unwrap();
        assert_eq!(chat.events(), vec![format!("reply:m1:{PONG}")]);
    }

    #[tokio::test]
    async fn ignores_unknown_commands_and_plain_text() {
        let chat = Arc::new(RecordingChat::default());
        let mut ctx = context(chat.clone(), None);
        ctx.commands = router("!");

        ctx.commands.route(&ctx, &message("!dance", Some("20"))).await.unwrap();
        ctx.commands.route(&ctx, &message("hello", Some("20"))).await.unwrap();
        assert!(chat.events().is_empty());
    }
}
