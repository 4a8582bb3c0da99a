//! # Help Command
//!
//! Handles the `help` command.
//! Lists the available commands under the bot's prefix.

use crate::application::context::BotContext;
use crate::domain::error::BotError;
use crate::domain::message::InboundMessage;

pub async fn handle_help(
    ctx: &BotContext,
    message: &InboundMessage,
    prefix: &str,
) -> Result<(), BotError> {
    ctx.chat
        .reply(message, &crate::strings::help::main(prefix))
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{RecordingChat, context, message};
    use std::sync::Arc;

    #[tokio::test]
    async fn help_lists_commands_with_prefix() {
        let chat = Arc::new(RecordingChat::default());
        let ctx = context(chat.clone(), None);
        handle_help(&ctx, &message("?help", None), "?").await.unwrap();
        let events = chat.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("`?ping`"));
        assert!(events[0].contains("`?about`"));
    }
}
