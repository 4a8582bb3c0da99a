//! # Miscellaneous Commands
//!
//! Handles `ping` and `about`.

use crate::application::context::BotContext;
use crate::domain::error::BotError;
use crate::domain::message::InboundMessage;
use crate::strings::messages;

pub async fn handle_ping(ctx: &BotContext, message: &InboundMessage) -> Result<(), BotError> {
    ctx.chat.reply(message, messages::PONG).await.map(|_| ())
}

pub async fn handle_about(
    ctx: &BotContext,
    message: &InboundMessage,
    prefix: &str,
) -> Result<(), BotError> {
    let text = messages::about(
        &ctx.identity.name,
        ctx.personality.capabilities.len(),
        prefix,
    );
    ctx.chat.reply(message, &text).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{RecordingChat, context, message};
    use std::sync::Arc;

    #[tokio::test]
    async fn about_reports_name_and_capability_count() {
        let chat = Arc::new(RecordingChat::default());
        let ctx = context(chat.clone(), None);
        handle_about(&ctx, &message("!about", None), "!").await.unwrap();
        assert_eq!(
            chat.events(),
            vec!["reply:m1:**Rex** · 0 capabilities · commands start with `!`".to_string()]
        );
    }
}
