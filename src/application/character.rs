//! # Character Service
//!
//! In-persona replies driven by the personality prompt. Each channel is one
//! conversation; recent exchanges are replayed to the model so it keeps the
//! thread.

use std::sync::Arc;
use tracing::debug;

use crate::domain::error::BotError;
use crate::domain::traits::{ConversationCache, Exchange, LlmProvider};
use crate::infrastructure::llm::Context;
use crate::strings::prompts;

pub struct Character {
    name: String,
    prompt: String,
    llm: Arc<dyn LlmProvider>,
    cache: Arc<dyn ConversationCache>,
    history_limit: usize,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        llm: Arc<dyn LlmProvider>,
        cache: Arc<dyn ConversationCache>,
        history_limit: usize,
    ) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            llm,
            cache,
            history_limit,
        }
    }

    /// System prompt, persona instruction, prior exchanges, then the new line.
    pub fn build_context(&self, history: &[Exchange], sender: &str, text: &str) -> Context {
        let mut context = Context::new()
            .add_system_message(self.prompt.clone())
            .add_system_message(prompts::persona_instruction(&self.name));
        for exchange in history {
            context = context
                .add_user_message(prompts::user_line(&exchange.sender, &exchange.message))
                .add_assistant_message(exchange.reply.clone());
        }
        context.add_user_message(prompts::user_line(sender, text))
    }

    /// Generate a reply to `text` from `sender` and remember the exchange.
    pub async fn reply_to_message(
        &self,
        conversation: &str,
        sender: &str,
        text: &str,
    ) -> Result<String, BotError> {
        let history = self.cache.history(conversation).await?;
        let context = self.build_context(&history, sender, text);
        let completion = self.llm.complete(context).await?;

        let reply = self.clean_reply(&completion);
        if reply.is_empty() {
            return Err(BotError::Llm("model returned an empty reply".to_string()));
        }

        self.cache
            .record(
                conversation,
                Exchange {
                    sender: sender.to_string(),
                    message: text.to_string(),
                    reply: reply.clone(),
                },
                self.history_limit,
            )
            .await?;
        debug!(conversation, history = history.len(), "character replied");
        Ok(reply)
    }

    /// Models often echo the speaker label back; drop it.
    fn clean_reply(&self, completion: &str) -> String {
        let trimmed = completion.trim();
        let label = format!("{}:", self.name);
        trimmed
            .strip_prefix(label.as_str())
            .unwrap_or(trimmed)
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::MemoryCache;
    use crate::infrastructure::llm::MessageRole;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns canned completions and keeps every context it was given.
    struct ScriptedLlm {
        replies: Mutex<Vec<String>>,
        seen: Mutex<Vec<Context>>,
    }

    impl ScriptedLlm {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn complete(&self, context: Context) -> Result<String, BotError> {
            self.seen.lock().unwrap().push(context);
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BotError::Llm("script exhausted".to_string()))
        }
    }

    fn character(llm: Arc<ScriptedLlm>, limit: usize) -> Character {
        Character::new(
            "Rex",
            "You are a dinosaur.",
            llm,
            Arc::new(MemoryCache::new()),
            limit,
        )
    }

    #[test]
    fn context_orders_prompt_history_and_new_line() {
        let rex = character(Arc::new(ScriptedLlm::new(&[])), 5);
        let history = vec![Exchange {
            sender: "alice".to_string(),
            message: "hello".to_string(),
            reply: "roar".to_string(),
        }];
        let context = rex.build_context(&history, "bob", "how tall are you?");
        let roles: Vec<MessageRole> = context.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
            ]
        );
        assert_eq!(context.messages[0].content, "You are a dinosaur.");
        assert!(context.messages[1].content.contains("Rex"));
        assert_eq!(context.messages[2].content, "alice: hello");
        assert_eq!(context.messages[4].content, "bob: how tall are you?");
    }

    #[tokio::test]
    async fn replies_are_cleaned_and_remembered() {
        let llm = Arc::new(ScriptedLlm::new(&["Rex: roar!", "  stomp  "]));
        let rex = character(llm.clone(), 5);

        let first = rex.reply_to_message("10", "alice", "hi").await.unwrap();
        assert_eq!(first, "roar!");
        let second = rex.reply_to_message("10", "alice", "again").await.unwrap();
        assert_eq!(second, "stomp");

        let seen = llm.seen.lock().unwrap();
        // Second request replays the first exchange.
        assert_eq!(seen[1].messages.len(), 5);
        assert_eq!(seen[1].messages[3].content, "roar!");
    }

    #[tokio::test]
    async fn conversations_are_kept_per_channel() {
        let llm = Arc::new(ScriptedLlm::new(&["a", "b"]));
        let rex = character(llm.clone(), 5);
        rex.reply_to_message("10", "alice", "hi").await.unwrap();
        rex.reply_to_message("11", "bob", "hi").await.unwrap();
        assert_eq!(llm.seen.lock().unwrap()[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn empty_completion_is_an_error_and_not_recorded() {
        let llm = Arc::new(ScriptedLlm::new(&["Rex:   ", "ok"]));
        let rex = character(llm.clone(), 5);
        assert!(matches!(
            rex.reply_to_message("10", "alice", "hi").await,
            Err(BotError::Llm(_))
        ));
        rex.reply_to_message("10", "alice", "hi").await.unwrap();
        assert_eq!(llm.seen.lock().unwrap()[1].messages.len(), 3);
    }
}
