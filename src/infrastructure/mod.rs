//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (ChatProvider, PersonalityStore,
//! LlmProvider, ConversationCache).

pub mod cache;
pub mod discord;
pub mod llm;
pub mod store;
