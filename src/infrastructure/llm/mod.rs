//! # LLM Client
//!
//! Minimal client for OpenAI-compatible chat completion APIs, used by the
//! character service. Any endpoint speaking the `/chat/completions` protocol works.

mod client;
mod openai;
mod types;

pub use client::{Client, ProviderConfig};
pub use types::{Context, Error, Message, MessageRole, Response, TokenUsage};
