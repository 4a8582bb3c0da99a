//! # Discord Transport
//!
//! Gateway v10 WebSocket client and the REST subset the bot needs.
//!
//! - [`events`] -- gateway payload types, opcodes, and intent bits
//! - [`api`] -- REST client for creating messages and typing indicators
//! - [`gateway`] -- connection loop delivering READY / MESSAGE_CREATE to a handler
//! - [`chat`] -- `ChatProvider` implementation over the REST client

pub mod api;
pub mod chat;
pub mod events;
pub mod gateway;

pub use api::DiscordApiClient;
pub use chat::DiscordChat;
pub use gateway::{Gateway, GatewayHandler};
