//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the bot.
//! Independent of the Discord transport and the storage drivers, serving as the
//! contract for the other layers.

pub mod config;
pub mod error;
pub mod message;
pub mod personality;
pub mod traits;
