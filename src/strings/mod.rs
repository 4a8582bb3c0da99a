//! # Strings Module
//!
//! Centralizes user-facing strings, prompts, and log messages.

pub mod help;
pub mod logs;
pub mod messages;
pub mod prompts;
