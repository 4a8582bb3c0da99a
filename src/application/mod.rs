//! # Application Layer
//!
//! The bot's behavior: message normalization, the capability pipeline, the
//! character service, command routing, and the runtime that wires them to the
//! transport.

pub mod capabilities;
pub mod character;
pub mod context;
pub mod logging;
pub mod normalizer;
pub mod router;
pub mod runtime;

#[cfg(test)]
pub mod testing;
