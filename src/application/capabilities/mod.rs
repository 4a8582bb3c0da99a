//! # Capability Pipeline
//!
//! Turns the declarative capability list of a personality into typed
//! triggers, checks, and behaviors (once, at startup), and evaluates that list
//! for every inbound message.
//!
//! - [`registry`] -- the closed set of triggers and checks, plus compilation
//! - [`behaviors`] -- the closed set of side-effecting behaviors
//! - [`pipeline`] -- per-message planning and execution

pub mod behaviors;
pub mod pipeline;
pub mod registry;

pub use behaviors::Behavior;
pub use pipeline::{Effect, dispatch, execute, plan};
pub use registry::{Check, CompiledCapability, Trigger, compile};
