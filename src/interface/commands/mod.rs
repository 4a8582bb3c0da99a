//! # Command Handlers
//!
//! Handler functions for each prefix command (`help`, `ping`, `about`).
//! These handlers are invoked by the Router.

pub mod help;
pub mod misc;
