//! # Log Messages
//!
//! Operator-facing log lines.

pub const LAUNCHING: &str = "Launching bot....";
pub const MESSAGE_OBSERVED: &str = "message observed";
pub const SHUTDOWN: &str = "Shutting down...";

pub fn running(name: &str) -> String {
    format!("Running {name}...")
}

pub fn personality_loaded(name: &str, capabilities: usize) -> String {
    format!("Loaded personality {name} with {capabilities} capabilities")
}

pub fn dispatch_failed(message_id: &str, err: &str) -> String {
    format!("Dispatch of message {message_id} failed: {err}")
}

pub fn gateway_stopped(err: &str) -> String {
    format!("Gateway stopped: {err}")
}

pub fn shutdown_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}
