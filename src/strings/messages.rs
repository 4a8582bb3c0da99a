//! # Messages
//!
//! User-facing replies.

pub const NOT_AVAILABLE_HERE: &str = "This command is not available here.";
pub const PONG: &str = "pong";

pub fn about(name: &str, capabilities: usize, prefix: &str) -> String {
    let noun = if capabilities == 1 { "capability" } else { "capabilities" };
    format!("**{name}** · {capabilities} {noun} · commands start with `{prefix}`")
}
