//! # Inbound Messages
//!
//! Transport-neutral view of a chat message. One is built per gateway event and
//! dropped once dispatch finishes.

#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: String,
    pub channel_id: String,
    /// `None` for direct messages.
    pub guild_id: Option<String>,
    pub author: Author,
    pub content: String,
    /// Users mentioned in the message, in the order the platform reports them.
    pub mentions: Vec<Mention>,
}

impl InboundMessage {
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: String,
    pub display_name: String,
    /// Bot and system accounts never reach the capability pipeline.
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub id: String,
    pub display_name: String,
}
