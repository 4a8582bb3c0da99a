//! Discord Gateway event types and opcodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::message::{Author, InboundMessage, Mention};

// ── Gateway opcodes ─────────────────────────────────────────────────────

pub const OP_DISPATCH: u8 = 0;
pub const OP_HEARTBEAT: u8 = 1;
pub const OP_IDENTIFY: u8 = 2;
pub const OP_RESUME: u8 = 6;
/// Server is going away, client should reconnect.
pub const OP_RECONNECT: u8 = 7;
pub const OP_INVALID_SESSION: u8 = 9;
/// Sent on connection, contains heartbeat_interval.
pub const OP_HELLO: u8 = 10;
pub const OP_HEARTBEAT_ACK: u8 = 11;

// ── Intent bits ─────────────────────────────────────────────────────────

pub const INTENT_GUILDS: u32 = 1 << 0;
pub const INTENT_GUILD_MEMBERS: u32 = 1 << 1;
pub const INTENT_GUILD_PRESENCES: u32 = 1 << 8;
pub const INTENT_GUILD_MESSAGES: u32 = 1 << 9;
pub const INTENT_DIRECT_MESSAGES: u32 = 1 << 12;
pub const INTENT_MESSAGE_CONTENT: u32 = 1 << 15;

// ── Close codes that make reconnecting pointless ────────────────────────

pub const CLOSE_AUTHENTICATION_FAILED: u16 = 4004;
pub const CLOSE_INVALID_INTENTS: u16 = 4013;
pub const CLOSE_DISALLOWED_INTENTS: u16 = 4014;

pub fn is_fatal_close(code: u16) -> bool {
    matches!(
        code,
        CLOSE_AUTHENTICATION_FAILED | CLOSE_INVALID_INTENTS | CLOSE_DISALLOWED_INTENTS
    )
}

// ── Payload types ───────────────────────────────────────────────────────

/// A Gateway payload (incoming or outgoing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    /// Event data. May be `null` for heartbeats.
    pub d: Option<Value>,
    /// Sequence number, only present for opcode 0 (Dispatch).
    pub s: Option<u64>,
    /// Event name (e.g., `"MESSAGE_CREATE"`), only present for opcode 0.
    pub t: Option<String>,
}

impl GatewayPayload {
    pub fn heartbeat(seq: u64) -> Self {
        Self {
            op: OP_HEARTBEAT,
            d: if seq > 0 { Some(serde_json::json!(seq)) } else { None },
            s: None,
            t: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HelloData {
    /// Interval (in milliseconds) between heartbeats.
    pub heartbeat_interval: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub intents: u32,
    pub properties: ConnectionProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    pub seq: u64,
}

/// A Discord user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
}

/// Guild-specific member data attached to messages and mentions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialMember {
    #[serde(default)]
    pub nick: Option<String>,
}

/// An entry of `MESSAGE_CREATE.mentions`.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionedUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub member: Option<PartialMember>,
}

/// A `MESSAGE_CREATE` event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageCreate {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub content: String,
    pub author: User,
    /// Guild (server) ID; absent for direct messages.
    pub guild_id: Option<String>,
    /// The author's member data in the guild.
    #[serde(default)]
    pub member: Option<PartialMember>,
    #[serde(default)]
    pub mentions: Vec<MentionedUser>,
}

/// Nickname, then global display name, then username.
fn display_name(user: &User, member: Option<&PartialMember>) -> String {
    member
        .and_then(|m| m.nick.clone())
        .or_else(|| user.global_name.clone())
        .unwrap_or_else(|| user.username.clone())
}

impl MessageCreate {
    pub fn into_inbound(self) -> InboundMessage {
        let author = Author {
            display_name: display_name(&self.author, self.member.as_ref()),
            id: self.author.id.clone(),
            bot: self.author.bot || self.author.system,
        };
        let mentions = self
            .mentions
            .iter()
            .map(|m| Mention {
                id: m.user.id.clone(),
                display_name: display_name(&m.user, m.member.as_ref()),
            })
            .collect();
        InboundMessage {
            id: self.id,
            channel_id: self.channel_id,
            guild_id: self.guild_id,
            author,
            content: self.content,
            mentions,
        }
    }
}

/// The `d` field of a READY event.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEvent {
    pub v: u32,
    pub user: User,
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
}

/// Rate limit information parsed from Discord REST API response headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    pub remaining: Option<u32>,
    /// Time in seconds until the rate limit resets.
    pub reset_after: Option<f64>,
}

impl RateLimitInfo {
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let parse = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            remaining: parse("x-ratelimit-remaining").and_then(|v| v.parse().ok()),
            reset_after: parse("x-ratelimit-reset-after").and_then(|v| v.parse().ok()),
        }
    }

    pub fn is_limited(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn retry_after_ms(&self) -> Option<u64> {
        self.reset_after.map(|s| (s * 1000.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_hello() {
        let json = r#"{"op": 10, "d": {"heartbeat_interval": 41250}, "s": null, "t": null}"#;
        let payload: GatewayPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.op, OP_HELLO);
        let hello: HelloData = serde_json::from_value(payload.d.unwrap()).unwrap();
        assert_eq!(hello.heartbeat_interval, 41250);
    }

    #[test]
    fn message_create_maps_names_and_mentions() {
        let json = r#"{
            "id": "900",
            "channel_id": "10",
            "guild_id": "20",
            "content": "hey <@42> and <@43>",
            "author": {"id": "1", "username": "alice", "global_name": "Alice A."},
            "member": {"nick": "Ally"},
            "mentions": [
                {"id": "42", "username": "rex", "bot": true, "member": {"nick": "Rex"}},
                {"id": "43", "username": "bob", "global_name": null}
            ]
        }"#;
        let msg: MessageCreate = serde_json::from_str(json).unwrap();
        let inbound = msg.into_inbound();
        assert_eq!(inbound.author.display_name, "Ally");
        assert!(!inbound.author.bot);
        assert!(!inbound.is_direct());
        assert_eq!(inbound.mentions.len(), 2);
        assert_eq!(inbound.mentions[0].id, "42");
        assert_eq!(inbound.mentions[0].display_name, "Rex");
        assert_eq!(inbound.mentions[1].display_name, "bob");
    }

    #[test]
    fn system_author_counts_as_bot() {
        let json = r#"{
            "id": "1", "channel_id": "2", "content": "welcome",
            "author": {"id": "3", "username": "Discord", "system": true}
        }"#;
        let msg: MessageCreate = serde_json::from_str(json).unwrap();
        let inbound = msg.into_inbound();
        assert!(inbound.author.bot);
        assert!(inbound.is_direct());
        assert!(inbound.mentions.is_empty());
    }

    #[test]
    fn serialize_identify() {
        let identify = IdentifyPayload {
            token: "my-token".into(),
            intents: INTENT_GUILDS | INTENT_MESSAGE_CONTENT,
            properties: ConnectionProperties {
                os: "linux".into(),
                browser: "marsbot".into(),
                device: "marsbot".into(),
            },
        };
        let json = serde_json::to_value(&identify).unwrap();
        assert_eq!(json["token"], "my-token");
        assert_eq!(json["intents"], 32769);
    }

    #[test]
    fn heartbeat_sends_null_before_first_sequence() {
        let json = serde_json::to_value(GatewayPayload::heartbeat(0)).unwrap();
        assert_eq!(json["op"], 1);
        assert!(json["d"].is_null());
        let json = serde_json::to_value(GatewayPayload::heartbeat(42)).unwrap();
        assert_eq!(json["d"], 42);
    }

    #[test]
    fn deserialize_ready_event() {
        let json = r#"{
            "v": 10,
            "user": {"id": "123", "username": "bot", "bot": true},
            "session_id": "abc-def",
            "resume_gateway_url": "wss://gateway-resume.discord.gg"
        }"#;
        let ready: ReadyEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ready.user.id, "123");
        assert_eq!(ready.session_id, "abc-def");
    }

    #[test]
    fn fatal_close_codes() {
        assert!(is_fatal_close(4004));
        assert!(is_fatal_close(4014));
        assert!(!is_fatal_close(1000));
        assert!(!is_fatal_close(4009));
    }

    #[test]
    fn rate_limit_info_is_limited() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("x-ratelimit-reset-after", "2.0".parse().unwrap());
        let info = RateLimitInfo::from_headers(&headers);
        assert!(info.is_limited());
        assert_eq!(info.retry_after_ms(), Some(2000));
    }

    #[test]
    fn rate_limit_info_malformed_headers() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "not-a-number".parse().unwrap());
        let info = RateLimitInfo::from_headers(&headers);
        assert!(info.remaining.is_none());
        assert!(!info.is_limited());
    }
}
