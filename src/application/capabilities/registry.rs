//! Component registry and compilation.
//!
//! Identifiers from a personality are resolved against fixed enums; nothing is
//! evaluated dynamically. Compilation preserves the order of checks and
//! behaviors, which is significant at dispatch time.

use crate::application::capabilities::behaviors::Behavior;
use crate::application::context::BotIdentity;
use crate::application::normalizer;
use crate::domain::error::BotError;
use crate::domain::message::InboundMessage;
use crate::domain::personality::{CapabilityRole, CapabilitySpec, ComponentSpec};

/// Decides whether a capability applies to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Always,
    Mention,
    DirectMessage,
    /// Lowercased; matched case-insensitively anywhere in the content.
    Keyword(String),
    Prefix(String),
}

impl Trigger {
    pub fn resolve(spec: &ComponentSpec) -> Result<Self, BotError> {
        let role = CapabilityRole::Trigger;
        Ok(match spec.name() {
            "always" => Trigger::Always,
            "mention" => Trigger::Mention,
            "direct_message" => Trigger::DirectMessage,
            "keyword" => Trigger::Keyword(required_value(spec, role)?.to_lowercase()),
            "prefix" => Trigger::Prefix(required_value(spec, role)?),
            other => return Err(unknown(role, other)),
        })
    }

    pub fn fires(&self, identity: &BotIdentity, message: &InboundMessage) -> bool {
        match self {
            Trigger::Always => true,
            Trigger::Mention => normalizer::is_self_mentioned(message, identity.id()),
            Trigger::DirectMessage => message.is_direct(),
            Trigger::Keyword(keyword) => message.content.to_lowercase().contains(keyword.as_str()),
            Trigger::Prefix(prefix) => message.content.starts_with(prefix.as_str()),
        }
    }
}

/// Gating predicate evaluated after a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    GuildOnly,
    DmOnly,
    Channel(Vec<String>),
    User(Vec<String>),
}

impl Check {
    pub fn resolve(spec: &ComponentSpec) -> Result<Self, BotError> {
        let role = CapabilityRole::Check;
        Ok(match spec.name() {
            "guild_only" => Check::GuildOnly,
            "dm_only" => Check::DmOnly,
            "channel" => Check::Channel(required_list(spec, role)?),
            "user" => Check::User(required_list(spec, role)?),
            other => return Err(unknown(role, other)),
        })
    }

    pub fn passes(&self, message: &InboundMessage) -> bool {
        match self {
            Check::GuildOnly => !message.is_direct(),
            Check::DmOnly => message.is_direct(),
            Check::Channel(ids) => ids.iter().any(|id| *id == message.channel_id),
            Check::User(ids) => ids.iter().any(|id| *id == message.author.id),
        }
    }
}

/// Runtime form of a capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCapability {
    pub trigger: Trigger,
    pub checks: Vec<Check>,
    pub behaviors: Vec<Behavior>,
}

impl CompiledCapability {
    pub fn compile(spec: &CapabilitySpec) -> Result<Self, BotError> {
        Ok(Self {
            trigger: Trigger::resolve(&spec.trigger)?,
            checks: spec
                .checks
                .iter()
                .map(Check::resolve)
                .collect::<Result<_, _>>()?,
            behaviors: spec
                .behaviors
                .iter()
                .map(Behavior::resolve)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn requires_character(&self) -> bool {
        self.behaviors.iter().any(Behavior::requires_character)
    }
}

/// Compile a personality's capability list, in order. Fails on the first
/// unknown or misconfigured component.
pub fn compile(specs: &[CapabilitySpec]) -> Result<Vec<CompiledCapability>, BotError> {
    specs.iter().map(CompiledCapability::compile).collect()
}

pub(crate) fn unknown(role: CapabilityRole, name: &str) -> BotError {
    BotError::UnknownCapability {
        role,
        name: name.to_string(),
    }
}

pub(crate) fn required_value(spec: &ComponentSpec, role: CapabilityRole) -> Result<String, BotError> {
    spec.value()
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BotError::config(format!("{role} `{}` requires a value", spec.name())))
}

/// Comma-separated, whitespace-tolerant list with at least one entry.
fn required_list(spec: &ComponentSpec, role: CapabilityRole) -> Result<Vec<String>, BotError> {
    let list: Vec<String> = required_value(spec, role)?
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    if list.is_empty() {
        return Err(BotError::config(format!(
            "{role} `{}` requires at least one id",
            spec.name()
        )));
    }
    Ok(list)
}
