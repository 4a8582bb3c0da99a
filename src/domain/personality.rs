//! # Personality Records
//!
//! The declarative description of one bot: its name, gateway intents, command
//! prefix, character prompt, and ordered capability list. Loaded once at startup
//! from a manifest file or the document store.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A personality as stored. Unknown keys are dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PersonalityRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub intents: Option<BTreeSet<Intent>>,
    pub capabilities: Vec<CapabilitySpec>,
    #[serde(default)]
    pub command_prefix: Option<String>,
    /// System prompt for the character service.
    #[serde(default)]
    pub prompt: Option<String>,
}

impl PersonalityRecord {
    pub fn wants(&self, intent: Intent) -> bool {
        self.intents
            .as_ref()
            .is_some_and(|intents| intents.contains(&intent))
    }
}

/// Optional (privileged) gateway intents a personality may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Presence,
    Members,
}

/// One capability as authored: trigger, gating checks, behaviors.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CapabilitySpec {
    pub trigger: ComponentSpec,
    #[serde(default)]
    pub checks: Vec<ComponentSpec>,
    #[serde(default)]
    pub behaviors: Vec<ComponentSpec>,
}

/// Reference to a registry component, either `mention` or `{ name: keyword, value: "gm" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged, expecting = "a component name or a `{ name, value }` map")]
pub enum ComponentSpec {
    Name(String),
    Configured {
        name: String,
        /// Numbers and booleans are kept in their textual form.
        #[serde(default, deserialize_with = "scalar_value")]
        value: Option<String>,
    },
}

/// Any scalar a manifest or stored document may carry as a component value.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Bool(flag) => flag.to_string(),
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Signed(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
        }
    }
}

fn scalar_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}

impl ComponentSpec {
    pub fn name(&self) -> &str {
        match self {
            ComponentSpec::Name(name) => name,
            ComponentSpec::Configured { name, .. } => name,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            ComponentSpec::Name(_) => None,
            ComponentSpec::Configured { value, .. } => value.as_deref(),
        }
    }
}

/// Which slot of a capability a component was referenced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityRole {
    Trigger,
    Check,
    Behavior,
}

impl fmt::Display for CapabilityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CapabilityRole::Trigger => "trigger",
            CapabilityRole::Check => "check",
            CapabilityRole::Behavior => "behavior",
        })
    }
}
