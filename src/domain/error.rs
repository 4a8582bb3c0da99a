//! # Error Taxonomy
//!
//! Every failure the bot can surface. Startup errors (`Configuration`, `NotFound`,
//! `InvalidIdentifier`, `UnknownCapability`) are fatal before the gateway connects;
//! the rest are per-message and get logged by the runtime.

use thiserror::Error;

use crate::domain::personality::CapabilityRole;

#[derive(Debug, Error)]
pub enum BotError {
    /// Missing secret, bad config file, or a malformed personality record.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid bot identifier `{0}`")]
    InvalidIdentifier(String),

    /// A personality references a component outside the registry.
    #[error("unknown {role} `{name}`")]
    UnknownCapability { role: CapabilityRole, name: String },

    #[error("behavior `{behavior}` failed: {source}")]
    BehaviorExecution {
        behavior: &'static str,
        #[source]
        source: Box<BotError>,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("llm error: {0}")]
    Llm(String),
}

impl BotError {
    pub fn config(message: impl Into<String>) -> Self {
        BotError::Configuration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_capability_names_role_and_identifier() {
        let err = BotError::UnknownCapability {
            role: CapabilityRole::Check,
            name: "moon_phase".to_string(),
        };
        assert_eq!(err.to_string(), "unknown check `moon_phase`");
    }

    #[test]
    fn behavior_failure_keeps_its_cause() {
        let err = BotError::BehaviorExecution {
            behavior: "say",
            source: Box::new(BotError::Transport("HTTP 500".to_string())),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("HTTP 500"));
    }
}
