//! # Bot Context
//!
//! The immutable runtime handle shared by every dispatch. Built once the gateway
//! reports READY (that is when the bot learns its own user id) and never
//! mutated afterwards.

use std::sync::Arc;

use crate::application::character::Character;
use crate::application::router::CommandRouter;
use crate::domain::personality::PersonalityRecord;
use crate::domain::traits::ChatProvider;

/// Who the bot is on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// Own user id; `None` until the transport has identified.
    pub id: Option<String>,
    pub name: String,
}

impl BotIdentity {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

pub struct BotContext {
    pub identity: BotIdentity,
    pub personality: Arc<PersonalityRecord>,
    pub chat: Arc<dyn ChatProvider>,
    /// Present when some behavior needs the character service.
    pub character: Option<Arc<Character>>,
    pub commands: CommandRouter,
}
