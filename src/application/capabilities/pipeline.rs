//! Per-message dispatch.
//!
//! [`plan`] decides, without side effects, what a message should cause;
//! [`execute`] performs those effects one at a time. Triggers and checks only
//! read the bot identity and the message, and no behavior changes either, so
//! planning up front observes exactly what interleaved evaluation would.

use tracing::debug;

use crate::application::capabilities::behaviors::Behavior;
use crate::application::capabilities::registry::{Check, CompiledCapability};
use crate::application::context::{BotContext, BotIdentity};
use crate::domain::error::BotError;
use crate::domain::message::InboundMessage;
use crate::strings::messages::NOT_AVAILABLE_HERE;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect<'a> {
    /// Run one behavior of the capability at index `capability`.
    Run {
        capability: usize,
        behavior: &'a Behavior,
    },
    /// A fired capability failed `check`; reply with the rejection and stop.
    Reject { capability: usize, check: &'a Check },
    /// Hand the message to the prefix-command router.
    Commands,
}

/// Decide the effects of `message`, in execution order.
///
/// Messages from bots produce nothing. The first failing check of any fired
/// capability ends the plan with a single [`Effect::Reject`]: later
/// capabilities are not evaluated and the command router is skipped.
pub fn plan<'a>(
    identity: &BotIdentity,
    capabilities: &'a [CompiledCapability],
    message: &InboundMessage,
) -> Vec<Effect<'a>> {
    let mut effects = Vec::new();
    if message.author.bot {
        return effects;
    }

    for (index, capability) in capabilities.iter().enumerate() {
        if !capability.trigger.fires(identity, message) {
            continue;
        }
        if let Some(check) = capability.checks.iter().find(|check| !check.passes(message)) {
            effects.push(Effect::Reject {
                capability: index,
                check,
            });
            return effects;
        }
        effects.extend(capability.behaviors.iter().map(|behavior| Effect::Run {
            capability: index,
            behavior,
        }));
    }

    effects.push(Effect::Commands);
    effects
}

/// Perform `effects` sequentially. A failing behavior aborts the rest.
pub async fn execute(
    ctx: &BotContext,
    message: &InboundMessage,
    effects: Vec<Effect<'_>>,
) -> Result<(), BotError> {
    for effect in effects {
        match effect {
            Effect::Run { behavior, .. } => {
                behavior
                    .run(ctx, message)
                    .await
                    .map_err(|source| BotError::BehaviorExecution {
                        behavior: behavior.name(),
                        source: Box::new(source),
                    })?;
            }
            Effect::Reject { capability, check } => {
                debug!(capability, ?check, message_id = %message.id, "check failed");
                ctx.chat.reply(message, NOT_AVAILABLE_HERE).await?;
            }
            Effect::Commands => ctx.commands.route(ctx, message).await?,
        }
    }
    Ok(())
}

pub async fn dispatch(
    ctx: &BotContext,
    capabilities: &[CompiledCapability],
    message: &InboundMessage,
) -> Result<(), BotError> {
    let effects = plan(&ctx.identity, capabilities, message);
    execute(ctx, message, effects).await
}
