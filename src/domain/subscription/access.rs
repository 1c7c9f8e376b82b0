//! Subscription Access Resolver.
//!
//! Pure functions over a user's subscription state. Nothing here performs
//! I/O or fails: a missing state is read as the Freemium default, so callers
//! that could not load a record still get a safe, lowest-tier answer.

use serde::Serialize;

use super::{ModuleTier, PlanCatalog, PlanId, UserSubscriptionState, FREEMIUM_CREDITS};
use crate::domain::module::Module;

/// Credits still available to the user.
pub fn remaining_credits(state: Option<&UserSubscriptionState>) -> u32 {
    match state {
        Some(s) => s.credits_limit.saturating_sub(s.credits_used),
        None => FREEMIUM_CREDITS,
    }
}

/// Current plan, defaulting to Freemium when unset or unknown.
pub fn subscription_plan(state: Option<&UserSubscriptionState>) -> PlanId {
    state.and_then(|s| s.plan).unwrap_or(PlanId::Freemium)
}

/// True if the user may open `module`.
pub fn can_access_module(state: Option<&UserSubscriptionState>, module: &Module) -> bool {
    check_module_access(state, module).is_allowed()
}

/// True if at least one credit remains.
pub fn can_consume_credit(state: Option<&UserSubscriptionState>) -> bool {
    remaining_credits(state) > 0
}

/// Why a module was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AccessDeniedReason {
    ModuleDisabled,
    ModuleNotLinked,
    TierTooLow {
        required: ModuleTier,
        current: ModuleTier,
    },
}

impl std::fmt::Display for AccessDeniedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessDeniedReason::ModuleDisabled => write!(f, "module is disabled"),
            AccessDeniedReason::ModuleNotLinked => write!(f, "module has no assistant"),
            AccessDeniedReason::TierTooLow { required, current } => {
                write!(f, "requires {} tier, current tier is {}", required, current)
            }
        }
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Allowed,
    Denied(AccessDeniedReason),
}

impl AccessResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessResult::Allowed)
    }

    pub fn denial(&self) -> Option<AccessDeniedReason> {
        match self {
            AccessResult::Allowed => None,
            AccessResult::Denied(reason) => Some(*reason),
        }
    }
}

/// Access check with the reason for a refusal.
///
/// Registry problems (disabled, unlinked) are reported before tier problems
/// since no plan upgrade can fix them.
pub fn check_module_access(state: Option<&UserSubscriptionState>, module: &Module) -> AccessResult {
    if !module.enabled {
        return AccessResult::Denied(AccessDeniedReason::ModuleDisabled);
    }
    if !module.is_linked() {
        return AccessResult::Denied(AccessDeniedReason::ModuleNotLinked);
    }

    let current = subscription_plan(state).access_tier();
    if !current.covers(module.tier) {
        return AccessResult::Denied(AccessDeniedReason::TierTooLow {
            required: module.tier,
            current,
        });
    }
    AccessResult::Allowed
}

/// What caused an upgrade prompt to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTrigger {
    ModuleDenied(AccessDeniedReason),
    CreditsExhausted,
}

/// What the user is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptAction {
    Upgrade,
    ContactSupport,
    ContactAdmin,
}

/// Prompt shown when an action is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradePrompt {
    pub action: PromptAction,
    pub current_plan: PlanId,
    pub suggested_plan: Option<PlanId>,
    pub message: String,
}

/// Picks the prompt for a refusal.
///
/// - Tier denial: the cheapest plan that unlocks the module.
/// - Exhausted credits: the next plan above the current one.
/// - Premium users out of credits: contact support.
/// - Disabled or unlinked modules: contact an administrator.
pub fn upgrade_prompt(
    state: Option<&UserSubscriptionState>,
    trigger: PromptTrigger,
    catalog: &PlanCatalog,
) -> UpgradePrompt {
    let current_plan = subscription_plan(state);

    match trigger {
        PromptTrigger::ModuleDenied(AccessDeniedReason::TierTooLow { required, .. }) => {
            let target = catalog.cheapest_plan_for(required);
            UpgradePrompt {
                action: PromptAction::Upgrade,
                current_plan,
                suggested_plan: Some(target.id),
                message: format!(
                    "This module requires the {} plan. Upgrade to unlock it.",
                    target.id.display_name()
                ),
            }
        }
        PromptTrigger::ModuleDenied(_) => UpgradePrompt {
            action: PromptAction::ContactAdmin,
            current_plan,
            suggested_plan: None,
            message: "This module is not available right now. Please contact an administrator."
                .to_string(),
        },
        PromptTrigger::CreditsExhausted => match catalog.next_plan_above(current_plan) {
            Some(next) => UpgradePrompt {
                action: PromptAction::Upgrade,
                current_plan,
                suggested_plan: Some(next.id),
                message: format!(
                    "You have used all your credits. Upgrade to {} for {} credits.",
                    next.id.display_name(),
                    next.credits_limit
                ),
            },
            None => UpgradePrompt {
                action: PromptAction::ContactSupport,
                current_plan,
                suggested_plan: None,
                message: "You have used all your credits. Please contact support.".to_string(),
            },
        },
    }
}
