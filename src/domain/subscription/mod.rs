//! Subscription domain module.
//!
//! Plans, credit accounting and module access rules.
//!
//! # Module Structure
//!
//! - `tier` - ModuleTier ordering
//! - `plan` - PlanId and the PlanCatalog price table
//! - `state` - UserSubscriptionState record
//! - `access` - Subscription Access Resolver (pure functions)
//! - `billing_phase` - BillingPhase state machine
//! - `errors` - SubscriptionError

mod access;
mod billing_phase;
mod errors;
mod plan;
mod state;
mod tier;

pub use access::{
    can_access_module, can_consume_credit, check_module_access, remaining_credits,
    subscription_plan, upgrade_prompt, AccessDeniedReason, AccessResult, PromptAction,
    PromptTrigger, UpgradePrompt,
};
pub use billing_phase::BillingPhase;
pub use errors::SubscriptionError;
pub use plan::{
    BillingInterval, Plan, PlanCatalog, PlanId, FREEMIUM_CREDITS, PRO_MONTHLY_PRICE_ID,
};
pub use state::UserSubscriptionState;
pub use tier::ModuleTier;
