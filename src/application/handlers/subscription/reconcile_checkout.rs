//! ReconcileCheckoutHandler - Applies a completed checkout exactly once.
//!
//! Both the browser return and the webhook end up here, often at the same
//! moment. The session marker on the record makes the operation idempotent,
//! and the conditional write makes it safe under that race:
//!
//! 1. Read the record (creating the Freemium default if missing)
//! 2. Session anywhere in the record's purchase history → return it unchanged
//! 3. Resolve the price id; unknown → `PlanResolution`, nothing written
//! 4. Write the purchase only if the marker is still what was read
//! 5. Lost the race → re-read and start over (bounded)

use std::sync::Arc;

use crate::domain::foundation::{CheckoutSessionId, StateMachine, UserId};
use crate::domain::subscription::{
    BillingPhase, PlanCatalog, SubscriptionError, UserSubscriptionState,
};
use crate::ports::{SaveOutcome, SubscriptionRepository};

/// Conditional-write retries after the first attempt.
const MAX_RETRIES: usize = 3;

#[derive(Debug, Clone)]
pub struct ReconcileCheckoutCommand {
    pub user_id: UserId,
    pub session_id: CheckoutSessionId,
    pub price_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The purchase was written by this call.
    Applied,
    /// The session had already been applied; nothing was written.
    AlreadyProcessed,
}

#[derive(Debug, Clone)]
pub struct ReconcileCheckoutResult {
    pub state: UserSubscriptionState,
    pub outcome: ReconcileOutcome,
}

pub struct ReconcileCheckoutHandler {
    repository: Arc<dyn SubscriptionRepository>,
    catalog: Arc<PlanCatalog>,
}

impl ReconcileCheckoutHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>, catalog: Arc<PlanCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileCheckoutCommand,
    ) -> Result<ReconcileCheckoutResult, SubscriptionError> {
        for attempt in 0..=MAX_RETRIES {
            let current = self.load_or_create(&cmd.user_id).await?;

            if current.has_processed(&cmd.session_id) {
                tracing::info!(
                    user_id = %cmd.user_id,
                    session_id = %cmd.session_id,
                    "checkout session already reconciled"
                );
                return Ok(ReconcileCheckoutResult {
                    state: current,
                    outcome: ReconcileOutcome::AlreadyProcessed,
                });
            }

            let plan = self.catalog.resolve_price(&cmd.price_id).ok_or_else(|| {
                tracing::error!(
                    user_id = %cmd.user_id,
                    session_id = %cmd.session_id,
                    price_id = %cmd.price_id,
                    "purchased price does not map to any plan"
                );
                SubscriptionError::plan_resolution(cmd.price_id.clone())
            })?;

            BillingPhase::of(Some(&current))
                .transition_to(BillingPhase::PendingCheckout)?
                .transition_to(BillingPhase::Paid(plan.id))?;

            let next = current.with_purchase(plan, cmd.session_id.clone());
            let outcome = self
                .repository
                .compare_and_swap(current.last_processed_session_id.as_ref(), &next)
                .await?;

            match outcome {
                SaveOutcome::Applied => {
                    tracing::info!(
                        user_id = %cmd.user_id,
                        session_id = %cmd.session_id,
                        plan = %plan.id,
                        credits_limit = plan.credits_limit,
                        "checkout reconciled"
                    );
                    return Ok(ReconcileCheckoutResult {
                        state: next,
                        outcome: ReconcileOutcome::Applied,
                    });
                }
                SaveOutcome::Conflict => {
                    tracing::warn!(
                        user_id = %cmd.user_id,
                        session_id = %cmd.session_id,
                        attempt,
                        "concurrent subscription write, re-reading"
                    );
                }
            }
        }

        Err(SubscriptionError::conflict(cmd.user_id))
    }

    async fn load_or_create(
        &self,
        user_id: &UserId,
    ) -> Result<UserSubscriptionState, SubscriptionError> {
        match self.repository.find_by_user(user_id).await? {
            Some(state) => Ok(state),
            None => {
                let fresh = UserSubscriptionState::new_freemium(user_id.clone(), &self.catalog);
                Ok(self.repository.create(&fresh).await?)
            }
        }
    }
}
