//! CompleteCheckoutHandler - Reconciles a session when the customer returns.
//!
//! The return URL carries only the session id, so the purchase details are
//! looked up at the provider and checked against the returning user before
//! anything is written.

use std::sync::Arc;

use crate::domain::foundation::{CheckoutSessionId, UserId};
use crate::domain::subscription::{PlanCatalog, SubscriptionError};
use crate::ports::{CheckoutProvider, SubscriptionRepository};

use super::reconcile_checkout::{
    ReconcileCheckoutCommand, ReconcileCheckoutHandler, ReconcileCheckoutResult,
};

#[derive(Debug, Clone)]
pub struct CompleteCheckoutCommand {
    pub user_id: UserId,
    pub session_id: CheckoutSessionId,
}

pub struct CompleteCheckoutHandler {
    provider: Arc<dyn CheckoutProvider>,
    reconcile: ReconcileCheckoutHandler,
}

impl CompleteCheckoutHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        provider: Arc<dyn CheckoutProvider>,
        catalog: Arc<PlanCatalog>,
    ) -> Self {
        Self {
            provider,
            reconcile: ReconcileCheckoutHandler::new(subscriptions, catalog),
        }
    }

    pub async fn handle(
        &self,
        cmd: CompleteCheckoutCommand,
    ) -> Result<ReconcileCheckoutResult, SubscriptionError> {
        let session = self.provider.retrieve_session(&cmd.session_id).await?;

        if session.client_reference_id.as_deref() != Some(cmd.user_id.as_str()) {
            tracing::warn!(
                user_id = %cmd.user_id,
                session_id = %cmd.session_id,
                "checkout session belongs to another user"
            );
            return Err(SubscriptionError::session_mismatch(cmd.session_id));
        }

        if !session.payment_status.is_settled() {
            return Err(SubscriptionError::not_paid(cmd.session_id));
        }

        let price_id = session.price_id.ok_or_else(|| {
            SubscriptionError::payment_provider("checkout session has no line item price")
        })?;

        self.reconcile
            .handle(ReconcileCheckoutCommand {
                user_id: cmd.user_id,
                session_id: session.id,
                price_id,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::adapters::stripe::MockCheckoutProvider;
    use crate::application::handlers::subscription::ReconcileOutcome;
    use crate::domain::subscription::{PlanId, PRO_MONTHLY_PRICE_ID};
    use crate::ports::{PaymentStatus, RetrievedSession};

    fn user() -> UserId {
        UserId::new("doctor-1").unwrap()
    }

    fn session(status: PaymentStatus, owner: &str) -> RetrievedSession {
        RetrievedSession {
            id: CheckoutSessionId::new("cs_test_return").unwrap(),
            client_reference_id: Some(owner.to_string()),
            payment_status: status,
            price_id: Some(PRO_MONTHLY_PRICE_ID.to_string()),
        }
    }

    fn setup(
        session: RetrievedSession,
    ) -> (CompleteCheckoutHandler, Arc<InMemorySubscriptionRepository>) {
        let provider = MockCheckoutProvider::new();
        provider.add_session(session);
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let handler = CompleteCheckoutHandler::new(
            repo.clone(),
            Arc::new(provider),
            Arc::new(PlanCatalog::standard()),
        );
        (handler, repo)
    }

    fn command() -> CompleteCheckoutCommand {
        CompleteCheckoutCommand {
            user_id: user(),
            session_id: CheckoutSessionId::new("cs_test_return").unwrap(),
        }
    }

    #[tokio::test]
    async fn paid_session_upgrades_the_user() {
        let (handler, repo) = setup(session(PaymentStatus::Paid, "doctor-1"));

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result.outcome, ReconcileOutcome::Applied);
        let stored = repo.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(stored.plan, Some(PlanId::Pro));
        assert_eq!(stored.credits_limit, 100);
    }

    #[tokio::test]
    async fn returning_twice_is_idempotent() {
        let (handler, _repo) = setup(session(PaymentStatus::Paid, "doctor-1"));

        handler.handle(command()).await.unwrap();
        let second = handler.handle(command()).await.unwrap();

        assert_eq!(second.outcome, ReconcileOutcome::AlreadyProcessed);
    }

    #[tokio::test]
    async fn other_users_session_is_rejected() {
        let (handler, repo) = setup(session(PaymentStatus::Paid, "someone-else"));

        let err = handler.handle(command()).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::CheckoutSessionMismatch { .. }));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn unpaid_session_is_not_reconciled() {
        let (handler, repo) = setup(session(PaymentStatus::Unpaid, "doctor-1"));

        let err = handler.handle(command()).await.unwrap_err();

        assert!(matches!(err, SubscriptionError::CheckoutNotPaid { .. }));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_session_is_a_validation_error() {
        let handler = CompleteCheckoutHandler::new(
            Arc::new(InMemorySubscriptionRepository::new()),
            Arc::new(MockCheckoutProvider::new()),
            Arc::new(PlanCatalog::standard()),
        );

        let err = handler.handle(command()).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::ValidationFailed { .. }));
    }
}
