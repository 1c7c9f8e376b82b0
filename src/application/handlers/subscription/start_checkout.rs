//! StartCheckoutHandler - Opens a hosted checkout session for a plan.

use std::sync::Arc;

use crate::domain::foundation::{CheckoutSessionId, StateMachine, UserId};
use crate::domain::subscription::{
    BillingInterval, BillingPhase, PlanCatalog, PlanId, SubscriptionError,
};
use crate::ports::{CheckoutProvider, CreateCheckoutRequest, SubscriptionRepository};

/// Where the hosted checkout page sends the customer back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUrls {
    /// May contain `{CHECKOUT_SESSION_ID}`, filled in by the provider.
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub user_id: UserId,
    pub plan: PlanId,
    pub interval: BillingInterval,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StartCheckoutResult {
    pub session_id: CheckoutSessionId,
    pub checkout_url: String,
    pub expires_at: i64,
}

/// Nothing is written here; the record only changes once the session is
/// reconciled.
pub struct StartCheckoutHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    provider: Arc<dyn CheckoutProvider>,
    catalog: Arc<PlanCatalog>,
    urls: CheckoutUrls,
}

impl StartCheckoutHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        provider: Arc<dyn CheckoutProvider>,
        catalog: Arc<PlanCatalog>,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            subscriptions,
            provider,
            catalog,
            urls,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<StartCheckoutResult, SubscriptionError> {
        if !cmd.plan.is_paid() {
            return Err(SubscriptionError::validation(
                "plan",
                "the freemium plan cannot be purchased",
            ));
        }

        let price_id = self
            .catalog
            .plan(cmd.plan)
            .price_id(cmd.interval)
            .ok_or_else(|| {
                SubscriptionError::validation(
                    "interval",
                    format!("the {} plan is not sold with this billing interval", cmd.plan),
                )
            })?
            .to_string();

        let current = self.subscriptions.find_by_user(&cmd.user_id).await?;
        BillingPhase::of(current.as_ref()).transition_to(BillingPhase::PendingCheckout)?;

        let session = self
            .provider
            .create_checkout_session(CreateCheckoutRequest {
                user_id: cmd.user_id.clone(),
                price_id,
                customer_email: cmd.customer_email,
                success_url: self.urls.success_url.clone(),
                cancel_url: self.urls.cancel_url.clone(),
            })
            .await?;

        tracing::info!(
            user_id = %cmd.user_id,
            session_id = %session.id,
            plan = %cmd.plan,
            "checkout session created"
        );

        Ok(StartCheckoutResult {
            session_id: session.id,
            checkout_url: session.url,
            expires_at: session.expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::adapters::stripe::MockCheckoutProvider;
    use crate::domain::subscription::PRO_MONTHLY_PRICE_ID;
    use crate::ports::PaymentError;

    fn urls() -> CheckoutUrls {
        CheckoutUrls {
            success_url: "https://app.test/billing/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "https://app.test/billing".to_string(),
        }
    }

    fn handler(provider: MockCheckoutProvider) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            Arc::new(InMemorySubscriptionRepository::new()),
            Arc::new(provider),
            Arc::new(PlanCatalog::standard()),
            urls(),
        )
    }

    fn command(plan: PlanId, interval: BillingInterval) -> StartCheckoutCommand {
        StartCheckoutCommand {
            user_id: UserId::new("doctor-1").unwrap(),
            plan,
            interval,
            customer_email: Some("doc@clinic.test".to_string()),
        }
    }

    #[tokio::test]
    async fn pro_monthly_opens_session_with_pro_price() {
        let provider = MockCheckoutProvider::new();
        let result = handler(provider.clone())
            .handle(command(PlanId::Pro, BillingInterval::Monthly))
            .await
            .unwrap();

        assert!(result.checkout_url.contains(result.session_id.as_str()));
        let session = provider.retrieve_session(&result.session_id).await.unwrap();
        assert_eq!(session.price_id.as_deref(), Some(PRO_MONTHLY_PRICE_ID));
        assert_eq!(session.client_reference_id.as_deref(), Some("doctor-1"));
    }

    #[tokio::test]
    async fn freemium_cannot_be_bought() {
        let provider = MockCheckoutProvider::new();
        let err = handler(provider.clone())
            .handle(command(PlanId::Freemium, BillingInterval::Monthly))
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::ValidationFailed { ref field, .. } if field == "plan"));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn unpriced_interval_is_rejected() {
        let err = handler(MockCheckoutProvider::new())
            .handle(command(PlanId::Pro, BillingInterval::Yearly))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::ValidationFailed { ref field, .. } if field == "interval"));
    }

    #[tokio::test]
    async fn provider_failure_is_reported() {
        let provider = MockCheckoutProvider::new();
        provider.fail_method("create_checkout_session", PaymentError::network("timeout"));

        let err = handler(provider)
            .handle(command(PlanId::Pro, BillingInterval::Monthly))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::PaymentProvider(_)));
    }
}
