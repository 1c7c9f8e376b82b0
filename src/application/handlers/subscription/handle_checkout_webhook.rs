//! HandleCheckoutWebhookHandler - Processes signed checkout events.
//!
//! Only `checkout.session.completed` changes anything; every other event is
//! acknowledged so the provider stops redelivering it. Reconciliation shares
//! the session marker with the browser-return path, so whichever arrives
//! second is a no-op.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{PlanCatalog, SubscriptionError};
use crate::ports::{CheckoutProvider, RetrievedSession, SubscriptionRepository, WebhookEventKind};

use super::reconcile_checkout::{ReconcileCheckoutCommand, ReconcileCheckoutHandler, ReconcileOutcome};

#[derive(Debug, Clone)]
pub struct HandleCheckoutWebhookCommand {
    pub payload: Vec<u8>,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Reconciled(ReconcileOutcome),
    /// Acknowledged without any state change.
    Ignored(String),
}

#[derive(Debug, Clone)]
pub struct HandleCheckoutWebhookResult {
    pub event_id: String,
    pub outcome: WebhookOutcome,
}

pub struct HandleCheckoutWebhookHandler {
    provider: Arc<dyn CheckoutProvider>,
    reconcile: ReconcileCheckoutHandler,
}

impl HandleCheckoutWebhookHandler {
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
        cmd: HandleCheckoutWebhookCommand,
    ) -> Result<HandleCheckoutWebhookResult, SubscriptionError> {
        let event = self
            .provider
            .verify_webhook(&cmd.payload, &cmd.signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "webhook verification failed");
                SubscriptionError::from(e)
            })?;

        tracing::info!(event_id = %event.id, "webhook received");

        let outcome = match event.kind {
            WebhookEventKind::CheckoutSessionCompleted(session) => {
                self.on_session_completed(session).await?
            }
            WebhookEventKind::Other(kind) => {
                tracing::debug!(event_id = %event.id, kind = %kind, "webhook event ignored");
                WebhookOutcome::Ignored(format!("unhandled event type {}", kind))
            }
        };

        Ok(HandleCheckoutWebhookResult {
            event_id: event.id,
            outcome,
        })
    }

    async fn on_session_completed(
        &self,
        session: RetrievedSession,
    ) -> Result<WebhookOutcome, SubscriptionError> {
        let user_id = match session
            .client_reference_id
            .as_deref()
            .map(UserId::new)
        {
            Some(Ok(user_id)) => user_id,
            _ => {
                tracing::warn!(session_id = %session.id, "completed session has no user reference");
                return Ok(WebhookOutcome::Ignored(
                    "session has no client reference".to_string(),
                ));
            }
        };

        if !session.payment_status.is_settled() {
            tracing::info!(user_id = %user_id, session_id = %session.id, "completed session not yet paid");
            return Ok(WebhookOutcome::Ignored("payment not settled".to_string()));
        }

        // Event payloads carry no line items.
        let price_id = match session.price_id {
            Some(price_id) => price_id,
            None => self
                .provider
                .retrieve_session(&session.id)
                .await?
                .price_id
                .ok_or_else(|| {
                    SubscriptionError::payment_provider("checkout session has no line item price")
                })?,
        };

        let result = self
            .reconcile
            .handle(ReconcileCheckoutCommand {
                user_id,
                session_id: session.id,
                price_id,
            })
            .await?;

        Ok(WebhookOutcome::Reconciled(result.outcome))
    }
}
