//! Mock checkout provider.
//!
//! Configurable stand-in for `CheckoutProvider`, used by tests and by
//! development runs without billing credentials. Supports:
//! - Sessions created on demand and marked paid later
//! - Error injection per method
//! - Call tracking
//! - Webhook event simulation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::CheckoutSessionId;
use crate::ports::{
    CheckoutProvider, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentStatus,
    RetrievedSession, WebhookEvent,
};

/// # Example
///
/// ```ignore
/// let mock = MockCheckoutProvider::new();
/// let session = mock.create_checkout_session(request).await?;
/// mock.mark_paid(&session.id);
/// let retrieved = mock.retrieve_session(&session.id).await?;
/// assert_eq!(retrieved.payment_status, PaymentStatus::Paid);
/// ```
#[derive(Default, Clone)]
pub struct MockCheckoutProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    sessions: HashMap<String, RetrievedSession>,
    next_webhook_event: Option<WebhookEvent>,
    method_errors: HashMap<&'static str, PaymentError>,
    reject_webhooks: bool,
    created: u32,
    call_log: Vec<String>,
}

impl MockCheckoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that fails every webhook verification.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().reject_webhooks = true;
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a session as if the provider already knew it.
    pub fn add_session(&self, session: RetrievedSession) {
        self.state()
            .sessions
            .insert(session.id.as_str().to_string(), session);
    }

    /// Marks a known session as paid.
    pub fn mark_paid(&self, session_id: &CheckoutSessionId) {
        if let Some(session) = self.state().sessions.get_mut(session_id.as_str()) {
            session.payment_status = PaymentStatus::Paid;
        }
    }

    /// Event returned by the next `verify_webhook` call.
    pub fn set_webhook_event(&self, event: WebhookEvent) {
        self.state().next_webhook_event = Some(event);
    }

    /// Makes every call to `method` fail with `error`.
    pub fn fail_method(&self, method: &'static str, error: PaymentError) {
        self.state().method_errors.insert(method, error);
    }

    /// Names of the methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state().call_log.clone()
    }

    fn record(&self, method: &'static str) -> Result<(), PaymentError> {
        let mut state = self.state();
        state.call_log.push(method.to_string());
        match state.method_errors.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record("create_checkout_session")?;

        let mut state = self.state();
        state.created += 1;
        let raw_id = format!("cs_test_{:04}", state.created);
        let id = CheckoutSessionId::new(raw_id.clone())
            .map_err(|e| PaymentError::provider(e.to_string()))?;

        state.sessions.insert(
            raw_id.clone(),
            RetrievedSession {
                id: id.clone(),
                client_reference_id: Some(request.user_id.as_str().to_string()),
                payment_status: PaymentStatus::Unpaid,
                price_id: Some(request.price_id),
            },
        );

        Ok(CheckoutSession {
            id,
            url: format!("https://checkout.test/pay/{}", raw_id),
            expires_at: chrono::Utc::now().timestamp() + 24 * 60 * 60,
        })
    }

    async fn retrieve_session(
        &self,
        session_id: &CheckoutSessionId,
    ) -> Result<RetrievedSession, PaymentError> {
        self.record("retrieve_session")?;
        self.state()
            .sessions
            .get(session_id.as_str())
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Checkout session"))
    }

    fn verify_webhook(&self, _payload: &[u8], _signature: &str) -> Result<WebhookEvent, PaymentError> {
        self.record("verify_webhook")?;
        let mut state = self.state();
        if state.reject_webhooks {
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }
        state
            .next_webhook_event
            .take()
            .ok_or_else(|| PaymentError::invalid_webhook("No webhook event configured"))
    }
}
