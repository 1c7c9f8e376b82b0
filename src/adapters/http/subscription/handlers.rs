//! HTTP handlers for subscription endpoints.
//!
//! These handlers connect axum routes to the subscription command and query
//! handlers, and keep the subscription cache warm with every state they see.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::AuthenticatedUser;
use crate::adapters::http::AppState;
use crate::application::handlers::subscription::{
    AuthorizeInteractionCommand, CompleteCheckoutCommand, GetSubscriptionStatusQuery,
    HandleCheckoutWebhookCommand, StartCheckoutCommand,
};
use crate::domain::foundation::{CheckoutSessionId, ModuleId};
use crate::domain::subscription::SubscriptionError;

use super::dto::{
    AuthorizeInteractionRequest, AuthorizeInteractionResponse, CheckoutResponse,
    CompleteCheckoutRequest, CompleteCheckoutResponse, StartCheckoutRequest, SubscriptionResponse,
    WebhookAckResponse,
};

pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// GET /api/subscription - Plan, credits and module visibility.
pub async fn get_subscription_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> impl IntoResponse {
    let view = state
        .status_handler()
        .handle(GetSubscriptionStatusQuery {
            user_id: user.user_id,
        })
        .await;
    Json(view)
}

/// POST /api/subscription - Create the Freemium record on first login.
pub async fn ensure_subscription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .ensure_subscription_handler()
        .handle(&user.user_id)
        .await?;
    state.cache.put(&record).await;
    Ok(Json(SubscriptionResponse::from(&record)))
}

/// POST /api/subscription/interactions - Spend one credit on a module.
pub async fn authorize_interaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<AuthorizeInteractionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let module_id = ModuleId::new(req.module_id)?;
    let cmd = AuthorizeInteractionCommand {
        user_id: user.user_id.clone(),
        module_id,
    };

    match state.authorize_interaction_handler().handle(cmd).await {
        Ok(result) => {
            state.cache.put(&result.state).await;
            Ok(Json(AuthorizeInteractionResponse {
                assistant_id: result.assistant_id,
                remaining_credits: result.remaining_credits,
            }))
        }
        Err(err) => Err(state.refusal(&user.user_id, err).await),
    }
}

/// POST /api/subscription/checkout - Open a hosted checkout session.
pub async fn start_checkout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = StartCheckoutCommand {
        user_id: user.user_id,
        plan: req.plan,
        interval: req.interval,
        customer_email: req.customer_email.filter(|e| !e.trim().is_empty()),
    };

    let result = state.start_checkout_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(result))))
}

/// POST /api/subscription/checkout/complete - Reconcile after the redirect.
pub async fn complete_checkout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(req): Json<CompleteCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CompleteCheckoutCommand {
        user_id: user.user_id,
        session_id: CheckoutSessionId::new(req.session_id)?,
    };

    let result = state.complete_checkout_handler().handle(cmd).await?;
    state.cache.put(&result.state).await;
    Ok(Json(CompleteCheckoutResponse::from(&result)))
}

/// POST /api/webhooks/stripe - Signed checkout events.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            SubscriptionError::validation(STRIPE_SIGNATURE_HEADER, "Missing Stripe-Signature header")
        })?;

    let cmd = HandleCheckoutWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    let result = state.webhook_handler().handle(cmd).await?;
    Ok(Json(WebhookAckResponse::new(result.event_id, result.outcome)))
}
