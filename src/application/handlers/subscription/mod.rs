//! Subscription handlers.
//!
//! ## Commands
//! - Creating the Freemium record on first login
//! - Authorizing (and paying for) an AI interaction
//! - Starting a hosted checkout
//! - Completing a checkout on return
//! - Processing checkout webhooks
//! - Reconciling a purchase (shared by the two paths above)
//!
//! ## Queries
//! - Subscription status with module visibility

mod authorize_interaction;
mod complete_checkout;
mod ensure_subscription;
mod get_subscription_status;
mod handle_checkout_webhook;
mod reconcile_checkout;
mod start_checkout;

// Commands
pub use authorize_interaction::{
    AuthorizeInteractionCommand, AuthorizeInteractionHandler, AuthorizeInteractionResult,
};
pub use complete_checkout::{CompleteCheckoutCommand, CompleteCheckoutHandler};
pub use ensure_subscription::EnsureSubscriptionHandler;
pub use handle_checkout_webhook::{
    HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult,
    WebhookOutcome,
};
pub use reconcile_checkout::{
    ReconcileCheckoutCommand, ReconcileCheckoutHandler, ReconcileCheckoutResult, ReconcileOutcome,
};
pub use start_checkout::{CheckoutUrls, StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult};

// Queries
pub use get_subscription_status::{
    GetSubscriptionStatusHandler, GetSubscriptionStatusQuery, SubscriptionStatusView,
};
