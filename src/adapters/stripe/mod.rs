//! Stripe checkout adapter.
//!
//! Implements the `CheckoutProvider` port for Stripe, including:
//! - Hosted checkout sessions (subscription mode)
//! - Session lookup with line items expanded
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`
//!
//! `MockCheckoutProvider` stands in when no API key is configured.

mod mock_checkout_provider;
mod stripe_adapter;
mod webhook_types;

pub use mock_checkout_provider::MockCheckoutProvider;
pub use stripe_adapter::{StripeCheckoutAdapter, StripeConfig};
pub use webhook_types::{SignatureHeader, SignatureParseError, StripeCheckoutSession, StripeWebhookEvent};
