//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod module;
pub mod prescription;
pub mod subscription;

pub use module::{
    ListAssistantsHandler, ListModulesHandler, ListModulesResult, ModuleAccessView,
    SaveModuleCommand, SaveModuleHandler, SaveModuleResult,
};
pub use prescription::{StartPrescriptionCommand, StartPrescriptionHandler};
pub use subscription::{
    AuthorizeInteractionCommand, AuthorizeInteractionHandler, AuthorizeInteractionResult,
    CheckoutUrls, CompleteCheckoutCommand, CompleteCheckoutHandler, EnsureSubscriptionHandler,
    GetSubscriptionStatusHandler, GetSubscriptionStatusQuery, HandleCheckoutWebhookCommand,
    HandleCheckoutWebhookHandler, HandleCheckoutWebhookResult, ReconcileCheckoutCommand,
    ReconcileCheckoutHandler, ReconcileCheckoutResult, ReconcileOutcome, StartCheckoutCommand,
    StartCheckoutHandler, StartCheckoutResult, SubscriptionStatusView, WebhookOutcome,
};
