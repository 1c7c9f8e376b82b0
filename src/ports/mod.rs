//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `SubscriptionRepository` - Per-user subscription records with conditional writes
//! - `ModuleRepository` - Module Registry
//!
//! ## External Service Ports
//!
//! - `CheckoutProvider` - Hosted checkout sessions and signed webhooks
//! - `AssistantDirectory` - AI assistant listing for the registry editor
//! - `PrescriptionWidget` - Digital-prescription vendor widget

mod assistant_directory;
mod checkout_provider;
mod module_repository;
mod prescription_widget;
mod subscription_repository;

pub use assistant_directory::{AssistantDirectory, AssistantSummary, DirectoryError};
pub use checkout_provider::{
    CheckoutProvider, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode,
    PaymentStatus, RetrievedSession, WebhookEvent, WebhookEventKind,
};
pub use module_repository::ModuleRepository;
pub use prescription_widget::{PatientInfo, PrescriptionError, PrescriptionHandle, PrescriptionWidget};
pub use subscription_repository::{SaveOutcome, SubscriptionRepository};
