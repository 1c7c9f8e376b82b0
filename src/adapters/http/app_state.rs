//! Shared application state.
//!
//! Cloned for every request. Holds the Arc-wrapped ports plus the pieces of
//! configuration handlers need, and builds handlers on demand.

use std::sync::Arc;
use std::time::Duration;

use crate::application::handlers::module::{ListAssistantsHandler, ListModulesHandler, SaveModuleHandler};
use crate::application::handlers::prescription::StartPrescriptionHandler;
use crate::application::handlers::subscription::{
    AuthorizeInteractionHandler, CheckoutUrls, CompleteCheckoutHandler, EnsureSubscriptionHandler,
    GetSubscriptionStatusHandler, HandleCheckoutWebhookHandler, StartCheckoutHandler,
};
use crate::application::SubscriptionStateCache;
use crate::domain::foundation::UserId;
use crate::domain::subscription::{upgrade_prompt, PlanCatalog, PromptTrigger, SubscriptionError};
use crate::ports::{
    AssistantDirectory, CheckoutProvider, ModuleRepository, PrescriptionWidget,
    SubscriptionRepository,
};

use super::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub modules: Arc<dyn ModuleRepository>,
    pub checkout: Arc<dyn CheckoutProvider>,
    pub assistants: Arc<dyn AssistantDirectory>,
    pub prescriptions: Arc<dyn PrescriptionWidget>,
    pub catalog: Arc<PlanCatalog>,
    pub cache: SubscriptionStateCache,
    pub checkout_urls: CheckoutUrls,
    /// Upper bound on status reads before falling back to cached data.
    pub fetch_timeout: Duration,
}

impl AppState {
    pub fn ensure_subscription_handler(&self) -> EnsureSubscriptionHandler {
        EnsureSubscriptionHandler::new(self.subscriptions.clone(), self.catalog.clone())
    }

    pub fn status_handler(&self) -> GetSubscriptionStatusHandler {
        GetSubscriptionStatusHandler::new(
            self.subscriptions.clone(),
            self.modules.clone(),
            self.cache.clone(),
            self.fetch_timeout,
        )
    }

    pub fn authorize_interaction_handler(&self) -> AuthorizeInteractionHandler {
        AuthorizeInteractionHandler::new(
            self.subscriptions.clone(),
            self.modules.clone(),
            self.catalog.clone(),
        )
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.subscriptions.clone(),
            self.checkout.clone(),
            self.catalog.clone(),
            self.checkout_urls.clone(),
        )
    }

    pub fn complete_checkout_handler(&self) -> CompleteCheckoutHandler {
        CompleteCheckoutHandler::new(
            self.subscriptions.clone(),
            self.checkout.clone(),
            self.catalog.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleCheckoutWebhookHandler {
        HandleCheckoutWebhookHandler::new(
            self.subscriptions.clone(),
            self.checkout.clone(),
            self.catalog.clone(),
        )
    }

    pub fn list_modules_handler(&self) -> ListModulesHandler {
        ListModulesHandler::new(
            self.subscriptions.clone(),
            self.modules.clone(),
            self.cache.clone(),
            self.fetch_timeout,
        )
    }

    pub fn save_module_handler(&self) -> SaveModuleHandler {
        SaveModuleHandler::new(self.modules.clone())
    }

    pub fn list_assistants_handler(&self) -> ListAssistantsHandler {
        ListAssistantsHandler::new(self.assistants.clone())
    }

    pub fn start_prescription_handler(&self) -> StartPrescriptionHandler {
        StartPrescriptionHandler::new(self.prescriptions.clone())
    }

    /// Turns a refusal into an API error, attaching an upgrade prompt when
    /// the user can do something about it.
    pub async fn refusal(&self, user_id: &UserId, err: SubscriptionError) -> ApiError {
        let trigger = match &err {
            SubscriptionError::InsufficientCredits { .. } => PromptTrigger::CreditsExhausted,
            SubscriptionError::ModuleNotAccessible { reason, .. } => {
                PromptTrigger::ModuleDenied(*reason)
            }
            _ => return err.into(),
        };

        let state = self
            .cache
            .read_through(self.subscriptions.as_ref(), user_id, self.fetch_timeout)
            .await
            .into_value();
        let prompt = upgrade_prompt(state.as_ref(), trigger, &self.catalog);
        ApiError::from(err).with_prompt(prompt)
    }
}
