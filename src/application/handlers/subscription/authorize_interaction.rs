//! AuthorizeInteractionHandler - Gatekeeper for one AI interaction.
//!
//! Checks that the module is usable on the user's plan and that a credit is
//! left, then consumes the credit and returns the assistant to talk to.
//! The check and the increment are separate steps, so two concurrent
//! interactions can each pass the check on the last credit; the store's
//! atomic increment keeps the count exact and at most one extra credit is
//! spent.

use std::sync::Arc;

use crate::domain::foundation::{AssistantId, ModuleId, UserId};
use crate::domain::subscription::{
    can_consume_credit, check_module_access, remaining_credits, AccessDeniedReason, AccessResult,
    PlanCatalog, SubscriptionError, UserSubscriptionState,
};
use crate::ports::{ModuleRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct AuthorizeInteractionCommand {
    pub user_id: UserId,
    pub module_id: ModuleId,
}

#[derive(Debug, Clone)]
pub struct AuthorizeInteractionResult {
    pub assistant_id: AssistantId,
    pub remaining_credits: u32,
    pub state: UserSubscriptionState,
}

pub struct AuthorizeInteractionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    modules: Arc<dyn ModuleRepository>,
    catalog: Arc<PlanCatalog>,
}

impl AuthorizeInteractionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        modules: Arc<dyn ModuleRepository>,
        catalog: Arc<PlanCatalog>,
    ) -> Self {
        Self {
            subscriptions,
            modules,
            catalog,
        }
    }

    pub async fn handle(
        &self,
        cmd: AuthorizeInteractionCommand,
    ) -> Result<AuthorizeInteractionResult, SubscriptionError> {
        let module = self
            .modules
            .find(&cmd.module_id)
            .await?
            .ok_or_else(|| SubscriptionError::module_not_found(cmd.module_id.clone()))?;

        let state = match self.subscriptions.find_by_user(&cmd.user_id).await? {
            Some(state) => state,
            None => {
                let fresh = UserSubscriptionState::new_freemium(cmd.user_id.clone(), &self.catalog);
                self.subscriptions.create(&fresh).await?
            }
        };

        if let AccessResult::Denied(reason) = check_module_access(Some(&state), &module) {
            tracing::info!(
                user_id = %cmd.user_id,
                module_id = %cmd.module_id,
                %reason,
                "interaction refused"
            );
            return Err(SubscriptionError::module_not_accessible(cmd.module_id, reason));
        }

        if !can_consume_credit(Some(&state)) {
            tracing::info!(
                user_id = %cmd.user_id,
                used = state.credits_used,
                limit = state.credits_limit,
                "interaction refused, credits exhausted"
            );
            return Err(SubscriptionError::insufficient_credits(
                state.credits_used,
                state.credits_limit,
            ));
        }

        let assistant_id = module.assistant_id.ok_or_else(|| {
            SubscriptionError::module_not_accessible(
                cmd.module_id.clone(),
                AccessDeniedReason::ModuleNotLinked,
            )
        })?;

        let updated = self.subscriptions.record_credit_use(&cmd.user_id).await?;
        let remaining = remaining_credits(Some(&updated));

        tracing::info!(
            user_id = %cmd.user_id,
            module_id = %cmd.module_id,
            remaining,
            "credit consumed"
        );

        Ok(AuthorizeInteractionResult {
            assistant_id,
            remaining_credits: remaining,
            state: updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryModuleRepository, InMemorySubscriptionRepository};
    use crate::domain::module::Module;
    use crate::domain::subscription::{ModuleTier, PlanId};

    fn user() -> UserId {
        UserId::new("doctor-1").unwrap()
    }

    fn modules() -> Arc<InMemoryModuleRepository> {
        Arc::new(InMemoryModuleRepository::with_modules(vec![
            Module::new(ModuleId::new("triage").unwrap(), "Triage", ModuleTier::Free)
                .linked_to(AssistantId::new("asst_triage").unwrap())
                .enabled(),
            Module::new(ModuleId::new("dosage").unwrap(), "Dosage", ModuleTier::Pro)
                .linked_to(AssistantId::new("asst_dosage").unwrap())
                .enabled(),
            Module::new(ModuleId::new("labs").unwrap(), "Labs", ModuleTier::Free),
        ]))
    }

    fn handler(subscriptions: Arc<InMemorySubscriptionRepository>) -> AuthorizeInteractionHandler {
        AuthorizeInteractionHandler::new(subscriptions, modules(), Arc::new(PlanCatalog::standard()))
    }

    fn command(module: &str) -> AuthorizeInteractionCommand {
        AuthorizeInteractionCommand {
            user_id: user(),
            module_id: ModuleId::new(module).unwrap(),
        }
    }

    #[tokio::test]
    async fn consumes_one_credit_and_returns_assistant() {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let result = handler(subscriptions.clone()).handle(command("triage")).await.unwrap();

        assert_eq!(result.assistant_id.as_str(), "asst_triage");
        assert_eq!(result.remaining_credits, 4);
        assert_eq!(result.state.credits_used, 1);
    }

    #[tokio::test]
    async fn freemium_user_runs_out_after_five_interactions() {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let handler = handler(subscriptions);

        for expected_remaining in (0..5).rev() {
            let result = handler.handle(command("triage")).await.unwrap();
            assert_eq!(result.remaining_credits, expected_remaining);
        }

        let err = handler.handle(command("triage")).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::InsufficientCredits { used: 5, limit: 5 }));
    }

    #[tokio::test]
    async fn tier_denial_does_not_consume_credit() {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let err = handler(subscriptions.clone()).handle(command("dosage")).await.unwrap_err();

        assert!(matches!(
            err,
            SubscriptionError::ModuleNotAccessible {
                reason: AccessDeniedReason::TierTooLow { required: ModuleTier::Pro, .. },
                ..
            }
        ));
        let state = subscriptions.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(state.credits_used, 0);
    }

    #[tokio::test]
    async fn pro_user_opens_pro_module() {
        let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
        let mut state = UserSubscriptionState::new_freemium(user(), &PlanCatalog::standard());
        state.plan = Some(PlanId::Pro);
        state.credits_limit = 100;
        subscriptions.insert(state).await;

        let result = handler(subscriptions).handle(command("dosage")).await.unwrap();
        assert_eq!(result.remaining_credits, 99);
    }

    #[tokio::test]
    async fn disabled_module_is_refused() {
        let err = handler(Arc::new(InMemorySubscriptionRepository::new()))
            .handle(command("labs"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubscriptionError::ModuleNotAccessible { reason: AccessDeniedReason::ModuleDisabled, .. }
        ));
    }

    #[tokio::test]
    async fn unknown_module_is_not_found() {
        let err = handler(Arc::new(InMemorySubscriptionRepository::new()))
            .handle(command("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::ModuleNotFound(_)));
    }
}
