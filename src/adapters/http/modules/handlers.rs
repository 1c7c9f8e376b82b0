//! HTTP handlers for Module Registry endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{AdminUser, AuthenticatedUser};
use crate::adapters::http::AppState;
use crate::application::handlers::module::SaveModuleCommand;
use crate::domain::foundation::{AssistantId, ModuleId};

use super::dto::{AssistantListResponse, ModuleListResponse, SaveModuleRequest};

/// GET /api/modules - Enabled modules with their lock state for this user.
pub async fn list_modules(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> impl IntoResponse {
    let result = state.list_modules_handler().handle(&user.user_id).await;
    Json(ModuleListResponse::from(result))
}

/// GET /api/admin/modules - The whole registry, disabled entries included.
pub async fn list_registry(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let modules = state.list_modules_handler().handle_admin().await?;
    Ok(Json(modules))
}

/// PUT /api/admin/modules/:id - Create or replace a registry entry.
pub async fn save_module(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<SaveModuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let assistant_id = match req.assistant_id.filter(|a| !a.trim().is_empty()) {
        Some(raw) => Some(AssistantId::new(raw.trim())?),
        None => None,
    };
    let cmd = SaveModuleCommand {
        id: ModuleId::new(id)?,
        name: req.name,
        tier: req.tier,
        assistant_id,
        enabled: req.enabled,
    };

    let result = state.save_module_handler().handle(cmd).await?;
    tracing::info!(admin = %admin.user_id, module_id = %result.module.id, "registry updated");

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result.module)))
}

/// GET /api/admin/assistants - Assistants available for binding.
pub async fn list_assistants(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let assistants = state.list_assistants_handler().handle().await?;
    Ok(Json(AssistantListResponse { assistants }))
}
