//! HTTP adapter for the prescription widget.
//!
//! - `POST /api/prescriptions` - Prepare a prescription for a patient

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::AuthenticatedUser;
use crate::adapters::http::AppState;
use crate::application::handlers::prescription::StartPrescriptionCommand;
use crate::ports::PatientInfo;

/// POST /api/prescriptions - Body is the patient record.
pub async fn start_prescription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(patient): Json<PatientInfo>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = StartPrescriptionCommand {
        prescriber: user.user_id,
        patient,
    };
    let handle = state.start_prescription_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(handle)))
}

/// Routes mounted at `/prescriptions`.
pub fn prescription_routes() -> Router<AppState> {
    Router::new().route("/", post(start_prescription))
}
