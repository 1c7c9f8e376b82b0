//! Request identity extractors for axum.
//!
//! Authentication itself happens upstream; by the time a request reaches
//! this service the gateway has stamped it with the caller's identity:
//!
//! ```text
//! X-User-Id:   <opaque user id>
//! X-User-Role: admin            (registry editors only)
//! ```
//!
//! - `AuthenticatedUser` requires `X-User-Id` (401 otherwise)
//! - `AdminUser` additionally requires `X-User-Role: admin` (403 otherwise)

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::{ErrorCode, UserId};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

const ADMIN_ROLE: &str = "admin";

/// The caller, as identified by the gateway.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// A caller allowed to edit the Module Registry.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: UserId,
}

/// Rejection for the identity extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No usable `X-User-Id` header.
    Unauthenticated,
    /// Identified, but not an administrator.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "Authentication is required",
            ),
            AuthRejection::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorCode::Forbidden,
                "Administrator role is required",
            ),
        };
        (status, Json(ErrorResponse::new(code.to_string(), message))).into_response()
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn user_id_from(parts: &Parts) -> Result<UserId, AuthRejection> {
    header(parts, USER_ID_HEADER)
        .and_then(|raw| UserId::new(raw).ok())
        .ok_or(AuthRejection::Unauthenticated)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from(parts)?;
        Ok(AuthenticatedUser { user_id })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from(parts)?;
        let is_admin = header(parts, USER_ROLE_HEADER)
            .map(|role| role.eq_ignore_ascii_case(ADMIN_ROLE))
            .unwrap_or(false);

        if !is_admin {
            tracing::warn!(user_id = %user_id, "admin route refused");
            return Err(AuthRejection::Forbidden);
        }
        Ok(AdminUser { user_id })
    }
}
