//! HTTP routes exposed to the invoice review UI

pub mod billing;
pub mod journal;
pub mod registry;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use debitum_domain::constants::SYSTEM_USER;
use debitum_domain::BillingError;

use crate::context::AppContext;

/// Build the application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/billing/summary", get(billing::list_billing_summary))
        .route("/billing/batches", post(billing::create_export_batch).get(billing::list_batches))
        .route("/billing/batches/{id}", get(billing::get_batch_detail))
        .route("/billing/batches/{id}/status", post(billing::set_batch_status))
        .route("/time-entries", post(journal::classify_entry))
        .route("/agreements/{id}/timebank", get(journal::get_timebank_status))
        .route("/customers", post(registry::create_customer))
        .route("/customers/{id}/agreement", get(registry::get_active_agreement))
        .route("/agreements", post(registry::create_agreement))
        .route("/agreements/{id}/terminate", post(registry::terminate_agreement))
        .with_state(ctx)
}

/// Domain error wrapper carrying the HTTP mapping.
///
/// Validation problems are the caller's fault (400), conflicts identify the
/// blocking record (409), and persistence failures stay opaque (500).
pub struct ApiError(BillingError);

/// Result alias for route handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BillingError::Validation(_) | BillingError::Config(_) => StatusCode::BAD_REQUEST,
            BillingError::NotFound(_) => StatusCode::NOT_FOUND,
            BillingError::Conflict(_) => StatusCode::CONFLICT,
            BillingError::Database(_) | BillingError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(self.0)).into_response()
    }
}

/// Acting user from the identity collaborator, with a system fallback.
pub(crate) fn acting_user(headers: &HeaderMap) -> String {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or(SYSTEM_USER)
        .to_string()
}

async fn health(
    axum::extract::State(ctx): axum::extract::State<Arc<AppContext>>,
) -> ApiResult<Json<serde_json::Value>> {
    ctx.health_check()?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
