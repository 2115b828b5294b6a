//! Customer and agreement registry routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use debitum_domain::{Agreement, AgreementDraft, Customer};
use serde::Deserialize;
use uuid::Uuid;

use super::ApiResult;
use crate::context::AppContext;

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub customer_number: String,
}

/// Register a customer.
pub async fn create_customer(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<CreateCustomerRequest>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = Customer {
        id: Uuid::now_v7(),
        name: request.name,
        customer_number: request.customer_number,
        created_at: Utc::now().timestamp(),
    };
    ctx.customers.insert_customer(&customer).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[derive(Debug, Deserialize)]
pub struct CreateAgreementRequest {
    #[serde(flatten)]
    pub draft: AgreementDraft,
    /// Terminate and supersede an existing active agreement.
    #[serde(default)]
    pub replace_active: bool,
}

/// Create (or replace) a customer's billing agreement.
pub async fn create_agreement(
    State(ctx): State<Arc<AppContext>>,
    Json(request): Json<CreateAgreementRequest>,
) -> ApiResult<(StatusCode, Json<Agreement>)> {
    let agreement = if request.replace_active {
        ctx.agreements.replace_agreement(request.draft).await?
    } else {
        ctx.agreements.create_agreement(request.draft).await?
    };
    Ok((StatusCode::CREATED, Json(agreement)))
}

/// Terminate an agreement.
pub async fn terminate_agreement(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Agreement>> {
    let agreement = ctx.agreements.terminate_agreement(id).await?;
    Ok(Json(agreement))
}

/// The customer's active agreement, if any.
pub async fn get_active_agreement(
    State(ctx): State<Arc<AppContext>>,
    Path(customer_id): Path<Uuid>,
) -> ApiResult<Json<Option<Agreement>>> {
    let agreement = ctx.agreements.active_for_customer(customer_id).await?;
    Ok(Json(agreement))
}
