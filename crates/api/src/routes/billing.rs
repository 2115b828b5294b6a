//! Billing summary and batch routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use debitum_domain::{BatchDetail, BatchStatus, BillingBatch, BillingSummary};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{acting_user, ApiResult};
use crate::context::AppContext;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub year: i32,
    pub month: u32,
}

/// Per-customer billing summaries for one month.
pub async fn list_billing_summary(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<Vec<BillingSummary>>> {
    let summaries = ctx.billing.list_billing_summary(query.year, query.month).await?;
    Ok(Json(summaries))
}

#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    pub customer_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub entry_ids: Vec<Uuid>,
    pub total_amount: i64,
}

/// Create a draft export batch from selected entries.
pub async fn create_export_batch(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(request): Json<CreateBatchRequest>,
) -> ApiResult<(StatusCode, Json<BillingBatch>)> {
    let user = acting_user(&headers);
    info!(
        customer_id = %request.customer_id,
        entry_count = request.entry_ids.len(),
        "creating export batch"
    );
    let batch = ctx
        .batches
        .create_batch(
            request.customer_id,
            request.year,
            request.month,
            &request.entry_ids,
            request.total_amount,
            &user,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

#[derive(Debug, Deserialize)]
pub struct BatchListQuery {
    pub customer_id: Option<Uuid>,
    pub status: Option<BatchStatus>,
}

/// List batches for the review queue.
pub async fn list_batches(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<BatchListQuery>,
) -> ApiResult<Json<Vec<BillingBatch>>> {
    let batches = ctx.batches.list_batches(query.customer_id, query.status).await?;
    Ok(Json(batches))
}

/// Batch metadata joined with its entries.
pub async fn get_batch_detail(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BatchDetail>> {
    let detail = ctx.batches.get_batch_detail(id).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: BatchStatus,
}

/// Advance a batch to the next lifecycle status.
pub async fn set_batch_status(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<SetStatusRequest>,
) -> ApiResult<Json<BillingBatch>> {
    let user = acting_user(&headers);
    let batch = ctx.batches.advance_status(id, request.status, &user).await?;
    Ok(Json(batch))
}
