//! Time entry journaling and time-bank status routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use debitum_domain::{LineClassification, TimeBankPeriodStatus, TimeEntry, TimeEntryDraft};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{acting_user, ApiResult};
use crate::context::AppContext;

#[derive(Debug, Deserialize)]
pub struct ClassifyEntryRequest {
    pub agreement_id: Uuid,
    #[serde(default)]
    pub extra_billable: bool,
    pub entry: TimeEntryDraft,
}

#[derive(Debug, Serialize)]
pub struct ClassifiedEntryResponse {
    pub entry: TimeEntry,
    pub classification: LineClassification,
}

/// Classify and persist a journaled time entry.
///
/// The response carries `classification.excess_hours` so the UI can warn
/// when an entry crossed the time-bank boundary.
pub async fn classify_entry(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(request): Json<ClassifyEntryRequest>,
) -> ApiResult<(StatusCode, Json<ClassifiedEntryResponse>)> {
    let user = acting_user(&headers);
    let (entry, classification) = ctx
        .classification
        .classify_and_save(request.entry, request.agreement_id, request.extra_billable, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(ClassifiedEntryResponse { entry, classification })))
}

#[derive(Debug, Deserialize)]
pub struct TimebankQuery {
    pub date: Option<NaiveDate>,
}

/// Time-bank period status for an agreement; null for other contract types.
pub async fn get_timebank_status(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<Uuid>,
    Query(query): Query<TimebankQuery>,
) -> ApiResult<Json<Option<TimeBankPeriodStatus>>> {
    let status = ctx.classification.timebank_status(id, query.date).await?;
    Ok(Json(status))
}
