//! Billing summary types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::time_entry::TimeEntry;

/// Per-customer aggregation of unexported billable work for one period
///
/// Computed fresh per query from the ledger; never persisted. Bucket hours
/// split by billing type, `total_amount` in minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_number: String,
    pub total_hours: f64,
    pub timebank_hours: f64,
    pub overtime_hours: f64,
    pub hourly_hours: f64,
    pub total_amount: i64,
    pub entries: Vec<TimeEntry>,
}
