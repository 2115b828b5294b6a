//! Time-bank period accounting types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Consumption of a time-bank agreement over one period window
///
/// Derived on demand from the ledger, never persisted. `hours_used` counts
/// only entries classified as timebank; overtime-classified entries are
/// tracked separately in `overtime_hours`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBankPeriodStatus {
    pub agreement_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub included_hours: f64,
    pub hours_used: f64,
    /// Unconsumed pool, clamped at zero.
    pub hours_remaining: f64,
    pub overtime_hours: f64,
    /// Consumption against the pool in percent; 0 when no pool is defined.
    pub percent_used: f64,
    pub is_overtime: bool,
}
