//! Time entry ledger types
//!
//! A time entry records journaled work: a duration, a date, and the billing
//! classification assigned when the entry was committed. Entries become
//! immutable once they have been exported in a billing batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::HOURS_GRANULARITY;
use crate::errors::{BillingError, Result};
use crate::impl_status_conversions;

/// Billing classification of a time entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingType {
    /// Billed at the agreement's hourly rate.
    Hourly,
    /// Covered by the retainer pool; no line amount.
    Timebank,
    /// Billed at the agreement's overtime rate.
    Overtime,
    /// Internal or fixed-fee work, not billed per line.
    None,
}

impl_status_conversions!(BillingType {
    Hourly => "hourly",
    Timebank => "timebank",
    Overtime => "overtime",
    None => "none",
});

/// Line amount in minor units for a duration at a rate.
pub fn line_amount(hours: f64, rate_minor: i64) -> i64 {
    (hours * rate_minor as f64).round() as i64
}

/// Journaled work record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub assignment_id: Option<Uuid>,
    pub entry_date: NaiveDate,
    /// Duration in hours, quarter-hour granularity.
    pub hours: f64,
    pub billing_type: BillingType,
    /// Rate snapshot in minor units taken at classification time.
    pub hourly_rate: i64,
    pub is_billable: bool,
    pub is_exported: bool,
    /// Set once the entry is stamped into a billing batch.
    pub export_batch_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: i64,
}

impl TimeEntry {
    /// Invoiceable amount for this line in minor units.
    pub fn amount(&self) -> i64 {
        line_amount(self.hours, self.hourly_rate)
    }
}

/// Input for journaling a new time entry, before classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntryDraft {
    pub customer_id: Uuid,
    pub assignment_id: Option<Uuid>,
    pub entry_date: NaiveDate,
    pub hours: f64,
    /// False marks the work as internal regardless of agreement type.
    #[serde(default = "default_billable")]
    pub is_billable: bool,
    pub description: Option<String>,
}

fn default_billable() -> bool {
    true
}

impl TimeEntryDraft {
    /// Reject malformed durations before any classification or persistence.
    pub fn validate(&self) -> Result<()> {
        if self.hours < 0.0 || !self.hours.is_finite() {
            return Err(BillingError::Validation("hours must be a non-negative number".into()));
        }
        let quarters = self.hours / HOURS_GRANULARITY;
        if (quarters - quarters.round()).abs() > f64::EPSILON {
            return Err(BillingError::Validation(format!(
                "hours must be a multiple of {HOURS_GRANULARITY}"
            )));
        }
        Ok(())
    }
}

/// Outcome of classifying one time entry against an agreement
///
/// `excess_hours` is the part of the entry that does not fit in the
/// remaining time-bank balance. It is surfaced so the caller can warn the
/// user before committing a boundary-crossing entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineClassification {
    pub billing_type: BillingType,
    /// Effective rate snapshot in minor units.
    pub rate: i64,
    pub is_billable: bool,
    pub excess_hours: f64,
}
