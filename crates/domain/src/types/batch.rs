//! Billing batch types
//!
//! A batch is a frozen, exportable group of time entries for one customer
//! and period. Its status only moves forward: draft → review → exported →
//! locked. Once a batch reaches `exported`, its entries are immutable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{BATCH_ID_PREFIX, BATCH_ID_TOKEN_LEN};
use crate::impl_status_conversions;
use crate::types::time_entry::TimeEntry;

/// Billing batch lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Draft,
    Review,
    Exported,
    Locked,
}

impl_status_conversions!(BatchStatus {
    Draft => "draft",
    Review => "review",
    Exported => "exported",
    Locked => "locked",
});

impl BatchStatus {
    /// Allowed-transitions table: forward one step only, no regression and
    /// no skipping.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Review)
                | (Self::Review, Self::Exported)
                | (Self::Exported, Self::Locked)
        )
    }

    /// Whether entries referencing a batch in this state are frozen.
    pub fn locks_entries(self) -> bool {
        matches!(self, Self::Exported | Self::Locked)
    }
}

/// Frozen export batch for one customer and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingBatch {
    pub id: Uuid,
    /// Human-readable identifier, `B-<YYYY><MM>-<token>`.
    pub batch_id: String,
    pub customer_id: Uuid,
    pub period_year: i32,
    pub period_month: u32,
    pub status: BatchStatus,
    /// Sum of line amounts in minor units, fixed at creation time.
    pub total_amount: i64,
    pub created_by: String,
    pub created_at: i64,
    pub exported_at: Option<i64>,
    pub exported_by: Option<String>,
}

impl BillingBatch {
    /// Generate a display identifier for a period.
    ///
    /// The token is drawn from a v4 UUID so concurrent creations cannot
    /// collide the way wall-clock derived identifiers can.
    pub fn generate_display_id(year: i32, month: u32) -> String {
        let token: String =
            Uuid::new_v4().simple().to_string().chars().take(BATCH_ID_TOKEN_LEN).collect();
        format!("{BATCH_ID_PREFIX}-{year:04}{month:02}-{token}")
    }
}

/// Batch metadata joined with its constituent entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDetail {
    pub batch: BillingBatch,
    pub entries: Vec<TimeEntry>,
}
