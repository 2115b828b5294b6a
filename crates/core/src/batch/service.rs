//! Billing batch lifecycle service

use std::sync::Arc;

use chrono::Utc;
use debitum_domain::{
    BatchDetail, BatchStatus, BillingBatch, BillingError, Result, TimeEntry,
};
use tracing::info;
use uuid::Uuid;

use super::ports::BatchRepository;
use crate::classification::ports::TimeEntryRepository;

/// Service advancing billing batches through draft → review → exported →
/// locked
pub struct BatchService {
    batches: Arc<dyn BatchRepository>,
    entries: Arc<dyn TimeEntryRepository>,
}

impl BatchService {
    /// Create a new batch service
    pub fn new(batches: Arc<dyn BatchRepository>, entries: Arc<dyn TimeEntryRepository>) -> Self {
        Self { batches, entries }
    }

    /// Create a draft export batch from a set of entries for one customer
    /// and period.
    ///
    /// The caller-supplied total is checked against the sum of line amounts
    /// so a stale review screen cannot freeze a wrong figure into the
    /// batch. Every entry must belong to the customer and be unbatched;
    /// offending entries fail the whole operation.
    pub async fn create_batch(
        &self,
        customer_id: Uuid,
        year: i32,
        month: u32,
        entry_ids: &[Uuid],
        total_amount: i64,
        acting_user: &str,
    ) -> Result<BillingBatch> {
        if entry_ids.is_empty() {
            return Err(BillingError::Validation("a batch needs at least one entry".into()));
        }
        // Validates the period as a side effect.
        debitum_domain::PeriodWindow::for_month(year, month)?;

        let entries = self.entries.get_entries_by_ids(entry_ids).await?;
        verify_batchable(&entries, customer_id)?;

        let computed_total: i64 = entries.iter().map(TimeEntry::amount).sum();
        if computed_total != total_amount {
            return Err(BillingError::Validation(format!(
                "total_amount {total_amount} does not match the sum of line amounts \
                 {computed_total}; refresh and retry"
            )));
        }

        let batch = BillingBatch {
            id: Uuid::now_v7(),
            batch_id: BillingBatch::generate_display_id(year, month),
            customer_id,
            period_year: year,
            period_month: month,
            status: BatchStatus::Draft,
            total_amount: computed_total,
            created_by: acting_user.to_string(),
            created_at: Utc::now().timestamp(),
            exported_at: None,
            exported_by: None,
        };
        self.batches.create_batch(&batch, entry_ids).await?;

        info!(
            batch_id = %batch.batch_id,
            customer_id = %customer_id,
            entry_count = entry_ids.len(),
            total_amount = computed_total,
            "billing batch created"
        );
        Ok(batch)
    }

    /// Advance a batch to the next lifecycle status.
    ///
    /// Only the immediate next status is accepted; regressions and jumps
    /// are conflicts. The exported transition stamps export metadata and
    /// freezes the constituent entries.
    pub async fn advance_status(
        &self,
        batch_id: Uuid,
        new_status: BatchStatus,
        acting_user: &str,
    ) -> Result<BillingBatch> {
        let batch = self.batches.get_batch(batch_id).await?;
        if !batch.status.can_transition_to(new_status) {
            return Err(BillingError::Conflict(format!(
                "batch {} cannot move from {} to {}",
                batch.batch_id, batch.status, new_status
            )));
        }

        if new_status == BatchStatus::Exported {
            let exported_at = Utc::now().timestamp();
            self.batches.mark_exported(batch_id, exported_at, acting_user).await?;
        } else {
            self.batches.update_status(batch_id, new_status).await?;
        }

        info!(batch_id = %batch.batch_id, status = %new_status, "batch status advanced");
        self.batches.get_batch(batch_id).await
    }

    /// Batch metadata joined with its entries.
    pub async fn get_batch_detail(&self, batch_id: Uuid) -> Result<BatchDetail> {
        let batch = self.batches.get_batch(batch_id).await?;
        let entries = self.entries.find_by_batch(batch_id).await?;
        Ok(BatchDetail { batch, entries })
    }

    /// List batches for the review queue.
    pub async fn list_batches(
        &self,
        customer_id: Option<Uuid>,
        status: Option<BatchStatus>,
    ) -> Result<Vec<BillingBatch>> {
        self.batches.list_batches(customer_id, status).await
    }
}

fn verify_batchable(entries: &[TimeEntry], customer_id: Uuid) -> Result<()> {
    let foreign: Vec<String> = entries
        .iter()
        .filter(|entry| entry.customer_id != customer_id)
        .map(|entry| entry.id.to_string())
        .collect();
    if !foreign.is_empty() {
        return Err(BillingError::Conflict(format!(
            "entries do not belong to customer {customer_id}: {}",
            foreign.join(", ")
        )));
    }

    let batched: Vec<String> = entries
        .iter()
        .filter(|entry| entry.export_batch_id.is_some() || entry.is_exported)
        .map(|entry| entry.id.to_string())
        .collect();
    if !batched.is_empty() {
        return Err(BillingError::Conflict(format!(
            "entries already belong to an export batch: {}",
            batched.join(", ")
        )));
    }
    Ok(())
}
