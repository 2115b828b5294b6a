//! Port interfaces for billing batch persistence

use async_trait::async_trait;
use debitum_domain::{BatchStatus, BillingBatch, Result};
use uuid::Uuid;

/// Trait for managing billing batch records
///
/// The mutating operations are transactional: batch creation stamps every
/// referenced entry or fails as a whole, and the exported transition flips
/// the batch row and its entries' exported flags together.
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// Insert a draft batch and stamp the referenced entries with its id.
    ///
    /// Fails with a conflict if any entry already carries a batch id or
    /// belongs to a different customer; no entry may be stamped when the
    /// operation fails.
    async fn create_batch(&self, batch: &BillingBatch, entry_ids: &[Uuid]) -> Result<()>;

    /// Get a batch by its row id
    async fn get_batch(&self, id: Uuid) -> Result<BillingBatch>;

    /// List batches, optionally filtered by customer and status
    async fn list_batches(
        &self,
        customer_id: Option<Uuid>,
        status: Option<BatchStatus>,
    ) -> Result<Vec<BillingBatch>>;

    /// Update the status of a batch (non-exporting transitions)
    async fn update_status(&self, id: Uuid, status: BatchStatus) -> Result<()>;

    /// Perform the exported transition: stamp the export metadata and mark
    /// every entry referencing this batch as exported, atomically.
    async fn mark_exported(&self, id: Uuid, exported_at: i64, exported_by: &str) -> Result<()>;
}
