//! Port interfaces for the time entry ledger

use async_trait::async_trait;
use chrono::NaiveDate;
use debitum_domain::{Result, TimeEntry};
use uuid::Uuid;

/// Trait for persisting and querying journaled time entries
///
/// Implementations must refuse to mutate or delete exported entries; those
/// rows are frozen for invoicing integrity.
#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    /// Persist a newly classified time entry
    async fn insert_entry(&self, entry: &TimeEntry) -> Result<()>;

    /// Get a time entry by id
    async fn get_entry(&self, id: Uuid) -> Result<TimeEntry>;

    /// Get the entries for a set of ids; every id must resolve
    async fn get_entries_by_ids(&self, ids: &[Uuid]) -> Result<Vec<TimeEntry>>;

    /// Update an unexported entry
    async fn update_entry(&self, entry: &TimeEntry) -> Result<()>;

    /// Delete an unexported entry
    async fn delete_entry(&self, id: Uuid) -> Result<()>;

    /// All entries for one customer within an inclusive date range
    async fn find_for_customer_in_range(
        &self,
        customer_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeEntry>>;

    /// Billable, unexported entries across all customers within an
    /// inclusive date range
    async fn find_billable_unexported_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeEntry>>;

    /// Entries stamped with a given export batch
    async fn find_by_batch(&self, batch_id: Uuid) -> Result<Vec<TimeEntry>>;
}
