//! Port interfaces for agreement persistence

use async_trait::async_trait;
use debitum_domain::{Agreement, Result};
use uuid::Uuid;

/// Trait for managing customer billing agreements
#[async_trait]
pub trait AgreementRepository: Send + Sync {
    /// Insert a new agreement; conflicts if the customer already has an
    /// active one
    async fn insert_agreement(&self, agreement: &Agreement) -> Result<()>;

    /// Get an agreement by id
    async fn get_agreement(&self, id: Uuid) -> Result<Agreement>;

    /// The customer's active agreement, if any
    async fn active_for_customer(&self, customer_id: Uuid) -> Result<Option<Agreement>>;

    /// Mark an agreement terminated
    async fn terminate_agreement(&self, id: Uuid, terminated_at: i64) -> Result<()>;

    /// Terminate the previous agreement and insert its replacement in one
    /// atomic step
    async fn replace_active(&self, previous_id: Uuid, replacement: &Agreement) -> Result<()>;
}
