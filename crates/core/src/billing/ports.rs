//! Port interfaces for the customer registry

use async_trait::async_trait;
use debitum_domain::{Customer, Result};
use uuid::Uuid;

pub use crate::classification::ports::TimeEntryRepository;

/// Trait for reading the minimal customer records billing needs
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Register a customer
    async fn insert_customer(&self, customer: &Customer) -> Result<()>;

    /// Get a customer by id
    async fn get_customer(&self, id: Uuid) -> Result<Customer>;

    /// Fetch the customers for a set of ids; missing ids are simply absent
    /// from the result
    async fn get_customers_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Customer>>;
}
