//! Customer registry types
//!
//! The billing engine only needs the identity fields that appear on
//! invoices; the surrounding CRM owns everything else about a customer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimal customer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub customer_number: String,
    pub created_at: i64,
}
