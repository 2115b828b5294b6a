//! Billing summary service

use std::collections::HashMap;
use std::sync::Arc;

use debitum_domain::{BillingSummary, Customer, PeriodWindow, Result};
use tracing::debug;
use uuid::Uuid;

use super::ports::{CustomerRepository, TimeEntryRepository};

/// Produces per-customer billing summaries for invoice review
pub struct BillingService {
    entries: Arc<dyn TimeEntryRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl BillingService {
    /// Create a new billing service
    pub fn new(
        entries: Arc<dyn TimeEntryRepository>,
        customers: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self { entries, customers }
    }

    /// Billing summaries for all customers with unexported billable work in
    /// the given month.
    pub async fn list_billing_summary(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<BillingSummary>> {
        let window = PeriodWindow::for_month(year, month)?;
        let entries =
            self.entries.find_billable_unexported_in_range(window.start, window.end).await?;

        let mut customer_ids: Vec<Uuid> =
            entries.iter().map(|entry| entry.customer_id).collect();
        customer_ids.sort_unstable();
        customer_ids.dedup();

        let customers: HashMap<Uuid, Customer> = self
            .customers
            .get_customers_by_ids(&customer_ids)
            .await?
            .into_iter()
            .map(|customer| (customer.id, customer))
            .collect();

        debug!(
            year,
            month,
            entry_count = entries.len(),
            customer_count = customers.len(),
            "aggregating billing summary"
        );
        super::summarize(window, &entries, &customers)
    }
}
