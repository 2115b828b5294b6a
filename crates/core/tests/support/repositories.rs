//! Mock repository implementations for testing
//!
//! In-memory mocks for the core ports, enabling deterministic service
//! tests without a database. The batch mock shares the ledger mock so
//! stamping and export flags behave like the real adapters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use debitum_core::{AgreementRepository, BatchRepository, CustomerRepository, TimeEntryRepository};
use debitum_domain::{
    Agreement, AgreementStatus, BatchStatus, BillingBatch, BillingError, Customer,
    Result as DomainResult, TimeEntry,
};
use uuid::Uuid;

/// In-memory mock for `AgreementRepository`.
#[derive(Default)]
pub struct MockAgreementRepository {
    agreements: Mutex<HashMap<Uuid, Agreement>>,
}

impl MockAgreementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgreementRepository for MockAgreementRepository {
    async fn insert_agreement(&self, agreement: &Agreement) -> DomainResult<()> {
        let mut map = self.agreements.lock().expect("mock lock poisoned");
        let duplicate = agreement.status == AgreementStatus::Active
            && map.values().any(|existing| {
                existing.customer_id == agreement.customer_id
                    && existing.status == AgreementStatus::Active
            });
        if duplicate {
            return Err(BillingError::Conflict(format!(
                "customer {} already has an active agreement",
                agreement.customer_id
            )));
        }
        map.insert(agreement.id, agreement.clone());
        Ok(())
    }

    async fn get_agreement(&self, id: Uuid) -> DomainResult<Agreement> {
        self.agreements
            .lock()
            .expect("mock lock poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| BillingError::NotFound(format!("agreement {id}")))
    }

    async fn active_for_customer(&self, customer_id: Uuid) -> DomainResult<Option<Agreement>> {
        Ok(self
            .agreements
            .lock()
            .expect("mock lock poisoned")
            .values()
            .find(|agreement| {
                agreement.customer_id == customer_id
                    && agreement.status == AgreementStatus::Active
            })
            .cloned())
    }

    async fn terminate_agreement(&self, id: Uuid, terminated_at: i64) -> DomainResult<()> {
        let mut map = self.agreements.lock().expect("mock lock poisoned");
        let agreement = map
            .get_mut(&id)
            .ok_or_else(|| BillingError::NotFound(format!("agreement {id}")))?;
        agreement.status = AgreementStatus::Terminated;
        agreement.terminated_at = Some(terminated_at);
        Ok(())
    }

    async fn replace_active(
        &self,
        previous_id: Uuid,
        replacement: &Agreement,
    ) -> DomainResult<()> {
        let mut map = self.agreements.lock().expect("mock lock poisoned");
        let previous = map
            .get_mut(&previous_id)
            .ok_or_else(|| BillingError::NotFound(format!("agreement {previous_id}")))?;
        previous.status = AgreementStatus::Terminated;
        previous.terminated_at = Some(replacement.created_at);
        map.insert(replacement.id, replacement.clone());
        Ok(())
    }
}

/// In-memory mock for `TimeEntryRepository`.
#[derive(Default)]
pub struct MockTimeEntryRepository {
    entries: Mutex<HashMap<Uuid, TimeEntry>>,
}

impl MockTimeEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct read of a stored entry, bypassing the port.
    pub fn stored(&self, id: Uuid) -> Option<TimeEntry> {
        self.entries.lock().expect("mock lock poisoned").get(&id).cloned()
    }

    fn stamp(&self, ids: &[Uuid], batch_id: Uuid) -> DomainResult<()> {
        let mut map = self.entries.lock().expect("mock lock poisoned");
        let mut offenders = Vec::new();
        for id in ids {
            match map.get(id) {
                Some(entry) if entry.export_batch_id.is_some() || entry.is_exported => {
                    offenders.push(id.to_string());
                }
                Some(_) => {}
                None => return Err(BillingError::NotFound(format!("time entry {id}"))),
            }
        }
        if !offenders.is_empty() {
            return Err(BillingError::Conflict(format!(
                "entries already batched: {}",
                offenders.join(", ")
            )));
        }
        for id in ids {
            if let Some(entry) = map.get_mut(id) {
                entry.export_batch_id = Some(batch_id);
            }
        }
        Ok(())
    }

    fn mark_exported(&self, batch_id: Uuid) {
        let mut map = self.entries.lock().expect("mock lock poisoned");
        for entry in map.values_mut() {
            if entry.export_batch_id == Some(batch_id) {
                entry.is_exported = true;
            }
        }
    }
}

#[async_trait]
impl TimeEntryRepository for MockTimeEntryRepository {
    async fn insert_entry(&self, entry: &TimeEntry) -> DomainResult<()> {
        self.entries.lock().expect("mock lock poisoned").insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_entry(&self, id: Uuid) -> DomainResult<TimeEntry> {
        self.entries
            .lock()
            .expect("mock lock poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| BillingError::NotFound(format!("time entry {id}")))
    }

    async fn get_entries_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<TimeEntry>> {
        let map = self.entries.lock().expect("mock lock poisoned");
        ids.iter()
            .map(|id| {
                map.get(id)
                    .cloned()
                    .ok_or_else(|| BillingError::NotFound(format!("time entry {id}")))
            })
            .collect()
    }

    async fn update_entry(&self, entry: &TimeEntry) -> DomainResult<()> {
        let mut map = self.entries.lock().expect("mock lock poisoned");
        let existing = map
            .get_mut(&entry.id)
            .ok_or_else(|| BillingError::NotFound(format!("time entry {}", entry.id)))?;
        if existing.is_exported {
            return Err(BillingError::Conflict(format!(
                "time entry {} is exported and immutable",
                entry.id
            )));
        }
        *existing = entry.clone();
        Ok(())
    }

    async fn delete_entry(&self, id: Uuid) -> DomainResult<()> {
        let mut map = self.entries.lock().expect("mock lock poisoned");
        match map.get(&id) {
            Some(entry) if entry.is_exported => Err(BillingError::Conflict(format!(
                "time entry {id} is exported and immutable"
            ))),
            Some(_) => {
                map.remove(&id);
                Ok(())
            }
            None => Err(BillingError::NotFound(format!("time entry {id}"))),
        }
    }

    async fn find_for_customer_in_range(
        &self,
        customer_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TimeEntry>> {
        Ok(self
            .entries
            .lock()
            .expect("mock lock poisoned")
            .values()
            .filter(|entry| {
                entry.customer_id == customer_id
                    && entry.entry_date >= start
                    && entry.entry_date <= end
            })
            .cloned()
            .collect())
    }

    async fn find_billable_unexported_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TimeEntry>> {
        Ok(self
            .entries
            .lock()
            .expect("mock lock poisoned")
            .values()
            .filter(|entry| {
                entry.is_billable
                    && !entry.is_exported
                    && entry.entry_date >= start
                    && entry.entry_date <= end
            })
            .cloned()
            .collect())
    }

    async fn find_by_batch(&self, batch_id: Uuid) -> DomainResult<Vec<TimeEntry>> {
        Ok(self
            .entries
            .lock()
            .expect("mock lock poisoned")
            .values()
            .filter(|entry| entry.export_batch_id == Some(batch_id))
            .cloned()
            .collect())
    }
}

/// In-memory mock for `CustomerRepository`.
#[derive(Default)]
pub struct MockCustomerRepository {
    customers: Mutex<HashMap<Uuid, Customer>>,
}

impl MockCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for MockCustomerRepository {
    async fn insert_customer(&self, customer: &Customer) -> DomainResult<()> {
        self.customers.lock().expect("mock lock poisoned").insert(customer.id, customer.clone());
        Ok(())
    }

    async fn get_customer(&self, id: Uuid) -> DomainResult<Customer> {
        self.customers
            .lock()
            .expect("mock lock poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| BillingError::NotFound(format!("customer {id}")))
    }

    async fn get_customers_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Customer>> {
        let map = self.customers.lock().expect("mock lock poisoned");
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }
}

/// In-memory mock for `BatchRepository`.
///
/// Shares the ledger mock so batch creation stamps entries and the
/// exported transition flips their flags, mirroring the transactional
/// adapters.
pub struct MockBatchRepository {
    batches: Mutex<HashMap<Uuid, BillingBatch>>,
    ledger: Arc<MockTimeEntryRepository>,
}

impl MockBatchRepository {
    pub fn new(ledger: Arc<MockTimeEntryRepository>) -> Self {
        Self { batches: Mutex::new(HashMap::new()), ledger }
    }
}

#[async_trait]
impl BatchRepository for MockBatchRepository {
    async fn create_batch(&self, batch: &BillingBatch, entry_ids: &[Uuid]) -> DomainResult<()> {
        self.ledger.stamp(entry_ids, batch.id)?;
        self.batches.lock().expect("mock lock poisoned").insert(batch.id, batch.clone());
        Ok(())
    }

    async fn get_batch(&self, id: Uuid) -> DomainResult<BillingBatch> {
        self.batches
            .lock()
            .expect("mock lock poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| BillingError::NotFound(format!("batch {id}")))
    }

    async fn list_batches(
        &self,
        customer_id: Option<Uuid>,
        status: Option<BatchStatus>,
    ) -> DomainResult<Vec<BillingBatch>> {
        let mut batches: Vec<BillingBatch> = self
            .batches
            .lock()
            .expect("mock lock poisoned")
            .values()
            .filter(|batch| customer_id.map_or(true, |id| batch.customer_id == id))
            .filter(|batch| status.map_or(true, |wanted| batch.status == wanted))
            .cloned()
            .collect();
        batches.sort_by_key(|batch| batch.created_at);
        Ok(batches)
    }

    async fn update_status(&self, id: Uuid, status: BatchStatus) -> DomainResult<()> {
        let mut map = self.batches.lock().expect("mock lock poisoned");
        let batch =
            map.get_mut(&id).ok_or_else(|| BillingError::NotFound(format!("batch {id}")))?;
        batch.status = status;
        Ok(())
    }

    async fn mark_exported(
        &self,
        id: Uuid,
        exported_at: i64,
        exported_by: &str,
    ) -> DomainResult<()> {
        let mut map = self.batches.lock().expect("mock lock poisoned");
        let batch =
            map.get_mut(&id).ok_or_else(|| BillingError::NotFound(format!("batch {id}")))?;
        batch.status = BatchStatus::Exported;
        batch.exported_at = Some(exported_at);
        batch.exported_by = Some(exported_by.to_string());
        self.ledger.mark_exported(id);
        Ok(())
    }
}
