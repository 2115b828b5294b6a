//! Classification service - classify-then-persist with per-agreement
//! serialisation
//!
//! Two entries submitted concurrently near the time-bank boundary must not
//! both observe the same remaining balance. The service therefore holds a
//! per-agreement async mutex across the load-status/classify/persist
//! sequence.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use debitum_domain::{
    Agreement, AgreementStatus, AgreementType, BillingError, LineClassification, Result,
    TimeBankPeriodStatus, TimeEntry, TimeEntryDraft,
};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::TimeEntryRepository;
use crate::agreements::ports::AgreementRepository;
use crate::timebank;

/// Billing line classification service
pub struct ClassificationService {
    agreements: Arc<dyn AgreementRepository>,
    entries: Arc<dyn TimeEntryRepository>,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl ClassificationService {
    /// Create a new classification service
    pub fn new(
        agreements: Arc<dyn AgreementRepository>,
        entries: Arc<dyn TimeEntryRepository>,
    ) -> Self {
        Self { agreements, entries, locks: DashMap::new() }
    }

    /// Classify a drafted entry against an agreement and persist it.
    ///
    /// Returns the stored entry together with the classification outcome so
    /// the caller can surface `excess_hours` to the user.
    pub async fn classify_and_save(
        &self,
        draft: TimeEntryDraft,
        agreement_id: Uuid,
        extra_billable: bool,
        acting_user: &str,
    ) -> Result<(TimeEntry, LineClassification)> {
        draft.validate()?;

        let lock = self.lock_for(agreement_id);
        let _guard = lock.lock().await;

        let agreement = self.agreements.get_agreement(agreement_id).await?;
        validate_draft_against_agreement(&draft, &agreement)?;

        let status = if agreement.agreement_type == AgreementType::Timebank {
            self.status_in_period(&agreement, draft.entry_date).await?
        } else {
            None
        };

        let classification = super::classify(&draft, &agreement, status.as_ref(), extra_billable)?;
        if classification.excess_hours > 0.0 {
            warn!(
                agreement_id = %agreement_id,
                customer_id = %draft.customer_id,
                excess_hours = classification.excess_hours,
                "entry exceeds remaining time-bank balance; billed as overtime"
            );
        }

        let entry = TimeEntry {
            id: Uuid::now_v7(),
            customer_id: draft.customer_id,
            assignment_id: draft.assignment_id,
            entry_date: draft.entry_date,
            hours: draft.hours,
            billing_type: classification.billing_type,
            hourly_rate: classification.rate,
            is_billable: classification.is_billable,
            is_exported: false,
            export_batch_id: None,
            description: draft.description,
            created_by: acting_user.to_string(),
            created_at: Utc::now().timestamp(),
        };
        self.entries.insert_entry(&entry).await?;

        info!(
            entry_id = %entry.id,
            billing_type = %entry.billing_type,
            hours = entry.hours,
            "time entry classified and saved"
        );
        Ok((entry, classification))
    }

    /// Current time-bank status for an agreement, or `None` when the
    /// agreement is not a time-bank.
    pub async fn timebank_status(
        &self,
        agreement_id: Uuid,
        reference: Option<NaiveDate>,
    ) -> Result<Option<TimeBankPeriodStatus>> {
        let agreement = self.agreements.get_agreement(agreement_id).await?;
        if agreement.agreement_type != AgreementType::Timebank {
            return Ok(None);
        }
        let reference = reference.unwrap_or_else(|| Utc::now().date_naive());
        self.status_in_period(&agreement, reference).await
    }

    async fn status_in_period(
        &self,
        agreement: &Agreement,
        reference: NaiveDate,
    ) -> Result<Option<TimeBankPeriodStatus>> {
        let Some(period) = agreement.period else {
            return Ok(None);
        };
        let window = period.window(reference);
        let entries = self
            .entries
            .find_for_customer_in_range(agreement.customer_id, window.start, window.end)
            .await?;
        Ok(timebank::compute_status(agreement, &entries, reference))
    }

    fn lock_for(&self, agreement_id: Uuid) -> Arc<Mutex<()>> {
        self.locks.entry(agreement_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

fn validate_draft_against_agreement(draft: &TimeEntryDraft, agreement: &Agreement) -> Result<()> {
    if agreement.customer_id != draft.customer_id {
        return Err(BillingError::Validation(format!(
            "entry customer {} does not match agreement customer {}",
            draft.customer_id, agreement.customer_id
        )));
    }
    if agreement.status != AgreementStatus::Active {
        return Err(BillingError::Conflict(format!(
            "agreement {} is terminated and cannot accept new entries",
            agreement.id
        )));
    }
    if !agreement.covers(draft.entry_date) {
        return Err(BillingError::Validation(format!(
            "entry date {} is outside the agreement validity window",
            draft.entry_date
        )));
    }
    Ok(())
}
