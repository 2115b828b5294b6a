//! Agreement lifecycle service

use std::sync::Arc;

use chrono::Utc;
use debitum_domain::{Agreement, AgreementDraft, AgreementStatus, BillingError, Result};
use tracing::info;
use uuid::Uuid;

use super::ports::AgreementRepository;

/// Service managing customer billing agreements
pub struct AgreementService {
    agreements: Arc<dyn AgreementRepository>,
}

impl AgreementService {
    /// Create a new agreement service
    pub fn new(agreements: Arc<dyn AgreementRepository>) -> Self {
        Self { agreements }
    }

    /// Create an agreement for a customer without one.
    ///
    /// Fails with a conflict when the customer already has an active
    /// agreement; use [`Self::replace_agreement`] to supersede it.
    pub async fn create_agreement(&self, draft: AgreementDraft) -> Result<Agreement> {
        let agreement = Agreement::from_draft(draft, Utc::now().timestamp())?;
        if let Some(existing) =
            self.agreements.active_for_customer(agreement.customer_id).await?
        {
            return Err(BillingError::Conflict(format!(
                "customer {} already has active agreement {}",
                agreement.customer_id, existing.id
            )));
        }
        self.agreements.insert_agreement(&agreement).await?;
        info!(agreement_id = %agreement.id, customer_id = %agreement.customer_id, "agreement created");
        Ok(agreement)
    }

    /// Replace a customer's active agreement, terminating the old one.
    ///
    /// Falls back to a plain create when the customer has no active
    /// agreement yet.
    pub async fn replace_agreement(&self, draft: AgreementDraft) -> Result<Agreement> {
        let replacement = Agreement::from_draft(draft, Utc::now().timestamp())?;
        match self.agreements.active_for_customer(replacement.customer_id).await? {
            Some(previous) => {
                self.agreements.replace_active(previous.id, &replacement).await?;
                info!(
                    agreement_id = %replacement.id,
                    replaced = %previous.id,
                    "agreement replaced"
                );
            }
            None => {
                self.agreements.insert_agreement(&replacement).await?;
                info!(agreement_id = %replacement.id, "agreement created (nothing to replace)");
            }
        }
        Ok(replacement)
    }

    /// Terminate an active agreement.
    pub async fn terminate_agreement(&self, id: Uuid) -> Result<Agreement> {
        let agreement = self.agreements.get_agreement(id).await?;
        if agreement.status == AgreementStatus::Terminated {
            return Err(BillingError::Conflict(format!("agreement {id} is already terminated")));
        }
        self.agreements.terminate_agreement(id, Utc::now().timestamp()).await?;
        info!(agreement_id = %id, "agreement terminated");
        self.agreements.get_agreement(id).await
    }

    /// Get an agreement by id.
    pub async fn get_agreement(&self, id: Uuid) -> Result<Agreement> {
        self.agreements.get_agreement(id).await
    }

    /// The customer's active agreement, if any.
    pub async fn active_for_customer(&self, customer_id: Uuid) -> Result<Option<Agreement>> {
        self.agreements.active_for_customer(customer_id).await
    }
}
