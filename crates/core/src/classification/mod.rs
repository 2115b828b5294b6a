//! Billing line classification
//!
//! Assigns a billing type and effective rate to a new time entry based on
//! the customer's agreement and, for time-banks, the remaining balance in
//! the current period.

pub mod ports;
pub mod service;

use debitum_domain::{
    Agreement, AgreementType, BillingError, BillingType, LineClassification, Result,
    TimeBankPeriodStatus, TimeEntryDraft,
};

pub use service::ClassificationService;

/// Classify one time entry draft against an agreement.
///
/// Pure computation; the caller persists the result onto the entry record.
/// For time-bank agreements the prior period status must be supplied.
///
/// A time-bank entry that exceeds the remaining balance is not split: the
/// whole entry is classified as overtime and the excess (the part that did
/// not fit in the pool) is reported in `excess_hours` so the caller can
/// warn the user before committing. An explicit extra-billable override
/// forces overtime for time-banks and hourly billing for fixed agreements.
pub fn classify(
    draft: &TimeEntryDraft,
    agreement: &Agreement,
    timebank: Option<&TimeBankPeriodStatus>,
    extra_billable: bool,
) -> Result<LineClassification> {
    draft.validate()?;

    if !draft.is_billable {
        return Ok(LineClassification {
            billing_type: BillingType::None,
            rate: 0,
            is_billable: false,
            excess_hours: 0.0,
        });
    }

    match agreement.agreement_type {
        AgreementType::Hourly => Ok(LineClassification {
            billing_type: BillingType::Hourly,
            rate: agreement.hourly_rate,
            is_billable: true,
            excess_hours: 0.0,
        }),
        AgreementType::Fixed => {
            if extra_billable {
                // Extra work outside the fixed scope bills hourly.
                Ok(LineClassification {
                    billing_type: BillingType::Hourly,
                    rate: agreement.hourly_rate,
                    is_billable: true,
                    excess_hours: 0.0,
                })
            } else {
                Ok(LineClassification {
                    billing_type: BillingType::None,
                    rate: 0,
                    is_billable: false,
                    excess_hours: 0.0,
                })
            }
        }
        AgreementType::Timebank => {
            let status = timebank.ok_or_else(|| {
                BillingError::Internal(
                    "time-bank period status required to classify against a time-bank".into(),
                )
            })?;
            let excess_hours = (draft.hours - status.hours_remaining).max(0.0);

            if extra_billable || excess_hours > 0.0 {
                Ok(LineClassification {
                    billing_type: BillingType::Overtime,
                    rate: agreement.effective_overtime_rate(),
                    is_billable: true,
                    excess_hours,
                })
            } else {
                Ok(LineClassification {
                    billing_type: BillingType::Timebank,
                    rate: 0,
                    is_billable: true,
                    excess_hours: 0.0,
                })
            }
        }
    }
}
