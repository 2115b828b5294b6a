//! Billing agreement types
//!
//! An agreement is a customer's billing contract. Exactly one agreement per
//! customer may be active at any time; that invariant is enforced at write
//! time by the persistence layer. Rates and fixed amounts are stored in
//! currency minor units (öre).

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BillingError, Result};
use crate::impl_status_conversions;

/// Contract model for a customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementType {
    /// Every billable hour at the agreement rate.
    Hourly,
    /// Prepaid pool of included hours per period, overtime beyond it.
    Timebank,
    /// Fixed periodic amount, work not billed per hour.
    Fixed,
}

impl_status_conversions!(AgreementType {
    Hourly => "hourly",
    Timebank => "timebank",
    Fixed => "fixed",
});

/// Agreement lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementStatus {
    Active,
    Terminated,
}

impl_status_conversions!(AgreementStatus {
    Active => "active",
    Terminated => "terminated",
});

/// Span against which a time-bank's included hours are measured and reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementPeriod {
    Monthly,
    Yearly,
}

impl_status_conversions!(AgreementPeriod {
    Monthly => "monthly",
    Yearly => "yearly",
});

/// Inclusive date range of one accounting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    /// Calendar-month window for a given year and month.
    pub fn for_month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            BillingError::Validation(format!("invalid billing period: {year}-{month}"))
        })?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| {
                BillingError::Validation(format!("billing period out of range: {year}-{month}"))
            })?;
        Ok(Self { start, end })
    }

    /// Whether a date falls inside this window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl AgreementPeriod {
    /// Period window containing the reference date.
    ///
    /// Monthly agreements reset with the calendar month, yearly agreements
    /// with the calendar year. Validity dates bound agreement applicability,
    /// not the window.
    pub fn window(self, reference: NaiveDate) -> PeriodWindow {
        match self {
            Self::Monthly => {
                let start = reference.with_day(1).unwrap_or(reference);
                let end = start
                    .checked_add_months(Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(reference);
                PeriodWindow { start, end }
            }
            Self::Yearly => {
                let year = reference.year();
                PeriodWindow {
                    start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(reference),
                    end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(reference),
                }
            }
        }
    }
}

/// Customer billing contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub agreement_type: AgreementType,
    /// Rate per hour in minor units.
    pub hourly_rate: i64,
    /// Rate per hour beyond the included pool; required for time-banks.
    pub overtime_rate: Option<i64>,
    /// Included hours per period; required for time-banks and periodic
    /// fixed agreements.
    pub included_hours: Option<f64>,
    /// Periodic amount in minor units for fixed agreements.
    pub fixed_amount: Option<i64>,
    pub period: Option<AgreementPeriod>,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
    pub status: AgreementStatus,
    pub created_at: i64,
    pub terminated_at: Option<i64>,
}

/// Input for creating an agreement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementDraft {
    pub customer_id: Uuid,
    pub agreement_type: AgreementType,
    pub hourly_rate: i64,
    pub overtime_rate: Option<i64>,
    pub included_hours: Option<f64>,
    pub fixed_amount: Option<i64>,
    pub period: Option<AgreementPeriod>,
    pub valid_from: NaiveDate,
    pub valid_to: Option<NaiveDate>,
}

impl Agreement {
    /// Build an active agreement from a draft, validating per-type rules.
    pub fn from_draft(draft: AgreementDraft, created_at: i64) -> Result<Self> {
        let agreement = Self {
            id: Uuid::now_v7(),
            customer_id: draft.customer_id,
            agreement_type: draft.agreement_type,
            hourly_rate: draft.hourly_rate,
            overtime_rate: draft.overtime_rate,
            included_hours: draft.included_hours,
            fixed_amount: draft.fixed_amount,
            period: draft.period,
            valid_from: draft.valid_from,
            valid_to: draft.valid_to,
            status: AgreementStatus::Active,
            created_at,
            terminated_at: None,
        };
        agreement.validate()?;
        Ok(agreement)
    }

    /// Check the per-type field invariants.
    pub fn validate(&self) -> Result<()> {
        if self.hourly_rate < 0 {
            return Err(BillingError::Validation("hourly_rate must not be negative".into()));
        }
        if let Some(valid_to) = self.valid_to {
            if valid_to < self.valid_from {
                return Err(BillingError::Validation(
                    "valid_to must not precede valid_from".into(),
                ));
            }
        }

        match self.agreement_type {
            AgreementType::Hourly => Ok(()),
            AgreementType::Timebank => {
                if self.overtime_rate.is_none() {
                    return Err(BillingError::Validation(
                        "time-bank agreement requires overtime_rate".into(),
                    ));
                }
                if self.included_hours.is_none() {
                    return Err(BillingError::Validation(
                        "time-bank agreement requires included_hours".into(),
                    ));
                }
                if self.period.is_none() {
                    return Err(BillingError::Validation(
                        "time-bank agreement requires a period".into(),
                    ));
                }
                Ok(())
            }
            AgreementType::Fixed => {
                if self.fixed_amount.is_none() {
                    return Err(BillingError::Validation(
                        "fixed agreement requires fixed_amount".into(),
                    ));
                }
                if self.period.is_some() && self.included_hours.is_none() {
                    return Err(BillingError::Validation(
                        "periodic fixed agreement requires included_hours".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Whether the agreement applies to work dated `date`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && self.valid_to.map_or(true, |until| date <= until)
    }

    /// Overtime rate, falling back to the hourly rate when absent.
    pub fn effective_overtime_rate(&self) -> i64 {
        self.overtime_rate.unwrap_or(self.hourly_rate)
    }
}
