//! Time-bank accounting engine
//!
//! Computes how much of a time-bank agreement's included pool has been
//! consumed over one period window. Pure computation: the caller supplies
//! the agreement and the ledger slice, nothing is persisted.

use chrono::NaiveDate;
use debitum_domain::{Agreement, AgreementType, BillingType, TimeBankPeriodStatus, TimeEntry};

/// Compute the period status for a time-bank agreement.
///
/// Returns `None` for agreements that are not time-banks. The period window
/// is derived from the agreement's period and the reference date; entries
/// outside the window are ignored. `hours_used` counts only entries
/// classified as timebank; overtime-classified entries are accumulated
/// separately and never reduce the remaining pool.
///
/// When the agreement defines no pool (`included_hours` 0 or absent),
/// `percent_used` is 0 rather than a division by zero, and the overtime
/// flag is driven purely by the presence of overtime-classified hours.
pub fn compute_status(
    agreement: &Agreement,
    entries: &[TimeEntry],
    reference: NaiveDate,
) -> Option<TimeBankPeriodStatus> {
    if agreement.agreement_type != AgreementType::Timebank {
        return None;
    }
    let window = agreement.period?.window(reference);

    let mut hours_used = 0.0;
    let mut overtime_hours = 0.0;
    for entry in entries.iter().filter(|entry| window.contains(entry.entry_date)) {
        match entry.billing_type {
            BillingType::Timebank => hours_used += entry.hours,
            BillingType::Overtime => overtime_hours += entry.hours,
            BillingType::Hourly | BillingType::None => {}
        }
    }

    let included_hours = agreement.included_hours.unwrap_or(0.0);
    let hours_remaining = (included_hours - hours_used).max(0.0);
    let (percent_used, is_overtime) = if included_hours > 0.0 {
        (hours_used / included_hours * 100.0, hours_used > included_hours)
    } else {
        (0.0, overtime_hours > 0.0)
    };

    Some(TimeBankPeriodStatus {
        agreement_id: agreement.id,
        period_start: window.start,
        period_end: window.end,
        included_hours,
        hours_used,
        hours_remaining,
        overtime_hours,
        percent_used,
        is_overtime,
    })
}
