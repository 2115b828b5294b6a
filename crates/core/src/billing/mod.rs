//! Billing summary aggregation
//!
//! Groups unexported billable work by customer for one year+month period,
//! bucketing hours by billing type and totalling line amounts.

pub mod ports;
pub mod service;

use std::collections::HashMap;

use debitum_domain::{
    BillingError, BillingSummary, BillingType, Customer, PeriodWindow, Result, TimeEntry,
};
use uuid::Uuid;

pub use service::BillingService;

/// Aggregate classified entries into per-customer billing summaries.
///
/// Pure read: filters to billable, unexported entries dated inside the
/// window, groups by customer, and accumulates bucket hours and amounts.
/// Entries with billing type `none` contribute neither hours nor bucket
/// totals. The result is sorted by customer name so repeated runs over the
/// same ledger are deterministic.
pub fn summarize(
    window: PeriodWindow,
    entries: &[TimeEntry],
    customers: &HashMap<Uuid, Customer>,
) -> Result<Vec<BillingSummary>> {
    let mut by_customer: HashMap<Uuid, BillingSummary> = HashMap::new();

    for entry in entries {
        if !entry.is_billable || entry.is_exported || !window.contains(entry.entry_date) {
            continue;
        }
        let customer = customers.get(&entry.customer_id).ok_or_else(|| {
            BillingError::NotFound(format!("customer {} for entry {}", entry.customer_id, entry.id))
        })?;

        let summary = by_customer.entry(entry.customer_id).or_insert_with(|| BillingSummary {
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            customer_number: customer.customer_number.clone(),
            total_hours: 0.0,
            timebank_hours: 0.0,
            overtime_hours: 0.0,
            hourly_hours: 0.0,
            total_amount: 0,
            entries: Vec::new(),
        });

        match entry.billing_type {
            BillingType::Hourly => {
                summary.hourly_hours += entry.hours;
                summary.total_hours += entry.hours;
            }
            BillingType::Timebank => {
                summary.timebank_hours += entry.hours;
                summary.total_hours += entry.hours;
            }
            BillingType::Overtime => {
                summary.overtime_hours += entry.hours;
                summary.total_hours += entry.hours;
            }
            BillingType::None => {}
        }
        summary.total_amount += entry.amount();
        summary.entries.push(entry.clone());
    }

    let mut summaries: Vec<BillingSummary> = by_customer.into_values().collect();
    summaries.sort_by(|a, b| a.customer_name.cmp(&b.customer_name));
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn customer(name: &str, number: &str) -> Customer {
        Customer {
            id: Uuid::now_v7(),
            name: name.into(),
            customer_number: number.into(),
            created_at: 0,
        }
    }

    fn entry(
        customer_id: Uuid,
        day: u32,
        hours: f64,
        billing_type: BillingType,
        rate: i64,
    ) -> TimeEntry {
        TimeEntry {
            id: Uuid::now_v7(),
            customer_id,
            assignment_id: None,
            entry_date: date(day),
            hours,
            billing_type,
            hourly_rate: rate,
            is_billable: billing_type != BillingType::None,
            is_exported: false,
            export_batch_id: None,
            description: None,
            created_by: "anna".into(),
            created_at: 0,
        }
    }

    fn window() -> PeriodWindow {
        PeriodWindow::for_month(2026, 1).unwrap()
    }

    #[test]
    fn groups_by_customer_and_buckets_by_billing_type() {
        let alfa = customer("Alfa Redovisning AB", "K-1001");
        let beta = customer("Beta Bygg AB", "K-1002");
        let customers: HashMap<Uuid, Customer> =
            [(alfa.id, alfa.clone()), (beta.id, beta.clone())].into();

        let entries = vec![
            entry(alfa.id, 5, 5.0, BillingType::Hourly, 50_000),
            entry(alfa.id, 12, 3.0, BillingType::Timebank, 0),
            entry(beta.id, 8, 2.0, BillingType::Overtime, 60_000),
        ];

        let summaries = summarize(window(), &entries, &customers).unwrap();
        assert_eq!(summaries.len(), 2);

        // Sorted by name: Alfa before Beta.
        let first = &summaries[0];
        assert_eq!(first.customer_number, "K-1001");
        assert_eq!(first.total_hours, 8.0);
        assert_eq!(first.hourly_hours, 5.0);
        assert_eq!(first.timebank_hours, 3.0);
        assert_eq!(first.total_amount, 250_000);
        assert_eq!(first.entries.len(), 2);

        let second = &summaries[1];
        assert_eq!(second.total_hours, 2.0);
        assert_eq!(second.overtime_hours, 2.0);
        assert_eq!(second.total_amount, 120_000);
    }

    #[test]
    fn totals_equal_the_sum_of_line_amounts() {
        let alfa = customer("Alfa Redovisning AB", "K-1001");
        let customers: HashMap<Uuid, Customer> = [(alfa.id, alfa.clone())].into();

        let entries = vec![
            entry(alfa.id, 2, 1.5, BillingType::Hourly, 80_000),
            entry(alfa.id, 9, 2.25, BillingType::Overtime, 100_000),
            entry(alfa.id, 16, 4.0, BillingType::Timebank, 0),
        ];
        let expected: i64 = entries.iter().map(TimeEntry::amount).sum();

        let summaries = summarize(window(), &entries, &customers).unwrap();
        assert_eq!(summaries[0].total_amount, expected);
    }

    #[test]
    fn exported_and_out_of_window_entries_are_skipped() {
        let alfa = customer("Alfa Redovisning AB", "K-1001");
        let customers: HashMap<Uuid, Customer> = [(alfa.id, alfa.clone())].into();

        let mut exported = entry(alfa.id, 5, 2.0, BillingType::Hourly, 50_000);
        exported.is_exported = true;
        let mut outside = entry(alfa.id, 5, 2.0, BillingType::Hourly, 50_000);
        outside.entry_date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let summaries = summarize(window(), &[exported, outside], &customers).unwrap();
        assert!(summaries.is_empty());
    }

    #[test]
    fn non_billable_entries_do_not_count_toward_hours() {
        let alfa = customer("Alfa Redovisning AB", "K-1001");
        let customers: HashMap<Uuid, Customer> = [(alfa.id, alfa.clone())].into();

        let internal = entry(alfa.id, 5, 3.0, BillingType::None, 0);
        let billed = entry(alfa.id, 6, 1.0, BillingType::Hourly, 50_000);

        let summaries = summarize(window(), &[internal, billed], &customers).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_hours, 1.0);
    }

    #[test]
    fn unknown_customer_is_a_not_found_error() {
        let entries = vec![entry(Uuid::now_v7(), 5, 1.0, BillingType::Hourly, 50_000)];
        let err = summarize(window(), &entries, &HashMap::new()).unwrap_err();
        assert!(matches!(err, BillingError::NotFound(_)));
    }
}
