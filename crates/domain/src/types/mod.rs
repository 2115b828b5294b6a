//! Domain types and models

pub mod agreement;
pub mod batch;
pub mod customer;
pub mod summary;
pub mod time_entry;
pub mod timebank;

pub use agreement::{
    Agreement, AgreementDraft, AgreementPeriod, AgreementStatus, AgreementType, PeriodWindow,
};
pub use batch::{BatchDetail, BatchStatus, BillingBatch};
pub use customer::Customer;
pub use summary::BillingSummary;
pub use time_entry::{line_amount, BillingType, LineClassification, TimeEntry, TimeEntryDraft};
pub use timebank::TimeBankPeriodStatus;
