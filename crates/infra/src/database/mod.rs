//! Database implementations

pub mod agreement_repository;
pub mod batch_repository;
pub mod customer_repository;
pub mod manager;
pub mod time_entry_repository;

pub use agreement_repository::SqliteAgreementRepository;
pub use batch_repository::SqliteBatchRepository;
pub use customer_repository::SqliteCustomerRepository;
pub use manager::{DbConnection, DbManager};
pub use time_entry_repository::SqliteTimeEntryRepository;
