//! Billing batch lifecycle
//!
//! Creates frozen export batches from selected time entries and advances
//! them through the forward-only status chain.

pub mod ports;
pub mod service;

pub use ports::BatchRepository;
pub use service::BatchService;
