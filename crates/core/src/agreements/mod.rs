//! Agreement lifecycle
//!
//! Creating, terminating and replacing customer billing contracts. The
//! one-active-agreement-per-customer invariant is checked here and backed
//! by a partial unique index at the persistence layer.

pub mod ports;
pub mod service;

pub use ports::AgreementRepository;
pub use service::AgreementService;
