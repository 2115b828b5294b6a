//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! billing engine.

/// Smallest bookable unit of work, in hours.
pub const HOURS_GRANULARITY: f64 = 0.25;

/// Prefix for human-readable billing batch identifiers.
pub const BATCH_ID_PREFIX: &str = "B";

/// Length of the uniqueness token in a batch display id.
pub const BATCH_ID_TOKEN_LEN: usize = 12;

/// Default SQLite connection pool size.
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

/// Default bind address for the HTTP surface.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8085";

/// Acting-user fallback when the identity collaborator supplies none.
pub const SYSTEM_USER: &str = "system";
