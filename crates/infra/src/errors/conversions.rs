//! Conversions from external infrastructure errors into domain errors.

use debitum_domain::BillingError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BillingError);

impl From<InfraError> for BillingError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BillingError> for InfraError {
    fn from(value: BillingError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → BillingError */
/* -------------------------------------------------------------------------- */

fn sql_error_to_billing(err: SqlError) -> BillingError {
    use rusqlite::ffi::ErrorCode;
    use rusqlite::Error as RE;

    match err {
        RE::SqliteFailure(err, maybe_message) => {
            let message = maybe_message.unwrap_or_default();
            match (err.code, err.extended_code) {
                (ErrorCode::DatabaseBusy, _) => BillingError::Database("database is busy".into()),
                (ErrorCode::DatabaseLocked, _) => {
                    BillingError::Database("database is locked".into())
                }
                // Unique and foreign key violations carry billing meaning:
                // a second active agreement, a double-batched entry, or a
                // dangling reference.
                (ErrorCode::ConstraintViolation, 2067) => {
                    BillingError::Conflict(format!("unique constraint violation: {message}"))
                }
                (ErrorCode::ConstraintViolation, 787) => {
                    BillingError::Conflict(format!("foreign key constraint violation: {message}"))
                }
                (ErrorCode::ConstraintViolation, _) => {
                    BillingError::Conflict(format!("constraint violation: {message}"))
                }
                _ => BillingError::Database(format!(
                    "sqlite failure {:?} (code {}): {}",
                    err.code, err.extended_code, message
                )),
            }
        }
        RE::QueryReturnedNoRows => BillingError::NotFound("no rows returned by query".into()),
        RE::FromSqlConversionFailure(_, _, cause) => {
            BillingError::Database(format!("failed to convert sqlite value: {cause}"))
        }
        RE::InvalidColumnType(_, _, ty) => {
            BillingError::Database(format!("invalid column type: {ty}"))
        }
        RE::Utf8Error(_) => BillingError::Database("invalid UTF-8 returned from sqlite".into()),
        RE::InvalidParameterName(parameter_name) => {
            BillingError::Database(format!("invalid parameter name: {parameter_name}"))
        }
        RE::InvalidPath(path) => {
            BillingError::Database(format!("invalid database path: {}", path.to_string_lossy()))
        }
        RE::InvalidQuery => BillingError::Database("invalid SQL query".into()),
        other => BillingError::Database(other.to_string()),
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(sql_error_to_billing(value))
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → BillingError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(BillingError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use rusqlite::ffi::{Error as FfiError, ErrorCode};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: BillingError = InfraError::from(err).into();
        match mapped {
            BillingError::Database(msg) => {
                assert!(msg.contains("busy") || msg.contains("locked"));
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::ConstraintViolation, extended_code: 2067 },
            Some("UNIQUE constraint failed: agreements.customer_id".into()),
        );

        let mapped: BillingError = InfraError::from(err).into();
        match mapped {
            BillingError::Conflict(msg) => assert!(msg.contains("unique")),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: BillingError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, BillingError::NotFound(_)));
    }
}
