//! SQLite-backed agreement repository.
//!
//! The one-active-agreement-per-customer invariant is enforced here by the
//! partial unique index `idx_agreements_one_active`; a second active
//! agreement surfaces as a conflict from the constraint-violation mapping.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use debitum_core::agreements::ports::AgreementRepository as AgreementRepositoryPort;
use debitum_domain::{
    Agreement, AgreementStatus, BillingError, Result as DomainResult,
};
use rusqlite::{params, types::Type, OptionalExtension, Row};
use tokio::task;
use uuid::Uuid;

use super::manager::{DbConnection, DbManager};
use crate::errors::InfraError;

/// SQLite-based agreement repository
pub struct SqliteAgreementRepository {
    db: Arc<DbManager>,
}

impl SqliteAgreementRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AgreementRepositoryPort for SqliteAgreementRepository {
    async fn insert_agreement(&self, agreement: &Agreement) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let agreement = agreement.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert_agreement_sql(&conn, &agreement).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_agreement(&self, id: Uuid) -> DomainResult<Agreement> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Agreement> {
            let conn = db.get_connection()?;
            query_agreement_by_id(&conn, id)
                .map_err(map_sql_error)?
                .ok_or_else(|| BillingError::NotFound(format!("agreement {id}")))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn active_for_customer(&self, customer_id: Uuid) -> DomainResult<Option<Agreement>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Agreement>> {
            let conn = db.get_connection()?;
            query_active_for_customer(&conn, customer_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn terminate_agreement(&self, id: Uuid, terminated_at: i64) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            terminate_agreement_sql(&conn, id, terminated_at)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn replace_active(
        &self,
        previous_id: Uuid,
        replacement: &Agreement,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let replacement = replacement.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            replace_active_tx(&mut conn, previous_id, &replacement)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

const AGREEMENT_COLUMNS: &str = "id, customer_id, agreement_type, hourly_rate, overtime_rate,
                                 included_hours, fixed_amount, period, valid_from, valid_to,
                                 status, created_at, terminated_at";

fn insert_agreement_sql(conn: &DbConnection, agreement: &Agreement) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO agreements (id, customer_id, agreement_type, hourly_rate, overtime_rate,
                                 included_hours, fixed_amount, period, valid_from, valid_to,
                                 status, created_at, terminated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            agreement.id.to_string(),
            agreement.customer_id.to_string(),
            agreement.agreement_type.to_string(),
            agreement.hourly_rate,
            agreement.overtime_rate,
            agreement.included_hours,
            agreement.fixed_amount,
            agreement.period.map(|period| period.to_string()),
            agreement.valid_from.to_string(),
            agreement.valid_to.map(|date| date.to_string()),
            agreement.status.to_string(),
            agreement.created_at,
            agreement.terminated_at,
        ],
    )?;
    Ok(())
}

fn query_agreement_by_id(conn: &DbConnection, id: Uuid) -> rusqlite::Result<Option<Agreement>> {
    let sql = format!("SELECT {AGREEMENT_COLUMNS} FROM agreements WHERE id = ?1");
    conn.query_row(&sql, params![id.to_string()], map_agreement_row).optional()
}

fn query_active_for_customer(
    conn: &DbConnection,
    customer_id: Uuid,
) -> rusqlite::Result<Option<Agreement>> {
    let sql = format!(
        "SELECT {AGREEMENT_COLUMNS} FROM agreements WHERE customer_id = ?1 AND status = 'active'"
    );
    conn.query_row(&sql, params![customer_id.to_string()], map_agreement_row).optional()
}

fn terminate_agreement_sql(
    conn: &DbConnection,
    id: Uuid,
    terminated_at: i64,
) -> DomainResult<()> {
    let affected = conn
        .execute(
            "UPDATE agreements SET status = 'terminated', terminated_at = ?1
             WHERE id = ?2 AND status = 'active'",
            params![terminated_at, id.to_string()],
        )
        .map_err(map_sql_error)?;

    if affected == 1 {
        return Ok(());
    }
    match query_agreement_by_id(conn, id).map_err(map_sql_error)? {
        Some(_) => Err(BillingError::Conflict(format!("agreement {id} is already terminated"))),
        None => Err(BillingError::NotFound(format!("agreement {id}"))),
    }
}

fn replace_active_tx(
    conn: &mut DbConnection,
    previous_id: Uuid,
    replacement: &Agreement,
) -> DomainResult<()> {
    let tx = conn.transaction().map_err(map_sql_error)?;

    let affected = tx
        .execute(
            "UPDATE agreements SET status = 'terminated', terminated_at = ?1
             WHERE id = ?2 AND status = 'active'",
            params![replacement.created_at, previous_id.to_string()],
        )
        .map_err(map_sql_error)?;
    if affected != 1 {
        return Err(BillingError::Conflict(format!(
            "agreement {previous_id} is not active and cannot be replaced"
        )));
    }

    tx.execute(
        "INSERT INTO agreements (id, customer_id, agreement_type, hourly_rate, overtime_rate,
                                 included_hours, fixed_amount, period, valid_from, valid_to,
                                 status, created_at, terminated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            replacement.id.to_string(),
            replacement.customer_id.to_string(),
            replacement.agreement_type.to_string(),
            replacement.hourly_rate,
            replacement.overtime_rate,
            replacement.included_hours,
            replacement.fixed_amount,
            replacement.period.map(|period| period.to_string()),
            replacement.valid_from.to_string(),
            replacement.valid_to.map(|date| date.to_string()),
            replacement.status.to_string(),
            replacement.created_at,
            replacement.terminated_at,
        ],
    )
    .map_err(map_sql_error)?;

    tx.commit().map_err(map_sql_error)
}

fn map_agreement_row(row: &Row<'_>) -> rusqlite::Result<Agreement> {
    let period: Option<String> = row.get(7)?;
    let valid_to: Option<String> = row.get(9)?;

    Ok(Agreement {
        id: parse_uuid(&row.get::<_, String>(0)?, 0)?,
        customer_id: parse_uuid(&row.get::<_, String>(1)?, 1)?,
        agreement_type: parse_text(&row.get::<_, String>(2)?, 2)?,
        hourly_rate: row.get(3)?,
        overtime_rate: row.get(4)?,
        included_hours: row.get(5)?,
        fixed_amount: row.get(6)?,
        period: period.as_deref().map(|value| parse_text(value, 7)).transpose()?,
        valid_from: parse_date(&row.get::<_, String>(8)?, 8)?,
        valid_to: valid_to.as_deref().map(|value| parse_date(value, 9)).transpose()?,
        status: parse_text::<AgreementStatus>(&row.get::<_, String>(10)?, 10)?,
        created_at: row.get(11)?,
        terminated_at: row.get(12)?,
    })
}

pub(crate) fn parse_uuid(value: &str, idx: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn parse_date(value: &str, idx: usize) -> rusqlite::Result<NaiveDate> {
    value
        .parse::<NaiveDate>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn parse_text<T>(value: &str, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = BillingError>,
{
    value
        .parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> BillingError {
    BillingError::from(InfraError::from(err))
}

pub(crate) fn map_join_error(err: task::JoinError) -> BillingError {
    BillingError::Internal(format!("blocking task failed: {err}"))
}
