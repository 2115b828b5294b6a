//! SQLite-backed time entry ledger.
//!
//! Exported entries are frozen: the update and delete statements predicate
//! on `is_exported = 0`, so a mutation against an exported row affects
//! nothing and is reported as a conflict instead.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use debitum_core::classification::ports::TimeEntryRepository as TimeEntryRepositoryPort;
use debitum_domain::{BillingError, Result as DomainResult, TimeEntry};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use uuid::Uuid;

use super::agreement_repository::{
    map_join_error, map_sql_error, parse_date, parse_text, parse_uuid,
};
use super::manager::{DbConnection, DbManager};

/// SQLite-based time entry repository
pub struct SqliteTimeEntryRepository {
    db: Arc<DbManager>,
}

impl SqliteTimeEntryRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TimeEntryRepositoryPort for SqliteTimeEntryRepository {
    async fn insert_entry(&self, entry: &TimeEntry) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let entry = entry.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert_entry_sql(&conn, &entry).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_entry(&self, id: Uuid) -> DomainResult<TimeEntry> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<TimeEntry> {
            let conn = db.get_connection()?;
            query_entry_by_id(&conn, id)
                .map_err(map_sql_error)?
                .ok_or_else(|| BillingError::NotFound(format!("time entry {id}")))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_entries_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<TimeEntry>> {
        let db = Arc::clone(&self.db);
        let ids = ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<Vec<TimeEntry>> {
            let conn = db.get_connection()?;
            ids.iter()
                .map(|id| {
                    query_entry_by_id(&conn, *id)
                        .map_err(map_sql_error)?
                        .ok_or_else(|| BillingError::NotFound(format!("time entry {id}")))
                })
                .collect()
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_entry(&self, entry: &TimeEntry) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let entry = entry.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            update_entry_sql(&conn, &entry)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_entry(&self, id: Uuid) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            delete_entry_sql(&conn, id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_for_customer_in_range(
        &self,
        customer_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TimeEntry>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<TimeEntry>> {
            let conn = db.get_connection()?;
            query_for_customer_in_range(&conn, customer_id, start, end).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_billable_unexported_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TimeEntry>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<TimeEntry>> {
            let conn = db.get_connection()?;
            query_billable_unexported(&conn, start, end).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_batch(&self, batch_id: Uuid) -> DomainResult<Vec<TimeEntry>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<TimeEntry>> {
            let conn = db.get_connection()?;
            query_by_batch(&conn, batch_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

const ENTRY_COLUMNS: &str = "id, customer_id, assignment_id, entry_date, hours, billing_type,
                             hourly_rate, is_billable, is_exported, export_batch_id, description,
                             created_by, created_at";

fn insert_entry_sql(conn: &DbConnection, entry: &TimeEntry) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO time_entries (id, customer_id, assignment_id, entry_date, hours,
                                   billing_type, hourly_rate, is_billable, is_exported,
                                   export_batch_id, description, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            entry.id.to_string(),
            entry.customer_id.to_string(),
            entry.assignment_id.map(|id| id.to_string()),
            entry.entry_date.to_string(),
            entry.hours,
            entry.billing_type.to_string(),
            entry.hourly_rate,
            entry.is_billable,
            entry.is_exported,
            entry.export_batch_id.map(|id| id.to_string()),
            entry.description,
            entry.created_by,
            entry.created_at,
        ],
    )?;
    Ok(())
}

fn query_entry_by_id(conn: &DbConnection, id: Uuid) -> rusqlite::Result<Option<TimeEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM time_entries WHERE id = ?1");
    conn.query_row(&sql, params![id.to_string()], map_entry_row).optional()
}

fn update_entry_sql(conn: &DbConnection, entry: &TimeEntry) -> DomainResult<()> {
    let affected = conn
        .execute(
            "UPDATE time_entries
             SET assignment_id = ?1, entry_date = ?2, hours = ?3, billing_type = ?4,
                 hourly_rate = ?5, is_billable = ?6, description = ?7
             WHERE id = ?8 AND is_exported = 0",
            params![
                entry.assignment_id.map(|id| id.to_string()),
                entry.entry_date.to_string(),
                entry.hours,
                entry.billing_type.to_string(),
                entry.hourly_rate,
                entry.is_billable,
                entry.description,
                entry.id.to_string(),
            ],
        )
        .map_err(map_sql_error)?;

    if affected == 1 {
        return Ok(());
    }
    match query_entry_by_id(conn, entry.id).map_err(map_sql_error)? {
        Some(_) => Err(BillingError::Conflict(format!(
            "time entry {} is exported and immutable",
            entry.id
        ))),
        None => Err(BillingError::NotFound(format!("time entry {}", entry.id))),
    }
}

fn delete_entry_sql(conn: &DbConnection, id: Uuid) -> DomainResult<()> {
    let affected = conn
        .execute(
            "DELETE FROM time_entries WHERE id = ?1 AND is_exported = 0",
            params![id.to_string()],
        )
        .map_err(map_sql_error)?;

    if affected == 1 {
        return Ok(());
    }
    match query_entry_by_id(conn, id).map_err(map_sql_error)? {
        Some(_) => {
            Err(BillingError::Conflict(format!("time entry {id} is exported and immutable")))
        }
        None => Err(BillingError::NotFound(format!("time entry {id}"))),
    }
}

fn query_for_customer_in_range(
    conn: &DbConnection,
    customer_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries
         WHERE customer_id = ?1 AND entry_date BETWEEN ?2 AND ?3
         ORDER BY entry_date ASC, created_at ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![customer_id.to_string(), start.to_string(), end.to_string()],
        map_entry_row,
    )?;
    rows.collect()
}

fn query_billable_unexported(
    conn: &DbConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries
         WHERE is_billable = 1 AND is_exported = 0 AND entry_date BETWEEN ?1 AND ?2
         ORDER BY entry_date ASC, created_at ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![start.to_string(), end.to_string()], map_entry_row)?;
    rows.collect()
}

fn query_by_batch(conn: &DbConnection, batch_id: Uuid) -> rusqlite::Result<Vec<TimeEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries
         WHERE export_batch_id = ?1
         ORDER BY entry_date ASC, created_at ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![batch_id.to_string()], map_entry_row)?;
    rows.collect()
}

pub(crate) fn map_entry_row(row: &Row<'_>) -> rusqlite::Result<TimeEntry> {
    let assignment_id: Option<String> = row.get(2)?;
    let export_batch_id: Option<String> = row.get(9)?;

    Ok(TimeEntry {
        id: parse_uuid(&row.get::<_, String>(0)?, 0)?,
        customer_id: parse_uuid(&row.get::<_, String>(1)?, 1)?,
        assignment_id: assignment_id.as_deref().map(|value| parse_uuid(value, 2)).transpose()?,
        entry_date: parse_date(&row.get::<_, String>(3)?, 3)?,
        hours: row.get(4)?,
        billing_type: parse_text(&row.get::<_, String>(5)?, 5)?,
        hourly_rate: row.get(6)?,
        is_billable: row.get(7)?,
        is_exported: row.get(8)?,
        export_batch_id: export_batch_id
            .as_deref()
            .map(|value| parse_uuid(value, 9))
            .transpose()?,
        description: row.get(10)?,
        created_by: row.get(11)?,
        created_at: row.get(12)?,
    })
}
