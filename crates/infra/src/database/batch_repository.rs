//! SQLite-backed billing batch repository.
//!
//! Batch creation and the exported transition are transactional: either the
//! batch row and every entry stamp land together, or nothing does. The
//! stamping statement predicates on `export_batch_id IS NULL`, so an entry
//! grabbed by a concurrent batch fails the whole operation instead of
//! being double-counted.

use std::sync::Arc;

use async_trait::async_trait;
use debitum_core::batch::ports::BatchRepository as BatchRepositoryPort;
use debitum_domain::{
    BatchStatus, BillingBatch, BillingError, Result as DomainResult,
};
use rusqlite::{params, params_from_iter, OptionalExtension, Row, Transaction};
use tokio::task;
use uuid::Uuid;

use super::agreement_repository::{map_join_error, map_sql_error, parse_text, parse_uuid};
use super::manager::{DbConnection, DbManager};

/// SQLite-based billing batch repository
pub struct SqliteBatchRepository {
    db: Arc<DbManager>,
}

impl SqliteBatchRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BatchRepositoryPort for SqliteBatchRepository {
    async fn create_batch(&self, batch: &BillingBatch, entry_ids: &[Uuid]) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let batch = batch.clone();
        let entry_ids = entry_ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            create_batch_tx(&mut conn, &batch, &entry_ids)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_batch(&self, id: Uuid) -> DomainResult<BillingBatch> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<BillingBatch> {
            let conn = db.get_connection()?;
            query_batch_by_id(&conn, id)
                .map_err(map_sql_error)?
                .ok_or_else(|| BillingError::NotFound(format!("batch {id}")))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_batches(
        &self,
        customer_id: Option<Uuid>,
        status: Option<BatchStatus>,
    ) -> DomainResult<Vec<BillingBatch>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<BillingBatch>> {
            let conn = db.get_connection()?;
            query_batches(&conn, customer_id, status).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_status(&self, id: Uuid, status: BatchStatus) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            let affected = conn
                .execute(
                    "UPDATE billing_batches SET status = ?1 WHERE id = ?2",
                    params![status.to_string(), id.to_string()],
                )
                .map_err(map_sql_error)?;
            if affected == 0 {
                return Err(BillingError::NotFound(format!("batch {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_exported(
        &self,
        id: Uuid,
        exported_at: i64,
        exported_by: &str,
    ) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let exported_by = exported_by.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            mark_exported_tx(&mut conn, id, exported_at, &exported_by)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

const BATCH_COLUMNS: &str = "id, batch_id, customer_id, period_year, period_month, status,
                             total_amount, created_by, created_at, exported_at, exported_by";

fn create_batch_tx(
    conn: &mut DbConnection,
    batch: &BillingBatch,
    entry_ids: &[Uuid],
) -> DomainResult<()> {
    let tx = conn.transaction().map_err(map_sql_error)?;

    insert_batch(&tx, batch).map_err(map_sql_error)?;

    let mut offenders = Vec::new();
    for entry_id in entry_ids {
        let affected = tx
            .execute(
                "UPDATE time_entries SET export_batch_id = ?1
                 WHERE id = ?2 AND customer_id = ?3
                   AND export_batch_id IS NULL AND is_exported = 0",
                params![
                    batch.id.to_string(),
                    entry_id.to_string(),
                    batch.customer_id.to_string(),
                ],
            )
            .map_err(map_sql_error)?;
        if affected == 0 {
            offenders.push(entry_id.to_string());
        }
    }
    if !offenders.is_empty() {
        // Dropping the transaction rolls the batch row and stamps back.
        return Err(BillingError::Conflict(format!(
            "entries not free for batching (already batched, exported, or foreign): {}",
            offenders.join(", ")
        )));
    }

    tx.commit().map_err(map_sql_error)
}

fn mark_exported_tx(
    conn: &mut DbConnection,
    id: Uuid,
    exported_at: i64,
    exported_by: &str,
) -> DomainResult<()> {
    let tx = conn.transaction().map_err(map_sql_error)?;

    let affected = tx
        .execute(
            "UPDATE billing_batches SET status = 'exported', exported_at = ?1, exported_by = ?2
             WHERE id = ?3",
            params![exported_at, exported_by, id.to_string()],
        )
        .map_err(map_sql_error)?;
    if affected == 0 {
        return Err(BillingError::NotFound(format!("batch {id}")));
    }

    tx.execute(
        "UPDATE time_entries SET is_exported = 1 WHERE export_batch_id = ?1",
        params![id.to_string()],
    )
    .map_err(map_sql_error)?;

    tx.commit().map_err(map_sql_error)
}

fn insert_batch(tx: &Transaction<'_>, batch: &BillingBatch) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO billing_batches (id, batch_id, customer_id, period_year, period_month,
                                      status, total_amount, created_by, created_at,
                                      exported_at, exported_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            batch.id.to_string(),
            batch.batch_id,
            batch.customer_id.to_string(),
            batch.period_year,
            batch.period_month,
            batch.status.to_string(),
            batch.total_amount,
            batch.created_by,
            batch.created_at,
            batch.exported_at,
            batch.exported_by,
        ],
    )?;
    Ok(())
}

fn query_batch_by_id(conn: &DbConnection, id: Uuid) -> rusqlite::Result<Option<BillingBatch>> {
    let sql = format!("SELECT {BATCH_COLUMNS} FROM billing_batches WHERE id = ?1");
    conn.query_row(&sql, params![id.to_string()], map_batch_row).optional()
}

fn query_batches(
    conn: &DbConnection,
    customer_id: Option<Uuid>,
    status: Option<BatchStatus>,
) -> rusqlite::Result<Vec<BillingBatch>> {
    let mut conditions = Vec::new();
    let mut values: Vec<String> = Vec::new();
    if let Some(customer_id) = customer_id {
        conditions.push("customer_id = ?");
        values.push(customer_id.to_string());
    }
    if let Some(status) = status {
        conditions.push("status = ?");
        values.push(status.to_string());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!(
        "SELECT {BATCH_COLUMNS} FROM billing_batches {where_clause} ORDER BY created_at ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), map_batch_row)?;
    rows.collect()
}

fn map_batch_row(row: &Row<'_>) -> rusqlite::Result<BillingBatch> {
    Ok(BillingBatch {
        id: parse_uuid(&row.get::<_, String>(0)?, 0)?,
        batch_id: row.get(1)?,
        customer_id: parse_uuid(&row.get::<_, String>(2)?, 2)?,
        period_year: row.get(3)?,
        period_month: row.get(4)?,
        status: parse_text(&row.get::<_, String>(5)?, 5)?,
        total_amount: row.get(6)?,
        created_by: row.get(7)?,
        created_at: row.get(8)?,
        exported_at: row.get(9)?,
        exported_by: row.get(10)?,
    })
}
