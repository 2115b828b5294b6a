//! SQLite-backed customer registry.

use std::sync::Arc;

use async_trait::async_trait;
use debitum_core::billing::ports::CustomerRepository as CustomerRepositoryPort;
use debitum_domain::{BillingError, Customer, Result as DomainResult};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use uuid::Uuid;

use super::agreement_repository::{map_join_error, map_sql_error, parse_uuid};
use super::manager::{DbConnection, DbManager};

/// SQLite-based customer repository
pub struct SqliteCustomerRepository {
    db: Arc<DbManager>,
}

impl SqliteCustomerRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerRepositoryPort for SqliteCustomerRepository {
    async fn insert_customer(&self, customer: &Customer) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let customer = customer.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert_customer_sql(&conn, &customer).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_customer(&self, id: Uuid) -> DomainResult<Customer> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Customer> {
            let conn = db.get_connection()?;
            query_customer_by_id(&conn, id)
                .map_err(map_sql_error)?
                .ok_or_else(|| BillingError::NotFound(format!("customer {id}")))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_customers_by_ids(&self, ids: &[Uuid]) -> DomainResult<Vec<Customer>> {
        let db = Arc::clone(&self.db);
        let ids = ids.to_vec();

        task::spawn_blocking(move || -> DomainResult<Vec<Customer>> {
            let conn = db.get_connection()?;
            let mut customers = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(customer) = query_customer_by_id(&conn, id).map_err(map_sql_error)? {
                    customers.push(customer);
                }
            }
            Ok(customers)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn insert_customer_sql(conn: &DbConnection, customer: &Customer) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO customers (id, name, customer_number, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            customer.id.to_string(),
            customer.name,
            customer.customer_number,
            customer.created_at,
        ],
    )?;
    Ok(())
}

fn query_customer_by_id(conn: &DbConnection, id: Uuid) -> rusqlite::Result<Option<Customer>> {
    conn.query_row(
        "SELECT id, name, customer_number, created_at FROM customers WHERE id = ?1",
        params![id.to_string()],
        map_customer_row,
    )
    .optional()
}

fn map_customer_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: parse_uuid(&row.get::<_, String>(0)?, 0)?,
        name: row.get(1)?,
        customer_number: row.get(2)?,
        created_at: row.get(3)?,
    })
}
