//! Application context - dependency injection container

use std::sync::Arc;

use debitum_core::billing::ports::CustomerRepository as CustomerRepositoryPort;
use debitum_core::{AgreementService, BatchService, BillingService, ClassificationService};
use debitum_domain::{Config, Result};
use debitum_infra::{
    DbManager, SqliteAgreementRepository, SqliteBatchRepository, SqliteCustomerRepository,
    SqliteTimeEntryRepository,
};
use tracing::info;

/// Type alias for customer repository port trait object
type DynCustomerRepository = dyn CustomerRepositoryPort + 'static;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub agreements: AgreementService,
    pub classification: ClassificationService,
    pub billing: BillingService,
    pub batches: BatchService,
    pub customers: Arc<DynCustomerRepository>,
}

impl AppContext {
    /// Open the database, apply migrations, and wire the services.
    pub fn init(config: Config) -> Result<Arc<Self>> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let agreement_repo = Arc::new(SqliteAgreementRepository::new(Arc::clone(&db)));
        let entry_repo = Arc::new(SqliteTimeEntryRepository::new(Arc::clone(&db)));
        let customer_repo = Arc::new(SqliteCustomerRepository::new(Arc::clone(&db)));
        let batch_repo = Arc::new(SqliteBatchRepository::new(Arc::clone(&db)));

        let context = Self {
            agreements: AgreementService::new(agreement_repo.clone()),
            classification: ClassificationService::new(agreement_repo, entry_repo.clone()),
            billing: BillingService::new(entry_repo.clone(), customer_repo.clone()),
            batches: BatchService::new(batch_repo, entry_repo),
            customers: customer_repo,
            db,
            config,
        };

        info!("application context initialised");
        Ok(Arc::new(context))
    }

    /// Verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        self.db.health_check()
    }
}
