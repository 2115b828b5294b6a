//! Debitum - billing and time-accounting service

use std::process::ExitCode;

use debitum_app::{router, AppContext};
use debitum_domain::{BillingError, Result};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    debitum_app::utils::logging::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = debitum_infra::config::load()?;
    let ctx = AppContext::init(config.clone())?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .map_err(|err| {
            BillingError::Config(format!("cannot bind {}: {err}", config.server.bind_addr))
        })?;
    info!(addr = %config.server.bind_addr, "debitum listening");

    axum::serve(listener, router(ctx))
        .await
        .map_err(|err| BillingError::Internal(format!("server error: {err}")))
}
