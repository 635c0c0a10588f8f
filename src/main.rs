//! Training register maintenance binary.
//!
//! Opens (and if needed creates) the register database, then recomputes the
//! stored progress of every document instance that has responses. Run it
//! after bulk imports or when stored percentages are suspected stale.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;

use training_register::adapters::{init_database, ProgressRegistry, SqliteResponseStore};
use training_register::application::{CompletionEngine, ProgressReconciler};
use training_register::config::AppConfig;
use training_register::domain::foundation::DomainError;
use training_register::ports::ResponseStore;
use training_register::telemetry::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    init_tracing(&config.logging);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = %e.code, error = %e, "Reconciliation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig) -> Result<(), DomainError> {
    let pool = init_database(&config.database).await?;
    let store: Arc<dyn ResponseStore> = Arc::new(SqliteResponseStore::new(pool.clone()));
    let engine = Arc::new(CompletionEngine::new(
        Arc::clone(&store),
        Arc::new(ProgressRegistry::new()),
    ));

    ProgressReconciler::new(store, engine).reconcile().await?;

    pool.close().await;
    Ok(())
}
