//! Column Import
//!
//! Streams the rows of one store table to stdout as JSON lines.

use std::env;

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use column_import::{run_import, Dependencies, ImportConfig, ImporterError};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), ImporterError> {
    dotenv().ok();
    init_tracing();

    let config = ImportConfig::from_env()?;
    let deps = Dependencies::new(&config).await?;

    let mut stdout = std::io::stdout().lock();
    match run_import(deps, &mut stdout).await {
        Ok(count) => {
            info!(records = count, "Finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Import failed");
            Err(e)
        }
    }
}
