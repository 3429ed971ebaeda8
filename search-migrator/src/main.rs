//! Search migrator entry point.
//!
//! Copies every author (with their books) from MySQL into the search index
//! and exits non-zero if the run fails.

use std::env;
use std::process::ExitCode;

use search_migrator::{Dependencies, MigratorError, Settings};
use search_migrator_pipeline::RunReport;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_result = dotenv::dotenv();

    init_tracing();

    if let Err(e) = dotenv_result {
        debug!(error = %e, "No .env file loaded");
    }

    match run().await {
        Ok(report) if report.is_success() => {
            info!("{}", report);
            ExitCode::SUCCESS
        }
        Ok(report) => {
            error!("{}", report);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "Migration could not start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunReport, MigratorError> {
    let settings = Settings::from_env()?;
    let dependencies = Dependencies::new(&settings).await?;
    let orchestrator = dependencies.orchestrator;

    let abort = orchestrator.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received shutdown signal, aborting run");
            abort.cancel();
        }
    });

    Ok(orchestrator.run().await)
}

/// Log to stdout; `RUST_LOG` filters, `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
