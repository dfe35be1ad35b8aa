//! Nutrient doser - command-line entry point
//!
//! Loads the feed charts, parses arguments against them, and runs a single
//! dose request. Library errors come back as values; this is the only place
//! that turns them into an exit status.

use std::io;
use std::process::ExitCode;

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use nutrient_doser::dose::{self, DosePayload, MixPlan};
use nutrient_doser::transport::{DryRunTransport, HttpTransport};
use nutrient_doser::{ChartStore, Cli, DoserError};

/// Initialize the logger. Logs go to stderr; `RUST_LOG` overrides the default level.
fn init_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logger();

    let store = match ChartStore::from_env() {
        Ok(store) => store,
        Err(e) => return report(e),
    };
    debug!(charts = ?store.chart_names(), "Chart store ready");

    let cli = Cli::parse_args(&store);
    debug!(?cli, "CLI arguments parsed");

    match run(&store, &cli) {
        Ok(payload) => {
            info!(nutrients = payload.nutrients.len(), "Dose request complete");
            ExitCode::SUCCESS
        }
        Err(e) => report(e),
    }
}

fn run(store: &ChartStore, cli: &Cli) -> nutrient_doser::Result<DosePayload> {
    let cmd = cli.dose_command();

    if cli.dry_run {
        let transport = DryRunTransport::new(io::stdout().lock());
        return dose::run(store, &cmd, &transport);
    }

    let transport = HttpTransport::new(cli.timeout())?;
    let payload = dose::run(store, &cmd, &transport)?;

    println!("✓ Sent dose for {} to {}", payload.target(), cmd.host);
    println!("{}", MixPlan::from_payload(&payload));
    Ok(payload)
}

fn report(e: DoserError) -> ExitCode {
    if !e.is_user_input() {
        error!("{e}");
    }
    eprintln!("✗ {e}");
    ExitCode::FAILURE
}
