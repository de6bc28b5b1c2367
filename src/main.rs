use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use payroll_ledger::api::{AppState, create_router};
use payroll_ledger::config::{ConfigLoader, LedgerSettings};
use payroll_ledger::logging;
use payroll_ledger::service::PayrollLedger;

#[derive(Debug, Parser)]
#[command(name = "payroll-ledger")]
#[command(about = "Payroll ledger transform and aggregation service")]
struct Args {
    /// Path to the YAML settings file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the settings file
    #[arg(short, long)]
    bind: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_logger(args.verbose);

    let settings = match &args.config {
        Some(path) => ConfigLoader::load(path)?,
        None => LedgerSettings::default(),
    };
    let bind = args.bind.unwrap_or_else(|| settings.server.bind.clone());

    tracing::info!(
        ledger = %settings.files.ledger.display(),
        policy = ?settings.payments.duplicate_policy,
        "Starting payroll-ledger"
    );

    let state = AppState::new(PayrollLedger::from_settings(&settings), settings.files.clone());
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!(address = %bind, "Listening");

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
