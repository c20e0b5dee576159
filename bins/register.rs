//! Bulk voter registration.
//!
//! Usage: `register <records.json>` where the file holds a JSON array of
//! `{id, name, fingerprint_ref}` objects. The ledger location comes from the
//! same configuration the server uses.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use dotenvy::dotenv;
use models::VoterRecord;
use service::{ledger::VoterLedger, registry, storage::JsonVoterStore};
use tracing::{error, info};

async fn run(input: &str) -> anyhow::Result<()> {
    let cfg = configs::AppConfig::load_or_default()?;
    let raw = tokio::fs::read(input).await.with_context(|| format!("reading {input}"))?;
    let records: Vec<VoterRecord> =
        serde_json::from_slice(&raw).with_context(|| format!("parsing voter records in {input}"))?;

    let ledger = VoterLedger::new(Arc::new(JsonVoterStore::new(&cfg.storage.voters_file)));
    let summary = registry::register_voters(&ledger, records)
        .await
        .map_err(|e| anyhow!("registration rejected: {e}"))?;
    info!(added = summary.added, total = summary.total, ledger = %ledger.location(), "registration complete");
    println!("registered {} voters ({} total) in {}", summary.added, summary.total, ledger.location());
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let Some(input) = std::env::args().nth(1) else {
        eprintln!("usage: register <records.json>");
        return std::process::ExitCode::FAILURE;
    };
    match run(&input).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "voter registration failed");
            std::process::ExitCode::FAILURE
        }
    }
}
