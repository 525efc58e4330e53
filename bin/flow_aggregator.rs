//! # Flow Aggregator
//!
//! Reads decoded transfer events (one JSON object per line) and prints the
//! per-asset inbound/outbound totals in canonical 8-decimal precision.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin flow_aggregator -- --chain-ids 2,10002 --input transfers.jsonl
//! ```
//!
//! Each input line looks like:
//!
//! ```json
//! {"direction":"inbound","amount":"1000000000000000000","native_decimals":18,
//!  "origin_address":"0xc02a...","origin_chain":2,"observed_on":2}
//! ```
//!
//! `observed_on` is optional; events observed on a chain that is not enabled are skipped.
//! Press Ctrl+C to stop early and print what has been aggregated so far.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use transfer_verifier_sdk::{
    chains::{validate_chains, ChainId},
    flow_ledger::FlowLedger,
    ledger_service::{spawn_ledger_service, LedgerError},
    metrics,
    settings::Settings,
    types::FlowEvent,
};

#[derive(Parser, Debug)]
#[command(name = "flow_aggregator", about = "Aggregate bridged transfer flows per asset")]
struct Args {
    /// Settings file (defaults to ./Config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chain IDs to verify, overriding settings
    #[arg(long, value_delimiter = ',')]
    chain_ids: Vec<u64>,

    /// JSON-lines input file; reads stdin when omitted or "-"
    #[arg(long)]
    input: Option<PathBuf>,

    /// Prometheus listener address
    #[cfg(feature = "observability")]
    #[arg(long)]
    metrics_addr: Option<std::net::SocketAddr>,
}

#[derive(Debug, Deserialize)]
struct InputLine {
    #[serde(default)]
    observed_on: Option<ChainId>,
    #[serde(flatten)]
    event: FlowEvent,
}

#[cfg(feature = "observability")]
fn init_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[cfg(not(feature = "observability"))]
fn init_logging() {
    env_logger::init();
}

#[cfg(feature = "observability")]
fn setup_metrics(args: &Args) -> Result<()> {
    if let Some(addr) = args.metrics_addr {
        metrics::install_prometheus_exporter(addr)?;
        eprintln!("✅ Metrics exporter listening on {}", addr);
    }
    Ok(())
}

#[cfg(not(feature = "observability"))]
fn setup_metrics(_args: &Args) -> Result<()> {
    metrics::describe_metrics();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let args = Args::parse();

    // 1. Load and validate settings
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::new()?,
    };
    if !args.chain_ids.is_empty() {
        settings.verifier.chain_ids = args.chain_ids.clone();
    }
    let limits = settings.cache_limits()?;
    let enabled = validate_chains(&settings.verifier.chain_ids)?;
    eprintln!(
        "✅ Settings loaded (max_size: {}, delete_count: {}, chains: {:?})",
        limits.max_size(),
        limits.delete_count(),
        enabled.iter().map(|c| c.name().unwrap_or("unknown")).collect::<Vec<_>>()
    );

    setup_metrics(&args)?;

    // 2. Start the ledger owner
    let (ledger, task) = spawn_ledger_service(FlowLedger::new(limits), &settings.service);

    // 3. Feed events
    let reader: Box<dyn tokio::io::AsyncRead + Unpin + Send> = match &args.input {
        Some(path) if path.as_os_str() != "-" => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        _ => Box::new(tokio::io::stdin()),
    };
    let mut lines = BufReader::new(reader).lines();

    let (mut applied, mut skipped, mut rejected) = (0usize, 0usize, 0usize);
    let mut line_no = 0usize;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                info!("Interrupted, printing partial totals");
                break;
            }
        };
        let Some(line) = line else { break };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let input: InputLine = serde_json::from_str(&line)
            .with_context(|| format!("line {}: malformed transfer event", line_no))?;

        if let Some(chain) = input.observed_on {
            if !enabled.contains(&chain) {
                warn!("line {}: skipping event observed on disabled chain {}", line_no, chain);
                metrics::increment_rejected_record("chain_not_enabled");
                skipped += 1;
                continue;
            }
        }

        match ledger.apply(input.event).await {
            Ok(_) => applied += 1,
            Err(LedgerError::Upsert(e)) => {
                warn!("line {}: {}", line_no, e);
                rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    // 4. Report
    ledger.trim().await?;
    let snapshots = ledger.snapshots().await?;
    drop(ledger);
    task.await?;

    let report: Vec<serde_json::Value> = snapshots
        .iter()
        .map(|s| {
            serde_json::json!({
                "key": s.key,
                "inbound": s.inbound.to_string(),
                "outbound": s.outbound.to_string(),
                "net": s.net().to_string(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);

    eprintln!(
        "✅ Done: {} applied, {} skipped, {} rejected, {} assets",
        applied,
        skipped,
        rejected,
        snapshots.len()
    );
    Ok(())
}
