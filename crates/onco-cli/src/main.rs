mod data;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use onco_audit::{AuditStore, InMemoryAuditStore, SqliteAuditStore};
use onco_core::{EvidenceSource, Query};
use onco_engine::{EngineConfig, Orchestrator, RunInput};
use onco_evidence::{EuropePmcBackend, PubMedBackend, StaticBackend};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "oncoflow", version, about = "Clinical evidence workflow engine")]
struct Cli {
    #[arg(long, default_value = "melanoma")]
    cancer_type: String,

    /// Treatment arms; the first two are compared.
    #[arg(long, value_delimiter = ',', default_value = "pembrolizumab,nivolumab")]
    arms: Vec<String>,

    /// Earliest publication year to search.
    #[arg(long, default_value_t = 2023)]
    min_year: u16,

    /// Latest publication year to search.
    #[arg(long, default_value_t = 2025)]
    max_year: u16,

    #[arg(long, default_value_t = 12)]
    max_results: usize,

    /// SQLite audit log path. In-memory (nothing survives the process) when omitted.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Use the bundled literature fixture instead of the live APIs.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Per-attempt ceiling on one literature call, in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_seconds: u64,

    /// Requests-per-second ceiling against each upstream API.
    #[arg(long, default_value_t = 3.0)]
    requests_per_second: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let query = Query {
        cancer_type: cli.cancer_type.clone(),
        treatment_arms: cli.arms.clone(),
        min_year: cli.min_year,
        max_year: cli.max_year,
        max_results: cli.max_results,
    };

    let audit: Arc<dyn AuditStore> = match &cli.db {
        Some(path) => Arc::new(SqliteAuditStore::open(path)?),
        None => Arc::new(InMemoryAuditStore::new()),
    };

    let timeout = Duration::from_secs(cli.timeout_seconds);
    let config = EngineConfig {
        evidence_timeout: timeout,
        ..EngineConfig::default()
    };

    let orchestrator = if cli.offline {
        info!("offline mode: bundled literature fixture");
        Orchestrator::new(
            Arc::new(StaticBackend::with_demo_records(
                cli.max_results,
                EvidenceSource::Primary,
            )),
            audit,
            config,
        )
    } else {
        let primary = PubMedBackend::new(timeout, cli.requests_per_second)?;
        let fallback = EuropePmcBackend::new(timeout, cli.requests_per_second)?;
        Orchestrator::new(Arc::new(primary), audit, config)
            .with_fallback(Arc::new(fallback))
    };

    info!(cancer_type = %query.cancer_type, "initiating clinical evidence review");

    let record = orchestrator
        .run(RunInput {
            query,
            samples: data::demo_trial_data(),
        })
        .await?;

    println!("{}", report::render(&record));
    Ok(())
}
