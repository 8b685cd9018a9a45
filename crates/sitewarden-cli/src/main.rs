//! The sitewarden operator CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use sitewarden_agents::{default_registry, PerformanceMonitor};
use sitewarden_audit::{AuditConfig, SiteAuditor};
use sitewarden_core::{SiteConfig, SiteRegistry};
use sitewarden_gate::{GateInput, GateOptions, GateThresholds, PublicationGate};
use sitewarden_orchestrator::{Coordinator, CoordinatorConfig, StoreMetrics};
use sitewarden_research::{default_sources, ResearchAgent};
use sitewarden_store::{ReportStore, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitewarden", about = "Sitewarden — site health orchestration")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "sitewarden.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full orchestrator for a site
    Orchestrate {
        /// Site identifier from the config
        #[arg(long)]
        site: String,
        /// Include the weekly research phase
        #[arg(long)]
        research: bool,
    },
    /// Run only the live site audit
    Audit {
        /// Site identifier from the config
        #[arg(long)]
        site: String,
        /// Maximum sitemap URLs to probe
        #[arg(long, default_value_t = 50)]
        max_urls: usize,
    },
    /// Review one content item against the publication gate
    Gate {
        /// Path to a JSON file with the gate input
        #[arg(long)]
        input: PathBuf,
        /// Probe route reachability (off for offline audits)
        #[arg(long)]
        online: bool,
    },
    /// Run the weekly research pass
    Research,
    /// Show agent fleet health
    Agents,
}

#[derive(Deserialize)]
struct SitewardenConfig {
    #[serde(default = "default_store_path")]
    store_path: PathBuf,
    #[serde(default)]
    sites: Vec<SiteConfig>,
    #[serde(default)]
    orchestrator: OrchestratorSection,
}

#[derive(Deserialize)]
struct OrchestratorSection {
    #[serde(default = "default_max_duration_secs")]
    max_duration_secs: u64,
    #[serde(default = "default_max_sitemap_urls")]
    max_sitemap_urls: usize,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_duration_secs(),
            max_sitemap_urls: default_max_sitemap_urls(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("sitewarden.db")
}
fn default_max_duration_secs() -> u64 {
    300
}
fn default_max_sitemap_urls() -> usize {
    50
}

fn resolve_site(registry: &SiteRegistry, id: &str) -> anyhow::Result<SiteConfig> {
    registry
        .get(id)
        .cloned()
        .with_context(|| format!("site '{id}' not found in config"))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config: SitewardenConfig = if cli.config.exists() {
        let raw = tokio::fs::read_to_string(&cli.config)
            .await
            .with_context(|| format!("failed to read config {}", cli.config.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", cli.config.display()))?
    } else {
        SitewardenConfig {
            store_path: default_store_path(),
            sites: Vec::new(),
            orchestrator: OrchestratorSection::default(),
        }
    };

    let registry = SiteRegistry::new(config.sites.clone());
    let store: Arc<dyn ReportStore> =
        Arc::new(SqliteStore::open(&config.store_path).context("failed to open store")?);

    match cli.command {
        Commands::Orchestrate { site, research } => {
            let site = resolve_site(&registry, &site)?;
            let auditor = SiteAuditor::new(AuditConfig::default())?;
            let monitor = PerformanceMonitor::new(default_registry(), store.clone());
            let metrics = Arc::new(StoreMetrics::new(store.clone()));
            let mut coordinator = Coordinator::new(auditor, monitor, metrics, store.clone())
                .with_config(CoordinatorConfig {
                    max_duration: Duration::from_secs(config.orchestrator.max_duration_secs),
                    max_sitemap_urls: config.orchestrator.max_sitemap_urls,
                    research_reserve: Duration::from_secs(15),
                });
            if research {
                coordinator =
                    coordinator.with_research(ResearchAgent::new(default_sources(), store.clone())?);
            }
            let report = coordinator.run(&site).await;
            print_json(&report)?;
        }
        Commands::Audit { site, max_urls } => {
            let site = resolve_site(&registry, &site)?;
            let auditor = SiteAuditor::new(AuditConfig::default())?;
            let deadline = Instant::now() + Duration::from_secs(config.orchestrator.max_duration_secs);
            let result = auditor.audit(&site, max_urls, deadline).await;
            print_json(&result)?;
        }
        Commands::Gate { input, online } => {
            let raw = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("failed to read gate input {}", input.display()))?;
            let gate_input: GateInput =
                serde_json::from_str(&raw).context("failed to parse gate input")?;
            let gate = PublicationGate::new(GateThresholds::default())?;
            let result = gate
                .review(
                    &gate_input,
                    GateOptions {
                        skip_reachability: !online,
                    },
                )
                .await;
            print_json(&result)?;
            if !result.allowed {
                std::process::exit(1);
            }
        }
        Commands::Research => {
            let agent = ResearchAgent::new(default_sources(), store.clone())?;
            let run = agent
                .run_weekly(Instant::now() + Duration::from_secs(120))
                .await;
            print_json(&run)?;
        }
        Commands::Agents => {
            let monitor = PerformanceMonitor::new(default_registry(), store.clone());
            let perf = monitor.analyze(chrono::Utc::now()).await?;
            print_json(&perf)?;
        }
    }

    Ok(())
}
