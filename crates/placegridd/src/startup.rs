//! Daemon assembly: config, recovery, HTTP serving.
//!
//! Recovery failures are fatal. A log that references a node missing from
//! `[cluster].nodes` means the topology drifted or the log is corrupt, and
//! the daemon refuses to start rather than drop records.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use placegrid_core::PlacegridConfig;
use placegrid_deploy::KubectlExecutor;
use placegrid_placement::{NodeRegistry, PlacementEngine};
use tracing::info;

/// Load `path`, or fall back to built-in defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PlacegridConfig> {
    match path {
        Some(path) => {
            let config = PlacegridConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => {
            let config = PlacegridConfig::default();
            config.validate()?;
            info!("no config file given, using defaults");
            Ok(config)
        }
    }
}

/// Open the store and replay it into a ready engine.
pub fn build_engine(config: &PlacegridConfig) -> anyhow::Result<PlacementEngine> {
    let store = placegrid_state::open_store(&config.state)
        .with_context(|| format!("failed to open state at {}", config.state.path.display()))?;
    let executor = Arc::new(KubectlExecutor::from_config(&config.deploy));

    let mut engine = PlacementEngine::recover(config.cluster.nodes.iter().cloned(), store, executor)
        .context("failed to recover placement state")?;
    if let Some(secs) = config.deploy.timeout_secs {
        engine = engine.with_deploy_timeout(Duration::from_secs(secs));
    }
    Ok(engine)
}

pub async fn run_server(config: PlacegridConfig) -> anyhow::Result<()> {
    info!(nodes = ?config.cluster.nodes, "placegrid daemon starting");

    let engine = build_engine(&config)?;
    info!(placed = engine.registry().placed_count(), "placement engine ready");

    let router = placegrid_api::build_router(engine.into_shared());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!(%addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("placegrid daemon stopped");
    Ok(())
}

/// Print the registry rebuilt from the log, without touching the executor.
pub fn print_status(config: &PlacegridConfig, format: &str) -> anyhow::Result<()> {
    let store = placegrid_state::open_store(&config.state)?;
    let mut registry = NodeRegistry::new(config.cluster.nodes.iter().cloned());
    registry
        .load(store.load_all()?)
        .context("failed to replay placement state")?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&registry.snapshot())?);
        }
        "text" => {
            for (node, apps) in registry.nodes() {
                println!("{node} ({}/{})", apps.len(), placegrid_placement::NODE_CAPACITY);
                for app in apps {
                    println!("  {:<24} {:<8} {}", app.name, app.resource_type, app.image);
                }
            }
        }
        other => bail!("unknown format: {other} (expected text or json)"),
    }
    Ok(())
}
