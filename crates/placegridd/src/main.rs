//! placegridd — the placegrid daemon.
//!
//! Single binary that assembles:
//! - Placement log (line file or redb)
//! - Node registry, recovered from the log
//! - Placement engine + kubectl executor
//! - REST API
//!
//! # Usage
//!
//! ```text
//! placegridd serve --config /etc/placegrid/placegrid.toml
//! placegridd status --config /etc/placegrid/placegrid.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod startup;

/// Used when `RUST_LOG` is unset. Targets are crate names as the compiler
/// spells them, with underscores.
const DEFAULT_LOG_FILTER: &str = "info,placegridd=debug,placegrid_core=debug,placegrid_state=debug,\
placegrid_placement=debug,placegrid_deploy=debug,placegrid_api=debug";

#[derive(Parser)]
#[command(name = "placegridd", about = "placegrid daemon", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Accept deployment requests over HTTP.
    Serve {
        /// Path to placegrid.toml. Built-in defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides [server].port).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the recorded placements per node and exit.
    Status {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.parse().unwrap());
    if cli.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Command::Serve { config, port } => {
            let mut config = startup::load_config(config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }
            startup::run_server(config).await
        }
        Command::Status { config, format } => {
            let config = startup::load_config(config.as_deref())?;
            startup::print_status(&config, &format)
        }
    }
}
