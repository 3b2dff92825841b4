//! phishshield agent binary.
//!
//! Listens for the browser extension, runs one coordinator per extension
//! session, and exits on Ctrl+C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use phishshield::browser::{ExtensionHost, attach_bridge};
use phishshield::transport::{AgentServer, Incoming};
use phishshield::{ConfigBuilder, Coordinator, Result, RiskClient, ScannerConfig};

// ============================================================================
// CLI
// ============================================================================

/// Per-tab phishing-risk annotator agent.
#[derive(Parser, Debug)]
#[command(name = "phishshield")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on for the extension
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Classifier endpoint; repeat to set a failover list
    #[arg(short, long = "endpoint", value_name = "URL")]
    endpoints: Vec<String>,

    /// Never redirect risky tabs
    #[arg(long)]
    no_auto_block: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

// ============================================================================
// Setup
// ============================================================================

/// Installs the log subscriber. `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default = if debug {
        "phishshield=debug"
    } else {
        "phishshield=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the configuration file (if any) and applies CLI overrides.
fn load_config(args: &Args) -> Result<ScannerConfig> {
    let base = match &args.config {
        Some(path) => ScannerConfig::from_file(path)?,
        None => ScannerConfig::default(),
    };

    let mut builder = ConfigBuilder::from_config(base);
    if let Some(listen) = args.listen {
        builder = builder.listen(listen);
    }
    if !args.endpoints.is_empty() {
        builder = builder.endpoints(args.endpoints.iter().cloned());
    }
    if args.no_auto_block {
        builder = builder.disable_auto_block();
    }

    builder.build()
}

/// Logs whether the classifier is up. Never fatal.
async fn probe_health(client: &RiskClient) {
    match client.health().await {
        Some((endpoint, report)) if report.is_ok() => {
            info!(%endpoint, "Classifier healthy");
        }
        Some((endpoint, report)) => {
            warn!(%endpoint, status = %report.status, "Classifier degraded");
        }
        None => {
            warn!("Classifier not reachable; scans report it as unreachable until it starts");
        }
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Completes the handshake, then runs the session until the extension
/// disconnects.
async fn run_session(config: Arc<ScannerConfig>, client: Arc<RiskClient>, incoming: Incoming) {
    let peer_addr = incoming.peer_addr();
    let connection = match incoming.handshake().await {
        Ok((connection, _ready)) => connection,
        Err(e) if e.is_timeout() => {
            debug!(%peer_addr, "Peer never completed the handshake");
            return;
        }
        Err(e) => {
            warn!(%peer_addr, error = %e, "Extension handshake failed");
            return;
        }
    };

    let host = Arc::new(ExtensionHost::new(connection.clone()));
    let coordinator = Arc::new(Coordinator::new(&config, client, host));
    let (handle, task) = Arc::clone(&coordinator).spawn();

    info!(
        %peer_addr,
        auto_block = coordinator.policy().is_enabled(),
        "Session started"
    );

    attach_bridge(&connection, handle);
    connection.closed().await;

    // Dropping the handler drops the bridge's handle, which stops the task.
    connection.clear_event_handler();
    if let Err(e) = task.await {
        warn!(error = %e, "Coordinator task failed");
    }
    coordinator.end_session();
}

async fn run(args: Args) -> Result<()> {
    let config = Arc::new(load_config(&args)?);
    let client = Arc::new(RiskClient::new(&config)?);

    probe_health(&client).await;

    let server = AgentServer::bind(config.listen).await?;
    info!(
        addr = %server.local_addr(),
        endpoints = config.endpoints.len(),
        auto_block = config.auto_block.enabled,
        threshold = config.auto_block.threshold,
        "Agent listening"
    );

    loop {
        tokio::select! {
            accepted = server.accept() => match accepted {
                Ok(incoming) => {
                    tokio::spawn(run_session(
                        Arc::clone(&config),
                        Arc::clone(&client),
                        incoming,
                    ));
                }
                Err(e) => warn!(error = %e, "Accept failed"),
            },

            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Agent failed");
            ExitCode::FAILURE
        }
    }
}
