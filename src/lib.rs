//! phishshield - Per-tab phishing-risk annotator.
//!
//! A local agent that a browser extension shim connects to. On tab
//! navigation it submits the visited URL to a remote classifier, caches
//! the outcome per tab, shows the score on the toolbar badge, and can
//! redirect risky tabs to a warning page.
//!
//! # Architecture
//!
//! The agent follows a client-server model:
//!
//! - **Agent (Rust)**: Scan decisions, cache, classifier client, auto-block
//! - **Extension (shim)**: Forwards tab events and popup messages, executes
//!   badge and navigation commands
//!
//! Key design principles:
//!
//! - Each extension session owns one [`Coordinator`] and its cache
//! - Protocol uses `module.methodName` format
//! - Classifier endpoints are tried once, in order; no retries
//! - Every event is handled in its own task; last scan to resolve wins
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use phishshield::browser::ExtensionHost;
//! use phishshield::transport::AgentServer;
//! use phishshield::{Coordinator, Result, RiskClient, ScannerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let config = ScannerConfig::default();
//!     let service = Arc::new(RiskClient::new(&config)?);
//!     let server = AgentServer::bind(config.listen).await?;
//!
//!     let (connection, _ready) = server.accept().await?.handshake().await?;
//!     let host = Arc::new(ExtensionHost::new(connection.clone()));
//!     let coordinator = Arc::new(Coordinator::new(&config, service, host));
//!     let (handle, _task) = Arc::clone(&coordinator).spawn();
//!
//!     phishshield::browser::attach_bridge(&connection, handle);
//!     connection.closed().await;
//!     coordinator.end_session();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | [`TabHost`] seam and the extension-backed host |
//! | [`classify`] | Scheme and search-results-page exemptions |
//! | [`config`] | [`ScannerConfig`] and its builder |
//! | [`coordinator`] | Tab scan coordinator |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | WebSocket message types |
//! | [`scan`] | Outcomes, badges, per-tab cache |
//! | [`service`] | Remote classifier client |
//! | [`transport`] | WebSocket server and connection |

// ============================================================================
// Modules
// ============================================================================

/// Browser-side collaborators.
pub mod browser;

/// URL exemption heuristics.
pub mod classify;

/// Agent configuration.
pub mod config;

/// Tab scan coordinator.
pub mod coordinator;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// WebSocket protocol message types.
///
/// Defines request/response/event structures and the popup contract.
pub mod protocol;

/// Scan outcomes, badges and the per-tab cache.
pub mod scan;

/// Remote risk service.
pub mod service;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{ExtensionHost, TabEvent, TabHost, TabInfo};

// Configuration types
pub use config::{AutoBlock, ConfigBuilder, ScannerConfig};

// Coordinator types
pub use coordinator::{AutoBlockPolicy, Coordinator, CoordinatorHandle, ScanRequest};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{RequestId, TabId};

// Protocol types
pub use protocol::{PopupReply, PopupRequest};

// Scan types
pub use scan::{Badge, ScanCache, ScanOutcome, ScanStatus};

// Service types
pub use service::{Classification, RiskClient, RiskService};
