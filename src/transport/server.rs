//! WebSocket server the extension shim connects to.
//!
//! # Connection Flow
//!
//! 1. The agent binds to its configured listen address
//! 2. [`AgentServer::accept`] takes the next TCP connection
//! 3. [`Incoming::handshake`] upgrades it to WebSocket and waits for READY,
//!    bounded by a single deadline
//! 4. The connection is handed to a coordinator for the session
//!
//! Accepting never waits on a peer, so a client that connects and then
//! stalls only ties up its own handshake. The server keeps listening after a
//! session ends, so a reloaded extension can reconnect without restarting
//! the agent.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::Connection;
use super::connection::ReadyData;

// ============================================================================
// Constants
// ============================================================================

/// Deadline for the WebSocket upgrade plus READY.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// AgentServer
// ============================================================================

/// A bound WebSocket server accepting extension sessions.
///
/// # Example
///
/// ```ignore
/// use phishshield::transport::AgentServer;
///
/// let server = AgentServer::bind("127.0.0.1:8765".parse()?).await?;
///
/// loop {
///     let incoming = server.accept().await?;
///     tokio::spawn(async move {
///         let (connection, ready) = incoming.handshake().await?;
///         // Hand the connection to a coordinator...
///     });
/// }
/// ```
pub struct AgentServer {
    /// TCP listener for incoming connections.
    listener: TcpListener,
    /// Address the server is actually bound to.
    local_addr: SocketAddr,
}

impl AgentServer {
    /// Binds a WebSocket server to the given address.
    ///
    /// Use port 0 to let the OS assign a random available port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        debug!(%local_addr, "WebSocket server bound");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Returns the port the server is bound to.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Returns the local socket address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the WebSocket URL for this server.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.local_addr)
    }

    /// Accepts the next TCP connection.
    ///
    /// Returns as soon as the socket is accepted; the handshake is left to
    /// [`Incoming::handshake`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if accepting fails.
    pub async fn accept(&self) -> Result<Incoming> {
        let (stream, peer_addr) = self.listener.accept().await?;

        debug!(%peer_addr, "TCP connection accepted");

        Ok(Incoming { stream, peer_addr })
    }
}

// ============================================================================
// Incoming
// ============================================================================

/// An accepted TCP connection that has not completed the handshake.
#[derive(Debug)]
pub struct Incoming {
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl Incoming {
    /// Returns the peer's address.
    #[inline]
    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Upgrades to WebSocket and waits for READY within
    /// [`HANDSHAKE_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the WebSocket upgrade fails
    /// - [`Error::ConnectionTimeout`] if the handshake misses the deadline
    /// - [`Error::ConnectionClosed`] if the peer leaves before READY
    pub async fn handshake(self) -> Result<(Connection, ReadyData)> {
        self.handshake_within(HANDSHAKE_TIMEOUT).await
    }

    /// [`handshake`](Self::handshake) with a custom deadline.
    ///
    /// # Errors
    ///
    /// Same as [`handshake`](Self::handshake).
    pub async fn handshake_within(self, deadline: Duration) -> Result<(Connection, ReadyData)> {
        let Self { stream, peer_addr } = self;

        let handshake = async move {
            let ws_stream = tokio_tungstenite::accept_async(stream)
                .await
                .map_err(|e| Error::connection(format!("WebSocket upgrade failed: {e}")))?;

            let connection = Connection::new(ws_stream);
            let ready = connection.wait_ready().await?;
            Ok::<_, Error>((connection, ready))
        };

        let (connection, ready) = timeout(deadline, handshake)
            .await
            .map_err(|_| Error::connection_timeout(deadline.as_millis() as u64))??;

        info!(%peer_addr, version = %ready.version, "Extension connected");

        Ok((connection, ready))
    }
}

// ============================================================================
// Tests
// ============================================================================
