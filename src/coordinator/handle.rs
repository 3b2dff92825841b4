//! Dispatch channel into a running coordinator.
//!
//! The bridge never awaits the coordinator directly. Tab events are queued
//! fire-and-forget; popup requests carry a oneshot for the reply. Each
//! envelope is handled in its own task, so a slow classifier call for one
//! tab never holds up events for another.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::browser::TabEvent;
use crate::error::{Error, Result};
use crate::protocol::{PopupReply, PopupRequest};

use super::Coordinator;

// ============================================================================
// Envelope
// ============================================================================

/// Work item for the coordinator task.
enum Envelope {
    /// Tab lifecycle event.
    Event(TabEvent),
    /// Popup request awaiting a reply.
    Request {
        request: PopupRequest,
        reply_tx: oneshot::Sender<PopupReply>,
    },
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(event) => f.debug_tuple("Event").field(event).finish(),
            Self::Request { request, .. } => f
                .debug_struct("Request")
                .field("request", request)
                .finish_non_exhaustive(),
        }
    }
}

// ============================================================================
// CoordinatorHandle
// ============================================================================

/// Cloneable sender side of a spawned [`Coordinator`].
///
/// The coordinator task stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl CoordinatorHandle {
    /// Queues a tab event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CoordinatorStopped`] if the coordinator task is gone.
    pub fn notify(&self, event: TabEvent) -> Result<()> {
        self.tx
            .send(Envelope::Event(event))
            .map_err(|_| Error::CoordinatorStopped)
    }

    /// Sends a popup request and waits for the reply.
    ///
    /// # Errors
    ///
    /// - [`Error::CoordinatorStopped`] if the coordinator task is gone
    /// - [`Error::ChannelClosed`] if the request was dropped unanswered
    pub async fn request(&self, request: PopupRequest) -> Result<PopupReply> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(Envelope::Request { request, reply_tx })
            .map_err(|_| Error::CoordinatorStopped)?;

        Ok(reply_rx.await?)
    }

    /// Returns `true` if the coordinator task has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// Coordinator - Task
// ============================================================================

impl Coordinator {
    /// Starts the coordinator task.
    ///
    /// Returns the handle used to feed it and the task's join handle.
    pub fn spawn(self: Arc<Self>) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.serve(rx));
        (CoordinatorHandle { tx }, task)
    }

    /// Receives envelopes and handles each in its own task.
    async fn serve(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<Envelope>) {
        while let Some(envelope) = rx.recv().await {
            trace!(?envelope, "Dispatching");
            let coordinator = Arc::clone(&self);
            tokio::spawn(async move { coordinator.dispatch(envelope).await });
        }

        debug!("Coordinator task stopped");
    }

    /// Handles one envelope.
    async fn dispatch(&self, envelope: Envelope) {
        match envelope {
            Envelope::Event(event) => self.handle_tab_event(event).await,
            Envelope::Request { request, reply_tx } => {
                let reply = self.handle_request(request).await;
                if reply_tx.send(reply).is_err() {
                    debug!("Popup request abandoned before reply");
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
