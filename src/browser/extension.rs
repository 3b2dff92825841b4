//! Tab host backed by the extension WebSocket.
//!
//! [`ExtensionHost`] turns [`TabHost`] calls into protocol requests.
//! [`attach_bridge`] routes extension events into a running coordinator and
//! answers popup messages once the coordinator replies.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::coordinator::CoordinatorHandle;
use crate::error::Result;
use crate::identifiers::TabId;
use crate::protocol::{
    ActionCommand, Command, EventReply, ParsedEvent, PopupReply, RUNTIME_MESSAGE, Request,
    TabsCommand,
};
use crate::scan::Badge;
use crate::transport::Connection;

use super::{TabHost, TabInfo};

// ============================================================================
// ExtensionHost
// ============================================================================

/// [`TabHost`] that drives the browser through the extension shim.
#[derive(Clone)]
pub struct ExtensionHost {
    connection: Connection,
}

impl fmt::Debug for ExtensionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionHost")
            .field("pending", &self.connection.pending_count())
            .field("closed", &self.connection.is_closed())
            .finish()
    }
}

impl ExtensionHost {
    /// Creates a host over an established connection.
    #[inline]
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Sends a command and returns the result payload.
    async fn send_command(&self, tab_id: Option<TabId>, command: Command) -> Result<Value> {
        let request = match tab_id {
            Some(tab_id) => Request::new(tab_id, command),
            None => Request::global(command),
        };
        self.connection.send(request).await?.into_result()
    }
}

#[async_trait]
impl TabHost for ExtensionHost {
    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        let result = self
            .send_command(None, Command::Tabs(TabsCommand::QueryActive))
            .await?;

        match result.get("tab") {
            None | Some(Value::Null) => Ok(None),
            Some(tab) => Ok(Some(serde_json::from_value(tab.clone())?)),
        }
    }

    async fn set_badge(&self, tab_id: TabId, badge: &Badge) -> Result<()> {
        self.send_command(
            Some(tab_id),
            Command::Action(ActionCommand::SetBadgeText {
                text: badge.text.clone(),
            }),
        )
        .await?;

        if let Some(color) = badge.color {
            self.send_command(
                Some(tab_id),
                Command::Action(ActionCommand::SetBadgeBackgroundColor {
                    color: color.to_string(),
                }),
            )
            .await?;
        }

        Ok(())
    }

    async fn redirect(&self, tab_id: TabId, url: &str) -> Result<()> {
        self.send_command(
            Some(tab_id),
            Command::Tabs(TabsCommand::Update {
                url: url.to_string(),
            }),
        )
        .await?;
        Ok(())
    }
}

// ============================================================================
// Event Bridge
// ============================================================================

/// Routes events from `connection` into the coordinator behind `handle`.
///
/// Tab events are forwarded without waiting. Popup messages are answered
/// with an [`EventReply`] once the coordinator has produced a reply; a
/// stopped coordinator still gets the popup an error object.
pub fn attach_bridge(connection: &Connection, handle: CoordinatorHandle) {
    let reply_connection = connection.clone();

    connection.set_event_handler(Box::new(move |event| {
        match event.parse() {
            ParsedEvent::RuntimeMessage { request } => {
                let handle = handle.clone();
                let connection = reply_connection.clone();
                let event_id = event.id;

                tokio::spawn(async move {
                    let reply = match handle.request(request).await {
                        Ok(reply) => reply,
                        Err(e) => PopupReply::from_error(&e),
                    };

                    let reply = EventReply::new(event_id, RUNTIME_MESSAGE, reply.to_value());
                    match connection.reply(reply) {
                        Ok(()) => {}
                        Err(e) if e.is_connection_error() => {
                            debug!("Extension left before the popup reply");
                        }
                        Err(e) => warn!(error = %e, "Failed to answer popup message"),
                    }
                });
            }

            ParsedEvent::Unknown { method, .. } => {
                debug!(%method, "Ignoring unknown event");
            }

            parsed => match parsed.into_tab_event() {
                Some(tab_event) => {
                    if let Err(e) = handle.notify(tab_event) {
                        warn!(error = %e, "Dropped tab event");
                    }
                }
                None => debug!(method = %event.method, "Tab event without tab id"),
            },
        }

        None
    }));
}
