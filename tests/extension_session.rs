//! Full extension session: WebSocket shim, bridge, coordinator, classifier.

mod common;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use phishshield::browser::{ExtensionHost, attach_bridge};
use phishshield::transport::{AgentServer, Connection};
use phishshield::{Coordinator, RiskClient, TabHost};

use common::{FakeClassifier, FakeReply, config_for, tab};

const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// FakeExtension
// ============================================================================

/// Browser-side shim: answers every agent request and records it.
struct FakeExtension {
    outgoing: mpsc::UnboundedSender<Value>,
    requests: Arc<Mutex<Vec<Value>>>,
    replies: mpsc::UnboundedReceiver<Value>,
    active: Arc<Mutex<Value>>,
    task: JoinHandle<()>,
}

impl FakeExtension {
    async fn connect(url: &str) -> Self {
        let (ws, _) = connect_async(url).await.expect("connect");
        let (mut write, mut read) = ws.split();

        let ready = json!({
            "id": Uuid::nil(),
            "type": "success",
            "result": { "version": "test" }
        });
        write
            .send(Message::Text(ready.to_string().into()))
            .await
            .expect("send ready");

        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Value>();
        let (replies_tx, replies) = mpsc::unbounded_channel();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let active = Arc::new(Mutex::new(Value::Null));

        let task = {
            let requests = Arc::clone(&requests);
            let active = Arc::clone(&active);
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        Some(event) = outgoing_rx.recv() => {
                            if write.send(Message::Text(event.to_string().into())).await.is_err() {
                                break;
                            }
                        }

                        message = read.next() => {
                            let Some(Ok(Message::Text(text))) = message else { break };
                            let value: Value = serde_json::from_str(&text).expect("json");

                            if value.get("replyTo").is_some() {
                                let _ = replies_tx.send(value);
                                continue;
                            }

                            let result = match value["method"].as_str() {
                                Some("tabs.queryActive") => json!({ "tab": active.lock().clone() }),
                                _ => json!({}),
                            };
                            requests.lock().push(value.clone());

                            let response = json!({
                                "id": value["id"],
                                "type": "success",
                                "result": result
                            });
                            if write.send(Message::Text(response.to_string().into())).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            })
        };

        Self {
            outgoing,
            requests,
            replies,
            active,
            task,
        }
    }

    fn set_active(&self, id: u32, url: &str) {
        *self.active.lock() = json!({ "id": id, "url": url, "active": true, "status": "complete" });
    }

    fn event(&self, method: &str, params: Value) {
        let event = json!({
            "id": Uuid::new_v4(),
            "type": "event",
            "method": method,
            "params": params
        });
        self.outgoing.send(event).expect("extension running");
    }

    fn popup(&self, message_type: &str) {
        self.event("runtime.message", json!({ "type": message_type }));
    }

    async fn next_reply(&mut self) -> Value {
        tokio::time::timeout(WAIT, self.replies.recv())
            .await
            .expect("reply in time")
            .expect("extension running")
    }

    /// Waits until at least `count` requests have been seen.
    async fn requests(&self, count: usize) -> Vec<Value> {
        tokio::time::timeout(WAIT, async {
            loop {
                let seen = self.requests.lock().clone();
                if seen.len() >= count {
                    return seen;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("requests in time")
    }

    fn disconnect(self) {
        self.task.abort();
    }
}

// ============================================================================
// Session setup
// ============================================================================

struct Session {
    extension: FakeExtension,
    connection: Connection,
    coordinator: Arc<Coordinator>,
    task: JoinHandle<()>,
}

async fn start_session(classifier: &FakeClassifier) -> anyhow::Result<Session> {
    let server = AgentServer::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)).await?;
    let url = server.ws_url();

    let accepted = tokio::spawn(async move { server.accept().await?.handshake().await });
    let extension = FakeExtension::connect(&url).await;
    let (connection, ready) = accepted.await??;
    assert_eq!(ready.version, "test");

    let config = config_for(&[classifier.endpoint()]);
    let client = Arc::new(RiskClient::new(&config)?);
    let host: Arc<dyn TabHost> = Arc::new(ExtensionHost::new(connection.clone()));
    let coordinator = Arc::new(Coordinator::new(&config, client, host));
    let (handle, task) = Arc::clone(&coordinator).spawn();
    attach_bridge(&connection, handle);

    Ok(Session {
        extension,
        connection,
        coordinator,
        task,
    })
}

fn methods(requests: &[Value]) -> Vec<&str> {
    requests
        .iter()
        .filter_map(|request| request["method"].as_str())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn completed_navigation_badges_and_blocks_the_tab() -> anyhow::Result<()> {
    let classifier = FakeClassifier::fixed(FakeReply::risk(95.0, "phishing")).await;
    let session = start_session(&classifier).await?;

    session.extension.event(
        "tabs.updated",
        json!({
            "tabId": 4,
            "status": "complete",
            "url": "http://phish.example/login",
            "active": true
        }),
    );

    let requests = session.extension.requests(3).await;
    assert_eq!(
        methods(&requests),
        vec![
            "action.setBadgeText",
            "action.setBadgeBackgroundColor",
            "tabs.update"
        ]
    );
    assert!(requests.iter().all(|request| request["tabId"] == 4));
    assert_eq!(requests[0]["params"]["text"], "95");
    assert_eq!(requests[1]["params"]["color"], "#e74c3c");
    assert_eq!(requests[2]["params"]["url"], "blocked.html");

    assert_eq!(classifier.seen()[0].url(), "http://phish.example/login");
    assert!(session.coordinator.cache().get(tab(4)).is_some());
    Ok(())
}

#[tokio::test]
async fn loading_and_background_updates_are_ignored() -> anyhow::Result<()> {
    let classifier = FakeClassifier::fixed(FakeReply::risk(10.0, "benign")).await;
    let mut session = start_session(&classifier).await?;

    session.extension.event(
        "tabs.updated",
        json!({ "tabId": 2, "status": "loading", "url": "https://a.example/", "active": true }),
    );
    session.extension.event(
        "tabs.updated",
        json!({ "tabId": 3, "status": "complete", "url": "https://b.example/", "active": false }),
    );
    session.extension.event("bookmarks.created", json!({ "id": "x" }));

    // Popup round trip so the events above have been dispatched.
    session.extension.popup("getResult");
    assert_eq!(session.extension.next_reply().await["result"], json!({}));

    assert_eq!(classifier.hits(), 0);
    assert!(session.coordinator.cache().is_empty());
    Ok(())
}

#[tokio::test]
async fn popup_messages_are_answered_with_event_replies() -> anyhow::Result<()> {
    let classifier = FakeClassifier::fixed(FakeReply::risk(42.0, "benign")).await;
    let mut session = start_session(&classifier).await?;

    // No active tab yet.
    session.extension.popup("scan");
    let reply = session.extension.next_reply().await;
    assert_eq!(reply["replyTo"], "runtime.message");
    assert_eq!(reply["result"]["error"], "No active tab");

    session.extension.set_active(8, "https://bank.example/");

    session.extension.popup("scan");
    let scanned = session.extension.next_reply().await;
    assert_eq!(scanned["result"]["risk_percent"], 42);
    assert_eq!(scanned["result"]["scanned_url"], "https://bank.example/");

    session.extension.popup("getResult");
    let cached = session.extension.next_reply().await;
    assert_eq!(cached["result"], scanned["result"]);
    assert_eq!(classifier.hits(), 1);

    session.extension.popup("ping");
    let unknown = session.extension.next_reply().await;
    assert_eq!(unknown["result"]["error"], "Unknown message type");
    Ok(())
}

#[tokio::test]
async fn activation_rescans_and_removal_evicts() -> anyhow::Result<()> {
    let classifier = FakeClassifier::fixed(FakeReply::risk(30.0, "benign")).await;
    let session = start_session(&classifier).await?;

    session.extension.set_active(6, "https://shop.example/");
    session.extension.event("tabs.activated", json!({ "tabId": 6 }));

    let requests = session.extension.requests(3).await;
    assert_eq!(methods(&requests)[0], "tabs.queryActive");
    assert_eq!(requests[1]["params"]["text"], "30");
    assert_eq!(classifier.hits(), 1);

    session.extension.event("tabs.removed", json!({ "tabId": 6 }));
    tokio::time::timeout(WAIT, async {
        while session.coordinator.cache().get(tab(6)).is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;
    Ok(())
}

#[tokio::test]
async fn disconnect_ends_the_session() -> anyhow::Result<()> {
    let classifier = FakeClassifier::fixed(FakeReply::risk(55.0, "benign")).await;
    let Session {
        extension,
        connection,
        coordinator,
        task,
    } = start_session(&classifier).await?;

    extension.event(
        "tabs.updated",
        json!({ "tabId": 1, "status": "complete", "url": "https://a.example/", "active": true }),
    );
    extension.requests(2).await;
    assert_eq!(coordinator.cache().len(), 1);

    extension.disconnect();
    tokio::time::timeout(WAIT, connection.closed()).await?;

    connection.clear_event_handler();
    tokio::time::timeout(WAIT, task).await??;
    coordinator.end_session();

    assert!(coordinator.cache().is_empty());
    Ok(())
}
