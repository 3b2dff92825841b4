//! Shared fixtures for integration tests.
//!
//! - [`FakeClassifier`]: minimal HTTP/1.1 responder on a random port
//! - [`RecordingHost`]: [`TabHost`] that records badge and redirect calls

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use phishshield::{Badge, Result, ScannerConfig, TabHost, TabId, TabInfo};

// ============================================================================
// Helpers
// ============================================================================

/// Builds a tab ID, panicking on zero.
pub fn tab(id: u32) -> TabId {
    TabId::new(id).expect("non-zero tab id")
}

/// Returns a localhost URL on a port nothing listens on.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/predict")
}

/// Default config pointed at `endpoints` with a short timeout.
pub fn config_for(endpoints: &[String]) -> ScannerConfig {
    ScannerConfig::builder()
        .endpoints(endpoints.iter().cloned())
        .request_timeout(Duration::from_secs(2))
        .build()
        .expect("valid config")
}

// ============================================================================
// FakeClassifier
// ============================================================================

/// A request as seen by the fake classifier.
#[derive(Debug, Clone)]
pub struct FakeRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

impl FakeRequest {
    /// The `url` field of a predict request.
    pub fn url(&self) -> &str {
        self.body.get("url").and_then(Value::as_str).unwrap_or_default()
    }
}

/// What the fake classifier answers.
#[derive(Debug, Clone)]
pub struct FakeReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl FakeReply {
    /// 200 with a JSON body.
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// 200 with a classification body.
    pub fn risk(risk_percent: f64, label: &str) -> Self {
        Self::json(json!({ "risk_percent": risk_percent, "label_pred": label }))
    }

    /// Non-2xx status with an empty JSON body.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: "{}".to_string(),
            delay: Duration::ZERO,
        }
    }

    /// 200 with a body that is not JSON.
    pub fn garbage() -> Self {
        Self {
            status: 200,
            body: "<html>not json</html>".to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Delays the reply.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = dyn Fn(&FakeRequest) -> FakeReply + Send + Sync;

/// HTTP classifier stand-in counting every request it serves.
pub struct FakeClassifier {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<FakeRequest>>>,
    task: JoinHandle<()>,
}

impl FakeClassifier {
    /// Starts a classifier answering every request with `responder`.
    pub async fn start(
        responder: impl Fn(&FakeRequest) -> FakeReply + Send + Sync + 'static,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let task = {
            let hits = Arc::clone(&hits);
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                while let Ok((mut stream, _)) = listener.accept().await {
                    let hits = Arc::clone(&hits);
                    let seen = Arc::clone(&seen);
                    let responder = Arc::clone(&responder);
                    tokio::spawn(async move {
                        if let Some(request) = read_request(&mut stream).await {
                            hits.fetch_add(1, Ordering::SeqCst);
                            seen.lock().push(request.clone());
                            let reply = responder(&request);
                            write_reply(stream, reply).await;
                        }
                    });
                }
            })
        };

        Self {
            addr,
            hits,
            seen,
            task,
        }
    }

    /// Starts a classifier that always gives the same reply.
    pub async fn fixed(reply: FakeReply) -> Self {
        Self::start(move |_| reply.clone()).await
    }

    /// The `/predict` URL of this classifier.
    pub fn endpoint(&self) -> String {
        format!("http://{}/predict", self.addr)
    }

    /// Number of requests served.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Requests served so far.
    pub fn seen(&self) -> Vec<FakeRequest> {
        self.seen.lock().clone()
    }
}

impl Drop for FakeClassifier {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<FakeRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        match stream.read(&mut chunk).await.ok()? {
            0 => return None,
            n => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await.ok()? {
            0 => break,
            n => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let body_end = buf.len().min(header_end + content_length);
    let body = serde_json::from_slice(&buf[header_end..body_end]).unwrap_or(Value::Null);

    Some(FakeRequest { method, path, body })
}

async fn write_reply(mut stream: TcpStream, reply: FakeReply) {
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let response = format!(
        "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;

    // Drain so the client sees a clean close rather than a reset.
    let mut sink = [0u8; 256];
    let _ = tokio::time::timeout(Duration::from_millis(50), stream.read(&mut sink)).await;
}

// ============================================================================
// RecordingHost
// ============================================================================

/// [`TabHost`] that records every side effect.
#[derive(Default)]
pub struct RecordingHost {
    pub active: Mutex<Option<TabInfo>>,
    pub badges: Mutex<Vec<(TabId, Badge)>>,
    pub redirects: Mutex<Vec<(TabId, String)>>,
}

impl RecordingHost {
    /// Host whose active tab is `id` showing `url`.
    pub fn with_active(id: u32, url: &str) -> Self {
        let host = Self::default();
        host.set_active(id, url);
        host
    }

    /// Changes the active tab.
    pub fn set_active(&self, id: u32, url: &str) {
        *self.active.lock() = Some(TabInfo {
            id: tab(id),
            url: Some(url.to_string()),
            active: true,
            status: Some("complete".to_string()),
        });
    }

    /// Last badge shown on `tab_id`.
    pub fn last_badge(&self, tab_id: TabId) -> Option<Badge> {
        self.badges
            .lock()
            .iter()
            .rev()
            .find(|(id, _)| *id == tab_id)
            .map(|(_, badge)| badge.clone())
    }

    /// Redirects issued so far.
    pub fn redirects(&self) -> Vec<(TabId, String)> {
        self.redirects.lock().clone()
    }
}

#[async_trait]
impl TabHost for RecordingHost {
    async fn active_tab(&self) -> Result<Option<TabInfo>> {
        Ok(self.active.lock().clone())
    }

    async fn set_badge(&self, tab_id: TabId, badge: &Badge) -> Result<()> {
        self.badges.lock().push((tab_id, badge.clone()));
        Ok(())
    }

    async fn redirect(&self, tab_id: TabId, url: &str) -> Result<()> {
        self.redirects.lock().push((tab_id, url.to_string()));
        Ok(())
    }
}
