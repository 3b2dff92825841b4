//! HTTP client with single-pass endpoint failover.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::ScannerConfig;
use crate::error::{Error, Result};

use super::{Classification, HealthReport, RiskService};

// ============================================================================
// Constants
// ============================================================================

/// User agent sent to the classifier.
const USER_AGENT: &str = concat!("phishshield/", env!("CARGO_PKG_VERSION"));

/// Path of the classifier's health document.
const HEALTH_PATH: &str = "/health";

// ============================================================================
// RiskClient
// ============================================================================

/// Classifier client over HTTP.
///
/// Each [`classify`](RiskService::classify) call tries the configured
/// endpoints in order and stops at the first 2xx response.
///
/// # Example
///
/// ```no_run
/// use phishshield::{RiskClient, RiskService, ScannerConfig};
///
/// # async fn example() -> phishshield::Result<()> {
/// let client = RiskClient::new(&ScannerConfig::default())?;
/// match client.classify("http://paypal-verify.example").await {
///     Some(c) => println!("risk {:?} label {}", c.raw_risk(), c.label()),
///     None => println!("classifier not reachable"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RiskClient {
    /// Shared HTTP client (connection pool, timeout).
    client: Client,
    /// Endpoints in failover order.
    endpoints: Vec<Url>,
}

// ============================================================================
// RiskClient - Constructor
// ============================================================================

impl RiskClient {
    /// Creates a client from the configured endpoints and timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if an endpoint does not parse
    /// - [`Error::Http`] if the HTTP client cannot be built
    pub fn new(config: &ScannerConfig) -> Result<Self> {
        let endpoints = config
            .endpoints
            .iter()
            .map(|e| {
                Url::parse(e).map_err(|err| Error::config(format!("Invalid endpoint '{e}': {err}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, endpoints })
    }

    /// Returns the endpoints in failover order.
    #[inline]
    #[must_use]
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }
}

// ============================================================================
// RiskClient - Requests
// ============================================================================

impl RiskClient {
    /// Issues one classification request against one endpoint.
    async fn post_predict(&self, endpoint: &Url, url: &str) -> Result<Classification> {
        let response = self
            .client
            .post(endpoint.clone())
            .json(&json!({ "url": url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::protocol(format!("classifier returned HTTP {status}")));
        }

        Ok(response.json::<Classification>().await?)
    }

    /// Probes `GET /health` on each endpoint's origin in order.
    ///
    /// Returns the first endpoint that answered along with its report, or
    /// `None` if none did.
    pub async fn health(&self) -> Option<(Url, HealthReport)> {
        for endpoint in &self.endpoints {
            let Ok(health_url) = endpoint.join(HEALTH_PATH) else {
                continue;
            };

            let result = async {
                let response = self
                    .client
                    .get(health_url.clone())
                    .send()
                    .await?
                    .error_for_status()?;
                Ok::<_, Error>(response.json::<HealthReport>().await?)
            }
            .await;

            match result {
                Ok(report) => {
                    debug!(endpoint = %endpoint, status = %report.status, "Health probe answered");
                    return Some((endpoint.clone(), report));
                }
                Err(e) => {
                    debug!(endpoint = %health_url, error = %e, "Health probe failed");
                }
            }
        }
        None
    }
}

// ============================================================================
// RiskService Implementation
// ============================================================================

#[async_trait]
impl RiskService for RiskClient {
    async fn classify(&self, url: &str) -> Option<Classification> {
        for (idx, endpoint) in self.endpoints.iter().enumerate() {
            match self.post_predict(endpoint, url).await {
                Ok(classification) => {
                    debug!(endpoint = %endpoint, idx, url = %url, "Classifier answered");
                    return Some(classification);
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, idx, error = %e, "Classifier endpoint failed");
                }
            }
        }

        warn!(
            attempted = self.endpoints.len(),
            url = %url,
            "{}",
            Error::service_unreachable(self.endpoints.len())
        );
        None
    }

    fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
