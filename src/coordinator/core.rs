//! Coordinator state and scan flow.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::browser::{TabEvent, TabHost};
use crate::classify::{SearchEngine, is_scannable_scheme};
use crate::config::ScannerConfig;
use crate::error::{Error, Result};
use crate::identifiers::TabId;
use crate::protocol::{PopupReply, PopupRequest};
use crate::scan::{Badge, ScanCache, ScanOutcome};
use crate::service::RiskService;

use super::{AutoBlockPolicy, ScanRequest};

// ============================================================================
// Coordinator
// ============================================================================

/// Tab scan coordinator for one browser session.
///
/// Owns the session's [`ScanCache`]. Every scan resolves to exactly one
/// [`ScanOutcome`], which is cached under the tab ID captured when the scan
/// started and then shown on the badge, unless the tab closed meanwhile.
pub struct Coordinator {
    /// Remote classifier.
    service: Arc<dyn RiskService>,
    /// Browser collaborator.
    host: Arc<dyn TabHost>,
    /// Latest outcome per tab.
    cache: ScanCache,
    /// Redirect rule.
    policy: AutoBlockPolicy,
    /// Warning page for blocked tabs.
    block_page: String,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("cached", &self.cache.len())
            .field("policy", &self.policy)
            .field("block_page", &self.block_page)
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    /// Creates a coordinator with an empty cache.
    #[must_use]
    pub fn new(
        config: &ScannerConfig,
        service: Arc<dyn RiskService>,
        host: Arc<dyn TabHost>,
    ) -> Self {
        Self {
            service,
            host,
            cache: ScanCache::new(),
            policy: AutoBlockPolicy::from_config(&config.auto_block),
            block_page: config.block_page.clone(),
        }
    }

    /// Returns the session cache.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// Returns the auto-block policy.
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &AutoBlockPolicy {
        &self.policy
    }
}

// ============================================================================
// Coordinator - Scanning
// ============================================================================

impl Coordinator {
    /// Scans `url` on behalf of `tab_id`.
    ///
    /// Never fails: unsupported schemes, exempt pages and an unreachable
    /// classifier all resolve to an outcome that is cached and shown.
    pub async fn scan_url_for_tab(&self, url: &str, tab_id: TabId) -> ScanOutcome {
        self.scan(ScanRequest::new(url, tab_id)).await
    }

    /// Runs one scan request to completion.
    ///
    /// If the tab is closed (or the session ends) while the classifier is
    /// being asked, the outcome is returned but not cached, and no badge or
    /// redirect is sent.
    pub async fn scan(&self, request: ScanRequest) -> ScanOutcome {
        let ScanRequest { url, tab_id } = request;
        let ticket = self.cache.begin(tab_id);
        let outcome = self.evaluate(&url).await;

        if !ticket.commit(outcome.clone()) {
            debug!(%tab_id, url = %url, "Tab closed during scan; outcome dropped");
            return outcome;
        }
        drop(ticket);

        if let Err(e) = self.host.set_badge(tab_id, &Badge::for_outcome(&outcome)).await {
            warn!(%tab_id, error = %e, "Failed to set badge");
        }

        if self.policy.should_block(&outcome) {
            info!(
                %tab_id,
                url = %url,
                risk = ?outcome.risk_percent,
                label = outcome.label(),
                "Blocking tab"
            );
            if let Err(e) = self.host.redirect(tab_id, &self.block_page).await {
                warn!(%tab_id, error = %e, "Failed to redirect blocked tab");
            }
        }

        outcome
    }

    /// Decides the outcome for `url` without touching the cache or host.
    async fn evaluate(&self, url: &str) -> ScanOutcome {
        if !is_scannable_scheme(url) {
            debug!(url = %url, "Skipping unsupported scheme");
            return ScanOutcome::unsupported_scheme(url);
        }

        if let Some(engine) = SearchEngine::detect(url) {
            debug!(url = %url, %engine, "Search results page exempt");
            return ScanOutcome::exempt(url);
        }

        match self.service.classify(url).await {
            Some(classification) => {
                let outcome = ScanOutcome::classified(url, classification);
                debug!(
                    url = %url,
                    risk = ?outcome.risk_percent,
                    label = outcome.label(),
                    "Classified"
                );
                outcome
            }
            None => ScanOutcome::unreachable(url, self.service.endpoint_count()),
        }
    }

    /// Scans whatever tab is currently active.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveTab`] if there is no active tab or it has no URL
    /// - Any host error from the active-tab lookup
    pub async fn scan_active_tab(&self) -> Result<ScanOutcome> {
        let tab = self.host.active_tab().await?.ok_or(Error::NoActiveTab)?;
        let url = tab.url().ok_or(Error::NoActiveTab)?;

        Ok(self.scan_url_for_tab(url, tab.id).await)
    }

    /// Returns the cached outcome of the active tab, if any.
    ///
    /// Host failures read as "nothing cached".
    pub async fn cached_result_for_active_tab(&self) -> Option<ScanOutcome> {
        match self.host.active_tab().await {
            Ok(tab) => self.cache.get(tab?.id),
            Err(e) => {
                warn!(error = %e, "Active tab lookup failed");
                None
            }
        }
    }
}

// ============================================================================
// Coordinator - Events
// ============================================================================

impl Coordinator {
    /// Reacts to a tab lifecycle event.
    pub async fn handle_tab_event(&self, event: TabEvent) {
        if let Some((tab_id, url)) = event.completed_navigation() {
            self.scan_url_for_tab(url, tab_id).await;
            return;
        }

        match event {
            TabEvent::Activated { tab_id } => {
                debug!(?tab_id, "Tab activated");
                if let Err(e) = self.scan_active_tab().await {
                    if matches!(e, Error::NoActiveTab) {
                        debug!("Activated tab has nothing to scan");
                    } else {
                        warn!(error = %e, "Scan of activated tab failed");
                    }
                }
            }
            TabEvent::Removed { tab_id } => {
                self.cache.remove(tab_id);
            }
            TabEvent::Updated { .. } => {}
        }
    }

    /// Answers a popup request. Always produces a reply.
    pub async fn handle_request(&self, request: PopupRequest) -> PopupReply {
        match request {
            PopupRequest::Scan => match self.scan_active_tab().await {
                Ok(outcome) => PopupReply::Outcome(outcome),
                Err(e) => {
                    debug!(error = %e, "Popup scan failed");
                    PopupReply::from_error(&e)
                }
            },
            PopupRequest::GetResult => self
                .cached_result_for_active_tab()
                .await
                .map_or(PopupReply::Empty, PopupReply::Outcome),
            PopupRequest::Unknown(kind) => {
                debug!(kind = %kind, "Unknown popup message");
                PopupReply::unknown_type()
            }
        }
    }

    /// Drops every cached outcome at the end of a browser session.
    pub fn end_session(&self) {
        let dropped = self.cache.len();
        self.cache.clear();
        info!(dropped, "Session ended");
    }
}

// ============================================================================
// Tests
// ============================================================================
