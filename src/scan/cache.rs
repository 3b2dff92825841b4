//! Per-tab scan cache.
//!
//! # Contract
//!
//! - Keyed by [`TabId`]; each key holds only the latest outcome.
//! - Writes go through a [`ScanTicket`] taken when the scan starts. Closing
//!   the tab (or ending the session) voids every ticket outstanding for it,
//!   so a scan that resolves after its tab is gone never recreates the entry.
//! - Many readers: the popup's `getResult` queries.
//! - Lives as long as the browser session; cleared when it ends.
//!
//! The key space is bounded by the number of live tabs plus the tabs with a
//! scan in flight, so there is no eviction policy beyond tab removal.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::identifiers::TabId;

use super::ScanOutcome;

// ============================================================================
// Types
// ============================================================================

/// Bookkeeping for a tab with scans in flight.
#[derive(Debug, Default, Clone, Copy)]
struct InFlight {
    /// Tickets not yet dropped.
    tickets: usize,
    /// Bumped whenever the tab's entry is invalidated.
    epoch: u64,
}

#[derive(Debug, Default)]
struct Inner {
    /// Outcomes by tab.
    entries: FxHashMap<TabId, ScanOutcome>,
    /// Tabs with at least one outstanding ticket.
    in_flight: FxHashMap<TabId, InFlight>,
}

// ============================================================================
// ScanCache
// ============================================================================

/// Latest scan outcome per tab.
///
/// Locks are held only for the duration of a map operation, never across an
/// `.await`.
#[derive(Debug, Default)]
pub struct ScanCache {
    inner: RwLock<Inner>,
}

impl ScanCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached outcome for `tab_id`.
    #[must_use]
    pub fn get(&self, tab_id: TabId) -> Option<ScanOutcome> {
        self.inner.read().entries.get(&tab_id).cloned()
    }

    /// Registers a scan for `tab_id` that is about to start.
    ///
    /// The outcome is stored with [`ScanTicket::commit`] once known.
    #[must_use]
    pub fn begin(&self, tab_id: TabId) -> ScanTicket<'_> {
        let mut inner = self.inner.write();
        let in_flight = inner.in_flight.entry(tab_id).or_default();
        in_flight.tickets += 1;

        ScanTicket {
            cache: self,
            tab_id,
            epoch: in_flight.epoch,
        }
    }

    /// Drops the entry for a closed tab and voids its outstanding tickets.
    pub fn remove(&self, tab_id: TabId) -> Option<ScanOutcome> {
        let mut inner = self.inner.write();
        if let Some(in_flight) = inner.in_flight.get_mut(&tab_id) {
            in_flight.epoch += 1;
        }

        let removed = inner.entries.remove(&tab_id);
        if removed.is_some() {
            debug!(tab_id = %tab_id, "Evicted cached scan");
        }
        removed
    }

    /// Drops every entry and voids every outstanding ticket (session end).
    pub fn clear(&self) {
        let count = {
            let mut inner = self.inner.write();
            for in_flight in inner.in_flight.values_mut() {
                in_flight.epoch += 1;
            }
            let count = inner.entries.len();
            inner.entries.clear();
            count
        };
        debug!(count, "Scan cache cleared");
    }

    /// Returns the number of cached tabs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    fn release(&self, tab_id: TabId) {
        let mut inner = self.inner.write();
        if let Some(in_flight) = inner.in_flight.get_mut(&tab_id) {
            in_flight.tickets -= 1;
            if in_flight.tickets == 0 {
                inner.in_flight.remove(&tab_id);
            }
        }
    }
}

// ============================================================================
// ScanTicket
// ============================================================================

/// Write permit for one scan of one tab.
///
/// Dropping the ticket without committing leaves the cache untouched.
#[derive(Debug)]
pub struct ScanTicket<'a> {
    cache: &'a ScanCache,
    tab_id: TabId,
    epoch: u64,
}

impl ScanTicket<'_> {
    /// Stores `outcome` as the tab's latest, replacing any previous entry.
    ///
    /// Last write wins among live tickets. Returns `false` and stores
    /// nothing if the tab was closed or the session ended after the ticket
    /// was taken.
    pub fn commit(&self, outcome: ScanOutcome) -> bool {
        let mut inner = self.cache.inner.write();
        let current = inner.in_flight.get(&self.tab_id).map(|f| f.epoch);
        if current != Some(self.epoch) {
            return false;
        }

        if let Some(previous) = inner.entries.insert(self.tab_id, outcome) {
            debug!(tab_id = %self.tab_id, previous = ?previous.status, "Replaced cached outcome");
        }
        true
    }
}

impl Drop for ScanTicket<'_> {
    fn drop(&mut self) {
        self.cache.release(self.tab_id);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::service::Classification;

    fn tab(id: u32) -> TabId {
        TabId::new(id).expect("valid tab id")
    }

    fn store(cache: &ScanCache, tab_id: TabId, outcome: ScanOutcome) -> bool {
        cache.begin(tab_id).commit(outcome)
    }

    #[test]
    fn test_empty() {
        let cache = ScanCache::new();
        assert!(cache.is_empty());
        assert!(cache.get(tab(1)).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = ScanCache::new();
        let first = ScanOutcome::exempt("https://www.bing.com/search?q=a");
        let second =
            ScanOutcome::classified("https://example.com/", Classification::new(30.0, "safe"));

        assert!(store(&cache, tab(1), first));
        assert!(store(&cache, tab(1), second.clone()));
        assert_eq!(cache.get(tab(1)), Some(second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_tabs_are_isolated() {
        let cache = ScanCache::new();
        store(&cache, tab(1), ScanOutcome::exempt("https://duckduckgo.com/?q=a"));
        store(&cache, tab(2), ScanOutcome::unreachable("https://example.com/", 2));

        assert!(cache.get(tab(1)).is_some_and(|o| !o.is_error()));
        assert!(cache.get(tab(2)).is_some_and(|o| o.is_error()));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = ScanCache::new();
        store(&cache, tab(1), ScanOutcome::unsupported_scheme("about:blank"));
        store(&cache, tab(2), ScanOutcome::unsupported_scheme("about:blank"));

        assert!(cache.remove(tab(1)).is_some());
        assert!(cache.remove(tab(1)).is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_removal_voids_outstanding_ticket() {
        let cache = ScanCache::new();
        let ticket = cache.begin(tab(4));

        cache.remove(tab(4));

        assert!(!ticket.commit(ScanOutcome::exempt("https://www.google.com/search?q=a")));
        assert!(cache.get(tab(4)).is_none());
    }

    #[test]
    fn test_removal_only_voids_that_tab() {
        let cache = ScanCache::new();
        let closed = cache.begin(tab(1));
        let open = cache.begin(tab(2));

        cache.remove(tab(1));

        assert!(!closed.commit(ScanOutcome::unsupported_scheme("about:blank")));
        assert!(open.commit(ScanOutcome::unsupported_scheme("about:blank")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ticket_taken_after_removal_commits() {
        let cache = ScanCache::new();
        drop(cache.begin(tab(3)));
        cache.remove(tab(3));

        assert!(store(&cache, tab(3), ScanOutcome::unsupported_scheme("about:blank")));
        assert!(cache.get(tab(3)).is_some());
    }

    #[test]
    fn test_clear_voids_every_ticket() {
        let cache = ScanCache::new();
        let first = cache.begin(tab(1));
        let second = cache.begin(tab(2));

        cache.clear();

        assert!(!first.commit(ScanOutcome::unsupported_scheme("about:blank")));
        assert!(!second.commit(ScanOutcome::unsupported_scheme("about:blank")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_dropped_tickets_release_bookkeeping() {
        let cache = ScanCache::new();
        {
            let _a = cache.begin(tab(5));
            let _b = cache.begin(tab(5));
            assert_eq!(cache.inner.read().in_flight[&tab(5)].tickets, 2);
        }
        assert!(cache.inner.read().in_flight.is_empty());
    }
}
