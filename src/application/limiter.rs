//! Sliding-window admission decisions.
//!
//! The limiter tracks a sliding log of admission timestamps per client and
//! decides, for each request, whether it may proceed.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, Storage};
use crate::domain::{
    config::LimiterConfig,
    status::{ClientStatus, LimiterStats},
    window::ClientWindow,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-client sliding-window rate limiter.
///
/// Admission uses a sliding log: the effective rate is exactly
/// `max_requests` per any `window`-length interval, with no boundary-reset
/// burst artifact. State is keyed by an opaque client identifier and grows
/// with the number of distinct clients seen; [`cleanup_old_entries`] bounds
/// that growth for clients that go quiet.
///
/// The limiter is an explicitly constructed, owned object: callers inject
/// the storage, the clock, and the policy, and hold the limiter wherever the
/// request-handling layer needs it.
///
/// [`cleanup_old_entries`]: SlidingWindowLimiter::cleanup_old_entries
#[derive(Debug)]
pub struct SlidingWindowLimiter<S>
where
    S: Storage<String, ClientWindow>,
{
    storage: S,
    clock: Arc<dyn Clock>,
    config: LimiterConfig,
    metrics: Metrics,
}

impl<S> SlidingWindowLimiter<S>
where
    S: Storage<String, ClientWindow>,
{
    /// Create a new limiter from its parts.
    ///
    /// # Arguments
    /// * `storage` - Concurrent per-client window storage
    /// * `clock` - Time source (monotonic within the process)
    /// * `config` - The admission policy, validated at construction
    pub fn new(storage: S, clock: Arc<dyn Clock>, config: LimiterConfig) -> Self {
        Self {
            storage,
            clock,
            config,
            metrics: Metrics::new(),
        }
    }

    /// Decide whether a request from `client_id` may proceed.
    ///
    /// Expires stale admissions, checks the count against the policy, and
    /// records the request only when admitted. The whole sequence runs in a
    /// single critical section per client id, so concurrent requests from
    /// the same client cannot both slip under the limit.
    ///
    /// Returns `true` to admit, `false` to reject. Rejection is a normal
    /// outcome, not an error; surfacing it (e.g. as an HTTP 429) is the
    /// caller's concern.
    pub fn allow_request(&self, client_id: &str) -> bool {
        let now = self.clock.now();
        let admitted = self.storage.with_entry_mut(
            client_id.to_string(),
            ClientWindow::new,
            |window| window.try_admit(now, &self.config),
        );

        if admitted {
            self.metrics.record_admitted();
            debug!(client_id, "request admitted");
        } else {
            self.metrics.record_rejected();
            warn!(client_id, "rate limit exceeded");
        }

        admitted
    }

    /// Get the current status for one client.
    ///
    /// This is a trimming read: stale admissions are pruned before the
    /// counts are taken, even though nothing is recorded. An unseen client
    /// gets an empty window created, matching the lazy lifecycle of
    /// [`allow_request`](SlidingWindowLimiter::allow_request).
    pub fn get_client_status(&self, client_id: &str) -> ClientStatus {
        let now = self.clock.now();
        self.storage.with_entry_mut(
            client_id.to_string(),
            ClientWindow::new,
            |window| {
                window.trim(now, self.config.window());
                self.status_of(client_id, window)
            },
        )
    }

    /// Get the status of every tracked client.
    ///
    /// Trims each client's window as it goes. Includes clients whose windows
    /// are empty but not yet removed by cleanup; order is unspecified.
    pub fn get_all_clients_status(&self) -> Vec<ClientStatus> {
        let now = self.clock.now();
        let mut statuses = Vec::new();
        self.storage.retain(|client_id, window| {
            window.trim(now, self.config.window());
            statuses.push(self.status_of(client_id, window));
            true
        });
        statuses
    }

    /// Discard a client's entire tracked history.
    ///
    /// Returns whether the client was tracked beforehand. The next request
    /// from the client starts from a clean window.
    pub fn reset_client(&self, client_id: &str) -> bool {
        let was_tracked = self.storage.remove(client_id);
        if was_tracked {
            info!(client_id, "client rate limit reset");
        }
        was_tracked
    }

    /// Expire stale admissions for every client and drop clients whose
    /// windows emptied.
    ///
    /// This is the only path that removes a client as a consequence of
    /// staleness rather than an explicit reset. The limiter does not
    /// schedule this itself; invoke it from a periodic timer to bound
    /// memory for clients that stop sending requests. Skipping it affects
    /// memory, never correctness.
    pub fn cleanup_old_entries(&self) {
        let now = self.clock.now();
        let mut removed: u64 = 0;
        self.storage.retain(|_, window| {
            window.trim(now, self.config.window());
            if window.is_empty() {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.metrics.record_expired(removed);
        }
        debug!(removed, "cleaned up inactive clients");
    }

    /// Aggregate statistics over all tracked clients.
    ///
    /// This is a read-only snapshot: freshness is computed by comparing ages
    /// against the window, and nothing is pruned. It may therefore report
    /// entries that a trimming read (`get_client_status`, cleanup) would
    /// remove - a monitoring call must not mutate hot-path state.
    pub fn get_stats(&self) -> LimiterStats {
        let now = self.clock.now();
        let mut total_clients = 0;
        let mut active_clients = 0;
        let mut limited_clients = 0;
        let mut total_requests_tracked = 0;

        self.storage.for_each(|_, window| {
            total_clients += 1;
            total_requests_tracked += window.len();
            let fresh = window.fresh_len(now, self.config.window());
            if fresh > 0 {
                active_clients += 1;
                if fresh >= self.config.max_requests() {
                    limited_clients += 1;
                }
            }
        });

        LimiterStats {
            total_clients,
            active_clients,
            limited_clients,
            total_requests_tracked,
            max_requests: self.config.max_requests(),
            window: self.config.window(),
        }
    }

    /// The limiter's admission policy.
    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    /// Admission counters for this limiter.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Number of clients currently tracked, stale windows included.
    pub fn tracked_clients(&self) -> usize {
        self.storage.len()
    }

    fn status_of(&self, client_id: &str, window: &ClientWindow) -> ClientStatus {
        let used = window.len();
        ClientStatus {
            client_id: client_id.to_string(),
            requests_used: used,
            requests_remaining: self.config.max_requests().saturating_sub(used),
            max_requests: self.config.max_requests(),
            window: self.config.window(),
            reset_at: window.oldest().map(|oldest| oldest + self.config.window()),
            is_limited: used >= self.config.max_requests(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::ShardedStorage;
    use std::time::{Duration, Instant};

    fn limiter_with_clock(
        max_requests: usize,
        window_secs: u64,
        clock: Arc<dyn Clock>,
    ) -> SlidingWindowLimiter<ShardedStorage<String, ClientWindow>> {
        let config = LimiterConfig::new(max_requests, Duration::from_secs(window_secs)).unwrap();
        SlidingWindowLimiter::new(ShardedStorage::new(), clock, config)
    }

    #[test]
    fn test_admits_up_to_limit() {
        let limiter = limiter_with_clock(3, 60, Arc::new(SystemClock::new()));

        assert!(limiter.allow_request("10.0.0.1"));
        assert!(limiter.allow_request("10.0.0.1"));
        assert!(limiter.allow_request("10.0.0.1"));
        assert!(!limiter.allow_request("10.0.0.1"));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = limiter_with_clock(1, 60, Arc::new(SystemClock::new()));

        assert!(limiter.allow_request("10.0.0.1"));
        assert!(limiter.allow_request("10.0.0.2"));
        assert!(!limiter.allow_request("10.0.0.1"));
        assert!(!limiter.allow_request("10.0.0.2"));
    }

    #[test]
    fn test_window_slides_with_time() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(2, 10, clock.clone());

        assert!(limiter.allow_request("c"));
        clock.advance(Duration::from_secs(5));
        assert!(limiter.allow_request("c"));

        clock.advance(Duration::from_secs(4)); // t=9
        assert!(!limiter.allow_request("c"));

        clock.advance(Duration::from_secs(2)); // t=11, the t=0 entry aged out
        assert!(limiter.allow_request("c"));
    }

    #[test]
    fn test_status_reflects_usage() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(5, 60, clock.clone());

        limiter.allow_request("c");
        limiter.allow_request("c");

        let status = limiter.get_client_status("c");
        assert_eq!(status.client_id, "c");
        assert_eq!(status.requests_used, 2);
        assert_eq!(status.requests_remaining, 3);
        assert_eq!(status.max_requests, 5);
        assert_eq!(status.window, Duration::from_secs(60));
        assert!(!status.is_limited);
        assert_eq!(
            status.reset_at,
            Some(clock.now() + Duration::from_secs(60))
        );
    }

    #[test]
    fn test_status_read_is_idempotent() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(5, 60, clock);

        limiter.allow_request("c");

        let first = limiter.get_client_status("c");
        let second = limiter.get_client_status("c");
        assert_eq!(first, second);
    }

    #[test]
    fn test_status_for_unseen_client() {
        let limiter = limiter_with_clock(5, 60, Arc::new(SystemClock::new()));

        let status = limiter.get_client_status("nobody");
        assert_eq!(status.requests_used, 0);
        assert_eq!(status.requests_remaining, 5);
        assert_eq!(status.reset_at, None);
        assert!(!status.is_limited);

        // The read created an (empty) window, matching allow_request's
        // lazy lifecycle.
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_status_trims_stale_entries() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(2, 10, clock.clone());

        limiter.allow_request("c");
        limiter.allow_request("c");
        assert!(limiter.get_client_status("c").is_limited);

        clock.advance(Duration::from_secs(11));
        let status = limiter.get_client_status("c");
        assert_eq!(status.requests_used, 0);
        assert!(!status.is_limited);
    }

    #[test]
    fn test_all_clients_status() {
        let limiter = limiter_with_clock(5, 60, Arc::new(SystemClock::new()));

        limiter.allow_request("a");
        limiter.allow_request("a");
        limiter.allow_request("b");

        let mut statuses = limiter.get_all_clients_status();
        statuses.sort_by(|x, y| x.client_id.cmp(&y.client_id));

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].client_id, "a");
        assert_eq!(statuses[0].requests_used, 2);
        assert_eq!(statuses[1].client_id, "b");
        assert_eq!(statuses[1].requests_used, 1);
    }

    #[test]
    fn test_reset_client() {
        let limiter = limiter_with_clock(1, 60, Arc::new(SystemClock::new()));

        assert!(limiter.allow_request("c"));
        assert!(!limiter.allow_request("c"));

        assert!(limiter.reset_client("c"));
        assert!(limiter.allow_request("c"));
    }

    #[test]
    fn test_reset_unseen_client_returns_false() {
        let limiter = limiter_with_clock(1, 60, Arc::new(SystemClock::new()));
        assert!(!limiter.reset_client("nobody"));
    }

    #[test]
    fn test_cleanup_removes_idle_clients() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(5, 10, clock.clone());

        limiter.allow_request("a");
        limiter.allow_request("b");
        assert_eq!(limiter.tracked_clients(), 2);

        clock.advance(Duration::from_secs(11));
        limiter.cleanup_old_entries();

        assert_eq!(limiter.tracked_clients(), 0);
        assert_eq!(limiter.metrics().clients_expired(), 2);
    }

    #[test]
    fn test_cleanup_keeps_active_clients() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(5, 10, clock.clone());

        limiter.allow_request("old");
        clock.advance(Duration::from_secs(8));
        limiter.allow_request("fresh");

        clock.advance(Duration::from_secs(3)); // "old" at t=11, "fresh" at t=3
        limiter.cleanup_old_entries();

        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(limiter.get_client_status("fresh").requests_used, 1);
    }

    #[test]
    fn test_stats_snapshot_does_not_trim() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = limiter_with_clock(2, 10, clock.clone());

        limiter.allow_request("a");
        clock.advance(Duration::from_secs(11));

        // The stale entry is still counted by the read-only snapshot...
        let stats = limiter.get_stats();
        assert_eq!(stats.total_clients, 1);
        assert_eq!(stats.total_requests_tracked, 1);
        assert_eq!(stats.active_clients, 0);

        // ...until a trimming read prunes it.
        limiter.get_client_status("a");
        let stats = limiter.get_stats();
        assert_eq!(stats.total_requests_tracked, 0);
    }

    #[test]
    fn test_stats_counts_active_and_limited() {
        let limiter = limiter_with_clock(2, 60, Arc::new(SystemClock::new()));

        limiter.allow_request("busy");
        limiter.allow_request("busy");
        limiter.allow_request("calm");

        let stats = limiter.get_stats();
        assert_eq!(stats.total_clients, 2);
        assert_eq!(stats.active_clients, 2);
        assert_eq!(stats.limited_clients, 1);
        assert_eq!(stats.total_requests_tracked, 3);
        assert_eq!(stats.max_requests, 2);
        assert_eq!(stats.window, Duration::from_secs(60));
    }

    #[test]
    fn test_metrics_track_decisions() {
        let limiter = limiter_with_clock(2, 60, Arc::new(SystemClock::new()));

        limiter.allow_request("c");
        limiter.allow_request("c");
        limiter.allow_request("c");
        limiter.allow_request("c");

        let snapshot = limiter.metrics().snapshot();
        assert_eq!(snapshot.requests_admitted, 2);
        assert_eq!(snapshot.requests_rejected, 2);
        assert!((snapshot.rejection_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_concurrent_admission_bounded() {
        use std::thread;

        let limiter = Arc::new(limiter_with_clock(50, 60, Arc::new(SystemClock::new())));
        let mut handles = vec![];

        for _ in 0..10 {
            let limiter = Arc::clone(&limiter);
            handles.push(thread::spawn(move || {
                let mut admitted = 0;
                for _ in 0..20 {
                    if limiter.allow_request("shared") {
                        admitted += 1;
                    }
                }
                admitted
            }));
        }

        let total_admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        // 200 attempts against a limit of 50: exactly the limit gets through.
        assert_eq!(total_admitted, 50);
    }

    #[test]
    fn test_concurrent_distinct_clients() {
        use std::thread;

        let limiter = Arc::new(limiter_with_clock(20, 60, Arc::new(SystemClock::new())));
        let mut handles = vec![];

        for i in 0..8 {
            let limiter = Arc::clone(&limiter);
            handles.push(thread::spawn(move || {
                let client = format!("client-{}", i);
                for _ in 0..20 {
                    assert!(limiter.allow_request(&client));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(limiter.tracked_clients(), 8);
        assert_eq!(limiter.metrics().requests_rejected(), 0);
    }
}
