//! Introspection snapshots for clients and limiters.

use std::time::{Duration, Instant};

/// Point-in-time rate limiting status for one client.
///
/// Produced by a trimming read, so the counts reflect only admissions inside
/// the current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientStatus {
    /// The client this snapshot describes
    pub client_id: String,
    /// Admissions inside the current window
    pub requests_used: usize,
    /// Admissions left before the client is limited
    pub requests_remaining: usize,
    /// The limiter's configured maximum
    pub max_requests: usize,
    /// The limiter's configured window
    pub window: Duration,
    /// When the oldest tracked admission ages out, or `None` if the client
    /// has no admissions recorded
    pub reset_at: Option<Instant>,
    /// Whether the client is currently at or over its limit
    pub is_limited: bool,
}

impl ClientStatus {
    /// Time until the oldest tracked admission ages out, measured from `now`.
    ///
    /// Returns `Duration::ZERO` if the reset instant has already passed and
    /// `None` if the client has no admissions recorded.
    pub fn reset_after(&self, now: Instant) -> Option<Duration> {
        self.reset_at.map(|at| at.saturating_duration_since(now))
    }
}

/// Client status augmented with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieredStatus {
    /// The tier whose policy governs this client
    pub tier: String,
    /// The client's status under that tier's limiter
    pub status: ClientStatus,
}

/// Aggregate view over every client a limiter tracks.
///
/// This is a read-only snapshot: staleness is computed by age comparison and
/// nothing is pruned, so totals may include entries that a trimming read
/// would remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterStats {
    /// Distinct clients tracked, active or not
    pub total_clients: usize,
    /// Clients with at least one admission still inside the window
    pub active_clients: usize,
    /// Active clients at or over the limit
    pub limited_clients: usize,
    /// Sum of all recorded admissions across clients, stale ones included
    pub total_requests_tracked: usize,
    /// The limiter's configured maximum
    pub max_requests: usize,
    /// The limiter's configured window
    pub window: Duration,
}
