//! Per-client sliding log of admission timestamps.
//!
//! A `ClientWindow` records when a client's requests were admitted and
//! answers the core admission question: how many admissions fall within the
//! trailing window ending now?

use crate::domain::config::LimiterConfig;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding log of admission timestamps for a single client.
///
/// Timestamps are appended at the tail and expired from the head, so the
/// sequence is always ascending. An entry is stale once its age reaches the
/// window length; `trim` removes stale entries and everything it retains is
/// strictly younger than the window.
///
/// Because admissions are only recorded while the post-trim count is below
/// `max_requests`, the log never holds more than `max_requests` entries.
#[derive(Debug, Clone, Default)]
pub struct ClientWindow {
    timestamps: VecDeque<Instant>,
}

impl ClientWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self {
            timestamps: VecDeque::new(),
        }
    }

    /// Remove timestamps that have aged out of the window.
    pub fn trim(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Trim, then admit the request if the window has capacity left.
    ///
    /// This is the whole admission transaction: stale entries are expired,
    /// the count is checked against the policy, and `now` is recorded only
    /// when the request is admitted. A rejected request leaves no trace.
    pub fn try_admit(&mut self, now: Instant, config: &LimiterConfig) -> bool {
        self.trim(now, config.window());

        if self.timestamps.len() >= config.max_requests() {
            false
        } else {
            self.timestamps.push_back(now);
            true
        }
    }

    /// Number of recorded admissions (stale entries included until trimmed).
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the log holds no admissions.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The oldest recorded admission, if any.
    pub fn oldest(&self) -> Option<Instant> {
        self.timestamps.front().copied()
    }

    /// Count entries still inside the window without mutating the log.
    ///
    /// Used by read-only aggregates that must not prune state. Counts from
    /// the tail since the sequence is ascending.
    pub fn fresh_len(&self, now: Instant, window: Duration) -> usize {
        self.timestamps
            .iter()
            .rev()
            .take_while(|&&ts| now.saturating_duration_since(ts) < window)
            .count()
    }
}
