//! # request-throttle
//!
//! Per-client sliding-window admission control for request-handling
//! pipelines, with an optional multi-tier policy layer.
//!
//! The limiter sits in front of your request pipeline and decides, for each
//! inbound request, whether it may proceed. Decisions use a sliding log of
//! admission timestamps per client: the effective rate is exactly
//! `max_requests` per any `window`-length interval, with none of the
//! boundary-reset burst artifacts of fixed buckets.
//!
//! ## Quick Start
//!
//! ```rust
//! use request_throttle::LimiterBuilder;
//! use std::time::Duration;
//!
//! // 100 requests per minute per client
//! let limiter = LimiterBuilder::new(100, Duration::from_secs(60))
//!     .build()
//!     .expect("valid policy");
//!
//! if limiter.allow_request("203.0.113.7") {
//!     // hand the request to the pipeline
//! } else {
//!     // surface a rate-limit rejection (e.g. HTTP 429)
//! }
//! ```
//!
//! The client identifier is an opaque string - typically a network source
//! address, but the limiter never inspects it.
//!
//! ## Tiered Policies
//!
//! Route clients to named policies with [`TieredLimiter`]. Clients with no
//! assignment fall back to the `"default"` tier (60 requests per 60
//! seconds), materialized on first contact:
//!
//! ```rust
//! use request_throttle::TieredLimiterBuilder;
//! use std::time::Duration;
//!
//! let limiter = TieredLimiterBuilder::new()
//!     .with_tier("free", 10, Duration::from_secs(60))
//!     .with_tier("premium", 1_000, Duration::from_secs(60))
//!     .build()
//!     .expect("valid tiers");
//!
//! limiter.set_client_tier("203.0.113.7", "premium").expect("registered tier");
//! assert!(limiter.allow_request("203.0.113.7"));
//!
//! let status = limiter.get_client_status("203.0.113.7");
//! assert_eq!(status.tier, "premium");
//! assert_eq!(status.status.requests_used, 1);
//! ```
//!
//! Registering a tier again replaces its limiter wholesale, resetting
//! enforcement for that tier's clients - a deliberate operational semantic.
//!
//! ## Introspection
//!
//! Per-client status reads ([`SlidingWindowLimiter::get_client_status`],
//! [`SlidingWindowLimiter::get_all_clients_status`]) prune stale entries as
//! they count. The aggregate [`SlidingWindowLimiter::get_stats`] is the one
//! read-only exception: it computes freshness by age comparison without
//! pruning, so monitoring never mutates hot-path state. Admission counters
//! are available via [`SlidingWindowLimiter::metrics`].
//!
//! ## Memory Management
//!
//! A client's window never holds more than `max_requests` timestamps, but
//! the set of tracked clients grows with every distinct identifier seen.
//! Call [`SlidingWindowLimiter::cleanup_old_entries`] from a periodic timer
//! to drop clients whose windows have gone stale; the limiter does not
//! schedule this itself, and skipping it affects memory, never correctness.
//!
//! ## Concurrency
//!
//! All operations are synchronous, non-blocking, and safe to call from many
//! request-handling threads. The trim/check/record sequence of
//! [`SlidingWindowLimiter::allow_request`] runs in a single critical
//! section per client id, so concurrent requests from one client cannot
//! both slip under the limit; distinct clients proceed in parallel on
//! separate storage shards.
//!
//! ## Testing
//!
//! Deterministic time-based tests use the mock clock behind the
//! `test-helpers` feature:
//!
//! ```toml
//! [dev-dependencies]
//! request-throttle = { version = "*", features = ["test-helpers"] }
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    config::{ConfigError, LimiterConfig},
    status::{ClientStatus, LimiterStats, TieredStatus},
    window::ClientWindow,
};

pub use application::{
    limiter::SlidingWindowLimiter,
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Storage},
    tiered::{TierError, TieredLimiter, DEFAULT_TIER},
};

pub use infrastructure::{
    builder::{ClientWindowStorage, LimiterBuilder, TieredLimiterBuilder},
    clock::SystemClock,
    storage::ShardedStorage,
};

#[cfg(feature = "test-helpers")]
pub use infrastructure::mocks::MockClock;
