//! Builders wiring limiters with production defaults.
//!
//! The application-layer limiters take their storage and clock by explicit
//! injection. These builders assemble the common production shape (sharded
//! DashMap storage, system clock) while still allowing a custom clock for
//! deterministic tests.

use crate::application::limiter::SlidingWindowLimiter;
use crate::application::ports::Clock;
use crate::application::tiered::TieredLimiter;
use crate::domain::{
    config::{ConfigError, LimiterConfig},
    window::ClientWindow,
};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::storage::ShardedStorage;
use std::sync::Arc;
use std::time::Duration;

/// The storage shape the builders assemble.
pub type ClientWindowStorage = ShardedStorage<String, ClientWindow>;

/// Builder for a [`SlidingWindowLimiter`] with default infrastructure.
///
/// # Examples
///
/// ```
/// use request_throttle::LimiterBuilder;
/// use std::time::Duration;
///
/// let limiter = LimiterBuilder::new(100, Duration::from_secs(60))
///     .build()
///     .unwrap();
///
/// assert!(limiter.allow_request("10.0.0.1"));
/// ```
pub struct LimiterBuilder {
    max_requests: usize,
    window: Duration,
    clock: Option<Arc<dyn Clock>>,
}

impl LimiterBuilder {
    /// Start building a limiter admitting `max_requests` per `window`.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clock: None,
        }
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Assemble the limiter.
    ///
    /// # Errors
    /// Returns `ConfigError` if `max_requests` or `window` is zero.
    pub fn build(self) -> Result<SlidingWindowLimiter<ClientWindowStorage>, ConfigError> {
        let config = LimiterConfig::new(self.max_requests, self.window)?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        Ok(SlidingWindowLimiter::new(
            ShardedStorage::new(),
            clock,
            config,
        ))
    }
}

/// Builder for a [`TieredLimiter`] with default infrastructure.
///
/// Tiers can be declared up front; further tiers can be registered on the
/// built limiter at any time.
///
/// # Examples
///
/// ```
/// use request_throttle::TieredLimiterBuilder;
/// use std::time::Duration;
///
/// let limiter = TieredLimiterBuilder::new()
///     .with_tier("free", 10, Duration::from_secs(60))
///     .with_tier("premium", 1000, Duration::from_secs(60))
///     .build()
///     .unwrap();
///
/// limiter.set_client_tier("10.0.0.1", "premium").unwrap();
/// assert!(limiter.allow_request("10.0.0.1"));
/// ```
#[derive(Default)]
pub struct TieredLimiterBuilder {
    tiers: Vec<(String, usize, Duration)>,
    clock: Option<Arc<dyn Clock>>,
}

impl TieredLimiterBuilder {
    /// Start building an empty tiered limiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a tier to register at build time.
    pub fn with_tier(mut self, name: &str, max_requests: usize, window: Duration) -> Self {
        self.tiers.push((name.to_string(), max_requests, window));
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Assemble the tiered limiter and register the declared tiers.
    ///
    /// # Errors
    /// Returns `ConfigError` if any declared tier's policy is invalid.
    pub fn build(self) -> Result<TieredLimiter<ClientWindowStorage>, ConfigError> {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        let limiter = TieredLimiter::new(clock);
        for (name, max_requests, window) in self.tiers {
            let config = LimiterConfig::new(max_requests, window)?;
            limiter.add_tier(&name, config);
        }
        Ok(limiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockClock;
    use std::time::Instant;

    #[test]
    fn test_builder_defaults() {
        let limiter = LimiterBuilder::new(5, Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(limiter.config().max_requests(), 5);
        assert_eq!(limiter.config().window(), Duration::from_secs(60));
        assert!(limiter.allow_request("c"));
    }

    #[test]
    fn test_builder_rejects_invalid_policy() {
        assert_eq!(
            LimiterBuilder::new(0, Duration::from_secs(60))
                .build()
                .unwrap_err(),
            ConfigError::ZeroMaxRequests
        );
        assert_eq!(
            LimiterBuilder::new(5, Duration::ZERO).build().unwrap_err(),
            ConfigError::ZeroWindow
        );
    }

    #[test]
    fn test_builder_custom_clock() {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let limiter = LimiterBuilder::new(1, Duration::from_secs(10))
            .with_clock(clock.clone())
            .build()
            .unwrap();

        assert!(limiter.allow_request("c"));
        assert!(!limiter.allow_request("c"));

        clock.advance(Duration::from_secs(10));
        assert!(limiter.allow_request("c"));
    }

    #[test]
    fn test_tiered_builder_registers_tiers() {
        let limiter = TieredLimiterBuilder::new()
            .with_tier("free", 2, Duration::from_secs(60))
            .with_tier("premium", 10, Duration::from_secs(60))
            .build()
            .unwrap();

        let mut names = limiter.tier_names();
        names.sort();
        assert_eq!(names, vec!["free".to_string(), "premium".to_string()]);
    }

    #[test]
    fn test_tiered_builder_invalid_tier_fails() {
        let err = TieredLimiterBuilder::new()
            .with_tier("broken", 0, Duration::from_secs(60))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroMaxRequests);
    }
}
