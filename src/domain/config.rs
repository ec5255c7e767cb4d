//! Admission policy configuration.

use std::time::Duration;

/// Error returned when limiter configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_requests` must be greater than zero
    ZeroMaxRequests,
    /// The window duration must be greater than zero
    ZeroWindow,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroMaxRequests => {
                write!(f, "max_requests must be greater than 0")
            }
            ConfigError::ZeroWindow => {
                write!(f, "window duration must be greater than 0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable admission policy for one limiter: at most `max_requests`
/// admissions within any trailing `window`-length interval.
///
/// Set once at construction and validated there; a limiter's policy never
/// changes afterward. The fields are private so an unvalidated policy
/// cannot be assembled by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterConfig {
    max_requests: usize,
    window: Duration,
}

impl LimiterConfig {
    /// Create a validated policy.
    ///
    /// # Errors
    /// Returns `ConfigError::ZeroMaxRequests` if `max_requests` is zero and
    /// `ConfigError::ZeroWindow` if `window` is zero.
    pub fn new(max_requests: usize, window: Duration) -> Result<Self, ConfigError> {
        if max_requests == 0 {
            return Err(ConfigError::ZeroMaxRequests);
        }
        if window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(Self {
            max_requests,
            window,
        })
    }

    /// Maximum admissions within the window.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Length of the trailing window.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for LimiterConfig {
    /// The fallback policy applied to clients with no tier assignment:
    /// 60 requests per 60 seconds.
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
        }
    }
}
