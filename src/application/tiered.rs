//! Tiered admission: named policies routed per client.
//!
//! A tier is a named admission policy. Each tier owns its own
//! `SlidingWindowLimiter`; clients are routed to their assigned tier's
//! limiter, falling back to the `"default"` tier when unassigned.

use crate::application::limiter::SlidingWindowLimiter;
use crate::application::ports::{Clock, Storage};
use crate::domain::{
    config::LimiterConfig,
    status::{LimiterStats, TieredStatus},
    window::ClientWindow,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// The tier governing clients with no explicit assignment.
///
/// Materialized lazily on first use with [`LimiterConfig::default`]
/// (60 requests per 60 seconds) unless registered beforehand.
pub const DEFAULT_TIER: &str = "default";

/// Error returned by tier administration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierError {
    /// The named tier has not been registered
    UnknownTier(String),
}

impl std::fmt::Display for TierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierError::UnknownTier(name) => write!(f, "tier '{}' not found", name),
        }
    }
}

impl std::error::Error for TierError {}

/// Routes clients to named admission policies.
///
/// Each tier owns its limiter and its clients' window state exclusively;
/// nothing is shared across tiers, so reassigning a client abandons its
/// history in the old tier.
///
/// The tier registry and the client assignments are cold administrative
/// state guarded by coarse locks; per-request work takes only read locks
/// (except the one-time materialization of the default tier) and the hot
/// per-client path runs on the tier limiter's sharded storage.
#[derive(Debug)]
pub struct TieredLimiter<S>
where
    S: Storage<String, ClientWindow> + Default,
{
    tiers: RwLock<HashMap<String, SlidingWindowLimiter<S>>>,
    assignments: RwLock<HashMap<String, String>>,
    clock: Arc<dyn Clock>,
}

impl<S> TieredLimiter<S>
where
    S: Storage<String, ClientWindow> + Default,
{
    /// Create an empty tiered limiter. All tiers share the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tiers: RwLock::new(HashMap::new()),
            assignments: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Register a tier, creating or replacing its limiter with fresh state.
    ///
    /// Replacing an existing tier discards the accumulated window history of
    /// every client in that tier: enforcement restarts from zero under the
    /// new policy. Effects last only for the process lifetime.
    pub fn add_tier(&self, name: &str, config: LimiterConfig) {
        let limiter = SlidingWindowLimiter::new(S::default(), Arc::clone(&self.clock), config);
        self.tiers
            .write()
            .expect("tier registry lock poisoned")
            .insert(name.to_string(), limiter);
        info!(
            tier = name,
            max_requests = config.max_requests(),
            window_secs = config.window().as_secs_f64(),
            "tier registered"
        );
    }

    /// Assign a client to a registered tier.
    ///
    /// Overwrites any prior assignment. The client's window history does not
    /// move with it; enforcement in the new tier starts fresh.
    ///
    /// # Errors
    /// Returns `TierError::UnknownTier` if `name` was never registered; the
    /// assignment map is left untouched.
    pub fn set_client_tier(&self, client_id: &str, name: &str) -> Result<(), TierError> {
        let tiers = self.tiers.read().expect("tier registry lock poisoned");
        if !tiers.contains_key(name) {
            return Err(TierError::UnknownTier(name.to_string()));
        }
        drop(tiers);

        self.assignments
            .write()
            .expect("assignments lock poisoned")
            .insert(client_id.to_string(), name.to_string());
        info!(client_id, tier = name, "client assigned to tier");
        Ok(())
    }

    /// Decide whether a request from `client_id` may proceed under its
    /// tier's policy.
    pub fn allow_request(&self, client_id: &str) -> bool {
        let tier = self.resolve_tier(client_id);
        self.with_tier_limiter(&tier, |limiter| limiter.allow_request(client_id))
    }

    /// Get the client's status under its tier's policy, tagged with the
    /// resolved tier name.
    pub fn get_client_status(&self, client_id: &str) -> TieredStatus {
        let tier = self.resolve_tier(client_id);
        let status =
            self.with_tier_limiter(&tier, |limiter| limiter.get_client_status(client_id));
        TieredStatus { tier, status }
    }

    /// The tier a client is explicitly assigned to, if any.
    pub fn client_tier(&self, client_id: &str) -> Option<String> {
        self.assignments
            .read()
            .expect("assignments lock poisoned")
            .get(client_id)
            .cloned()
    }

    /// Names of all registered tiers, in no particular order.
    pub fn tier_names(&self) -> Vec<String> {
        self.tiers
            .read()
            .expect("tier registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Aggregate statistics for one registered tier.
    pub fn tier_stats(&self, name: &str) -> Result<LimiterStats, TierError> {
        let tiers = self.tiers.read().expect("tier registry lock poisoned");
        tiers
            .get(name)
            .map(|limiter| limiter.get_stats())
            .ok_or_else(|| TierError::UnknownTier(name.to_string()))
    }

    fn resolve_tier(&self, client_id: &str) -> String {
        self.assignments
            .read()
            .expect("assignments lock poisoned")
            .get(client_id)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TIER.to_string())
    }

    /// Run `f` against the named tier's limiter, materializing the tier
    /// with the fallback policy if it does not exist yet.
    ///
    /// Assigned tiers always exist (`set_client_tier` checks registration),
    /// so materialization only ever happens for the default tier.
    fn with_tier_limiter<R>(&self, tier: &str, f: impl FnOnce(&SlidingWindowLimiter<S>) -> R) -> R {
        {
            let tiers = self.tiers.read().expect("tier registry lock poisoned");
            if let Some(limiter) = tiers.get(tier) {
                return f(limiter);
            }
        }

        let mut tiers = self.tiers.write().expect("tier registry lock poisoned");
        let limiter = tiers.entry(tier.to_string()).or_insert_with(|| {
            info!(tier, "materializing tier with fallback policy");
            SlidingWindowLimiter::new(
                S::default(),
                Arc::clone(&self.clock),
                LimiterConfig::default(),
            )
        });
        f(limiter)
    }
}
