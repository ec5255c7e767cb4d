//! Tiered admission example.
//!
//! Registers two named tiers, assigns clients to them, and shows that each
//! tier enforces its own policy while unassigned clients fall back to the
//! default 60-per-minute tier.

use request_throttle::TieredLimiterBuilder;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "request_throttle=info".into()),
        )
        .init();

    let limiter = TieredLimiterBuilder::new()
        .with_tier("free", 3, Duration::from_secs(60))
        .with_tier("premium", 100, Duration::from_secs(60))
        .build()
        .expect("valid tiers");

    limiter.set_client_tier("198.51.100.2", "free").unwrap();
    limiter.set_client_tier("198.51.100.3", "premium").unwrap();

    println!("=== Tiered Admission Example ===\n");

    println!("Free-tier client (3/min) sending 5 requests:");
    for i in 1..=5 {
        let admitted = limiter.allow_request("198.51.100.2");
        println!("  request {} -> {}", i, if admitted { "admitted" } else { "rejected" });
    }

    println!("\nPremium client (100/min) sending 5 requests:");
    for i in 1..=5 {
        let admitted = limiter.allow_request("198.51.100.3");
        println!("  request {} -> {}", i, if admitted { "admitted" } else { "rejected" });
    }

    println!("\nUnassigned client falls back to the default tier:");
    limiter.allow_request("203.0.113.99");
    let status = limiter.get_client_status("203.0.113.99");
    println!(
        "  tier: {}, used {}/{}",
        status.tier, status.status.requests_used, status.status.max_requests
    );

    println!("\nAssigning a client to an unknown tier fails:");
    match limiter.set_client_tier("198.51.100.2", "enterprise") {
        Ok(()) => println!("  unexpectedly succeeded"),
        Err(e) => println!("  error: {}", e),
    }
}
