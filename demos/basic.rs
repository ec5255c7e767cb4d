//! Basic example demonstrating sliding-window admission control.
//!
//! This example sets up a limiter that admits up to 3 requests per client
//! in any trailing 5-second window and shows how bursts are rejected.

use request_throttle::LimiterBuilder;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "request_throttle=debug".into()),
        )
        .init();

    let limiter = LimiterBuilder::new(3, Duration::from_secs(5))
        .build()
        .expect("valid policy");

    println!("=== Basic Admission Example ===\n");
    println!("Policy: 3 requests per 5 seconds per client\n");

    println!("A burst of 5 requests from one client:");
    for i in 1..=5 {
        let admitted = limiter.allow_request("203.0.113.7");
        println!("  request {} -> {}", i, if admitted { "admitted" } else { "rejected" });
    }

    let status = limiter.get_client_status("203.0.113.7");
    println!(
        "\nStatus: {}/{} used, limited: {}",
        status.requests_used, status.max_requests, status.is_limited
    );

    println!("\nWaiting for the window to slide...");
    std::thread::sleep(Duration::from_secs(5));

    println!("After 5 seconds:");
    let admitted = limiter.allow_request("203.0.113.7");
    println!("  request 6 -> {}", if admitted { "admitted" } else { "rejected" });

    let snapshot = limiter.metrics().snapshot();
    println!(
        "\nMetrics: {} admitted, {} rejected ({:.0}% rejection rate)",
        snapshot.requests_admitted,
        snapshot.requests_rejected,
        snapshot.rejection_rate() * 100.0
    );
}
