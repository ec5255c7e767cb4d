//! Periodic cleanup example.
//!
//! The limiter never removes idle clients on its own; an external timer is
//! expected to call `cleanup_old_entries`. This example runs the sweep from
//! a background thread and watches the tracked-client count fall once the
//! traffic stops.

use request_throttle::LimiterBuilder;
use std::sync::Arc;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "request_throttle=debug".into()),
        )
        .init();

    let limiter = Arc::new(
        LimiterBuilder::new(10, Duration::from_secs(2))
            .build()
            .expect("valid policy"),
    );

    // External scheduler: sweep once per second.
    let sweeper = Arc::clone(&limiter);
    std::thread::spawn(move || loop {
        std::thread::sleep(Duration::from_secs(1));
        sweeper.cleanup_old_entries();
    });

    println!("=== Cleanup Example ===\n");

    println!("Simulating traffic from 50 clients...");
    for i in 0..50 {
        limiter.allow_request(&format!("client-{}", i));
    }
    println!("Tracked clients: {}", limiter.get_stats().total_clients);

    println!("\nTraffic stops; watching the sweeps reclaim state:");
    for second in 1..=4 {
        std::thread::sleep(Duration::from_secs(1));
        let stats = limiter.get_stats();
        println!(
            "  after {}s: {} tracked, {} expired so far",
            second,
            stats.total_clients,
            limiter.metrics().clients_expired()
        );
    }
}
