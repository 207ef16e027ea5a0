//! Retry Strategies Example
//!
//! Runs an always-failing source under each of the four retry strategies and
//! logs every attempt. Each producer makes one original attempt plus two
//! retries before surfacing the error.
//!
//! Run with: cargo run --example retry_strategies

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt};
use rxext::prelude::*;
use rxext::RetryEvent;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct ServiceError {
    code: i32,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "service error {}", self.code)
    }
}

impl std::error::Error for ServiceError {}

async fn run(name: &str, policy: RetryPolicy) {
    println!("\n=== {} ===", name);

    let subscriptions = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    let producer = retry_with_hooks(
        {
            let subscriptions = subscriptions.clone();
            move || {
                subscriptions.fetch_add(1, Ordering::SeqCst);
                stream::iter(vec![Err::<i32, _>(ServiceError { code: 1 })])
            }
        },
        policy,
        |event: &RetryEvent<'_, ServiceError>| match event.next_delay {
            Some(delay) => println!(
                "  attempt {} failed ({}), retrying in {:?}",
                event.attempt, event.error, delay
            ),
            None => println!("  attempt {} failed ({}), giving up", event.attempt, event.error),
        },
    );

    let items: Vec<Result<i32, ServiceError>> = producer.collect().await;
    println!(
        "  {} subscriptions, {:?} elapsed, result: {:?}",
        subscriptions.load(Ordering::SeqCst),
        start.elapsed(),
        items
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Retry Strategies");
    println!("================");

    // Resubscribe at once
    run("immediate", RetryPolicy::immediate(2)).await;

    // Wait a fixed time between attempts
    run("delayed", RetryPolicy::delayed(2, Duration::from_millis(300))).await;

    // Caller decides each wait
    run(
        "customTimerDelayed",
        RetryPolicy::custom_timer_delayed(2, |attempt| {
            Duration::from_millis(100 * u64::from(attempt))
        }),
    )
    .await;

    // 300ms, then 600ms
    let exponential = RetryPolicy::exponential_delayed(2, Duration::from_millis(300), 2.0);
    match exponential.validate() {
        Ok(()) => run("exponentialDelayed", exponential).await,
        Err(e) => tracing::error!("invalid policy: {}", e),
    }

    println!("\n=== All strategies completed! ===");
}
