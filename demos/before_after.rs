//! Before/After Example
//!
//! Each section runs the same transformation twice: once composed from plain
//! `futures` combinators ("before") and once with the dedicated operator
//! ("after"). Every event is logged through `.debug(label)`.
//!
//! Run with: RUST_LOG=debug cargo run --example before_after

use std::time::Duration;

use futures::future::ready;
use futures::{stream, StreamExt};
use rxext::prelude::*;
use tracing_subscriber::EnvFilter;

// ==================== Optionals ====================

async fn example_unwrap() {
    println!("\n=== unwrap ===");
    let source = || stream::iter(vec![Some(1), Some(2), None, Some(4), Some(5)]);

    // before
    source()
        .filter_map(|x| async move { x })
        .debug("unwrap/before")
        .for_each(|_| ready(()))
        .await;

    // after
    source()
        .unwrap()
        .debug("unwrap/after")
        .for_each(|_| ready(()))
        .await;
}

// ==================== Pairs ====================

async fn example_pairwise() {
    println!("\n=== pairwise ===");

    let equal: Vec<bool> = stream::iter(vec![true, false])
        .pairwise()
        .map(|(a, b)| a == b)
        .collect()
        .await;
    println!("pairs equal: {:?}", equal);
}

// ==================== Filtering ====================

async fn example_ignore() {
    println!("\n=== ignore ===");
    let source = || stream::iter(vec![-1, 1, 2, 3, 4, 5]);

    // before
    let before: Vec<i32> = source()
        .filter(|x| ready(*x != -1 && *x != 1))
        .debug("ignore/before")
        .collect()
        .await;

    // after
    let after: Vec<i32> = source().ignore([-1, 1]).debug("ignore/after").collect().await;

    println!("before: {:?}, after: {:?}", before, after);
}

async fn example_map_to_void() {
    println!("\n=== mapTo ===");

    // before
    let before: Vec<()> = stream::iter(vec![1]).map(|_| ()).collect().await;

    // after
    let after: Vec<()> = stream::iter(vec![1]).map_to(()).collect().await;

    println!("before: {:?}, after: {:?}", before, after);
}

async fn example_count() {
    println!("\n=== count ===");

    // before
    let mut count = 0;
    stream::iter(1..=5)
        .filter(|x| ready(x % 2 == 0))
        .for_each(|_| {
            count += 1;
            ready(())
        })
        .await;

    // after
    let after: Vec<usize> = stream::iter(1..=5)
        .count_where(|x| x % 2 == 0)
        .debug("count/after")
        .collect()
        .await;

    println!("before: {}, after: {:?}", count, after);
}

// ==================== Booleans ====================

async fn example_toggle() {
    println!("\n=== not ===");

    // before
    let before: Vec<bool> = stream::iter(vec![false]).map(|b| !b).collect().await;

    // after
    let after: Vec<bool> = stream::iter(vec![false]).not().collect().await;

    println!("before: {:?}, after: {:?}", before, after);
}

async fn example_and() {
    println!("\n=== and ===");

    // before
    let before = stream::iter(vec![true, false])
        .fold(true, |acc, b| ready(acc && b))
        .await;

    // after
    let after: Vec<bool> = stream::iter(vec![true, false])
        .and()
        .debug("and/after")
        .collect()
        .await;

    println!("before: {}, after: {:?}", before, after);
}

// ==================== Errors ====================

async fn example_catch_error_just_complete() {
    println!("\n=== catchErrorJustComplete ===");
    let failing = || stream::iter(vec![Err::<i32, _>("error")]);

    // before
    let before: Vec<i32> = failing()
        .take_while(|r| ready(r.is_ok()))
        .filter_map(|r| async move { r.ok() })
        .collect()
        .await;

    // after
    let after: Vec<i32> = failing()
        .catch_error_just_complete()
        .debug("catch/after")
        .collect()
        .await;

    println!("before: {:?}, after: {:?}", before, after);
}

// ==================== Filter + Map ====================

async fn example_filter_map() {
    println!("\n=== filterMap ===");

    // before
    let before: Vec<i32> = stream::iter(1..=6)
        .filter(|x| ready(x % 2 == 0))
        .map(|x| x + 10)
        .collect()
        .await;

    // after
    let after: Vec<i32> = stream::iter(1..=6)
        .filter_map_with(|x| {
            if x % 2 == 0 {
                FilterMap::Map(x + 10)
            } else {
                FilterMap::Ignore
            }
        })
        .collect()
        .await;

    println!("before: {:?}, after: {:?}", before, after);
}

// ==================== Callbacks ====================

fn some_asynchronous_service((name, id): (&'static str, i32), done: Completion<String>) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        done.complete(format!("hello {} #{}", name, id));
    });
}

async fn example_from_async() {
    println!("\n=== fromAsync ===");

    // Arguments go to the factory; the callback becomes the stream's value.
    let call = from_async(some_asynchronous_service);
    call(("jake", 0))
        .for_each(|greeting| {
            println!("{}", greeting);
            ready(())
        })
        .await;
}

// ==================== Partition ====================

async fn example_partition() {
    println!("\n=== partition ===");

    let (evens, odds) = partition(stream::iter(1..=5), |x| x % 2 == 0);
    let (evens, odds): (Vec<i32>, Vec<i32>) = futures::join!(
        evens.debug("evens").collect(),
        odds.debug("odds").collect()
    );

    println!("evens: {:?}, odds: {:?}", evens, odds);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    println!("Before/After Examples");
    println!("=====================");

    example_unwrap().await;
    example_pairwise().await;
    example_ignore().await;
    example_map_to_void().await;
    example_count().await;
    example_toggle().await;
    example_and().await;
    example_catch_error_just_complete().await;
    example_filter_map().await;
    example_from_async().await;
    example_partition().await;

    println!("\n=== All examples completed successfully! ===");
}
