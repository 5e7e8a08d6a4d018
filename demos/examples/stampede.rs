//! Stampede Example
//!
//! Fires several concurrent callers at an empty proxy. No lock is held while
//! the provider runs, so every concurrent miss reaches the provider. The write
//! policy decides which of the fetched values ends up cached.
//!
//! Run:
//!   cargo run -p ttlproxy-demos --example stampede

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ttlproxy::prelude::*;

const CALLERS: usize = 8;

async fn run(write: WritePolicy) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let provider = provider_fn(move || {
        let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            // Later calls finish first, so the two policies disagree.
            let delay = 400u64.saturating_sub(40 * call as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, std::convert::Infallible>(format!("value-{call}"))
        }
    });

    let proxy = Arc::new(
        CachingProxy::builder(provider)
            .ttl(Duration::from_secs(30))
            .expiry(ExpiryMode::Scheduled)
            .write_policy(write)
            .build(),
    );

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let proxy = Arc::clone(&proxy);
            tokio::spawn(async move { proxy.get().await })
        })
        .collect();

    let mut seen = Vec::with_capacity(CALLERS);
    for handle in handles {
        if let Ok(Ok(value)) = handle.await {
            seen.push(value);
        }
    }

    let Ok(cached) = proxy.get().await;
    tracing::info!(
        ?write,
        provider_calls = calls.load(Ordering::SeqCst),
        ?seen,
        %cached,
        pending_expirations = proxy.pending_expirations(),
        "stampede finished"
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info,ttlproxy=debug")
        .init();

    run(WritePolicy::LastWriteWins).await;
    run(WritePolicy::FirstWriteWins).await;
}
