//! Repository Example
//!
//! Puts a TTL caching proxy in front of a slow repository.
//!
//! Flow:
//! - First call misses and waits for the repository (~2s)
//! - Second call hits the cached value immediately
//! - After sleeping past the TTL the value has expired and is fetched again
//!
//! Run:
//!   cargo run -p ttlproxy-demos --example repository
//!   cargo run -p ttlproxy-demos --example repository -- proxy.yaml
//!
//! The optional argument is a YAML file, for example:
//!
//! ```yaml
//! ttl: 10s
//! expiry: Scheduled
//! write: LastWriteWins
//! ```

use std::convert::Infallible;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ttlproxy::prelude::*;

struct Repository;

#[async_trait]
impl DataProvider for Repository {
    type Value = String;
    type Error = Infallible;

    async fn get(&self) -> Result<String, Infallible> {
        tracing::info!("Repository called - fetching from database");
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(String::from("data from database"))
    }
}

async fn timed<P>(proxy: &CachingProxy<P>, label: &str)
where
    P: DataProvider<Value = String, Error = Infallible>,
{
    let started = Instant::now();
    let Ok(lookup) = proxy.get_with_status().await;
    tracing::info!(
        status = %lookup.status(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{label}: {}",
        lookup.value()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("info,ttlproxy=debug")
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ProxyConfig::from_yaml(&std::fs::read_to_string(path)?)?,
        None => ProxyConfig::new(Duration::from_secs(10)),
    };
    let proxy = CachingProxy::with_config(Repository, config);
    let ttl = proxy.ttl().as_duration();

    timed(&proxy, "first call").await;
    timed(&proxy, "second call").await;

    tracing::info!(sleep_s = ttl.as_secs() + 1, "waiting for the entry to expire");
    tokio::time::sleep(ttl + Duration::from_secs(1)).await;

    timed(&proxy, "after expiry").await;
    tracing::info!(stats = ?proxy.stats(), "done");

    Ok(())
}
