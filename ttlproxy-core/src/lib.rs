#![warn(missing_docs)]
//! # ttlproxy-core
//!
//! Core traits and types for the ttlproxy single-entry caching proxy.
//!
//! This crate defines the capability contract shared by data providers and
//! the proxy that wraps them:
//!
//! - **Fetch** the authoritative value ([`DataProvider`])
//! - **Report** how a value was served ([`CacheStatus`], [`Lookup`])
//!
//! Implement [`DataProvider`] for your slow data source, then wrap it in
//! `ttlproxy::CachingProxy`. The proxy implements [`DataProvider`] too, so
//! callers never need to know which one they hold.

pub mod provider;
pub mod status;

pub use provider::{DataProvider, FnProvider, provider_fn};
pub use status::{CacheStatus, Lookup};
