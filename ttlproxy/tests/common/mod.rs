//! Shared helpers for integration tests.
#![allow(dead_code)]

pub mod provider;
pub mod tracing;

pub use provider::{CountingProvider, FlakyProvider, ProviderError, StaggeredProvider};
