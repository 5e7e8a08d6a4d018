//! The data provider capability.
//!
//! [`DataProvider`] is the contract consumed *and* exposed by the caching proxy.
//! Anything that can produce the authoritative value for the single implicit
//! key implements it, and so does the proxy wrapping it, which is what makes a
//! proxy a drop-in substitute for the provider.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

/// Source of the authoritative value for a single implicit key.
///
/// `get` suspends the calling task until the value is available. Failures are
/// reported through [`DataProvider::Error`] and must never panic.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use ttlproxy_core::DataProvider;
///
/// struct Database;
///
/// #[async_trait::async_trait]
/// impl DataProvider for Database {
///     type Value = String;
///     type Error = Infallible;
///
///     async fn get(&self) -> Result<Self::Value, Self::Error> {
///         Ok("data from database".to_owned())
///     }
/// }
/// ```
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// The value produced by the provider.
    type Value: Clone + Send + Sync + 'static;

    /// The failure produced by the provider.
    type Error: Send;

    /// Fetch the current value.
    async fn get(&self) -> Result<Self::Value, Self::Error>;
}

#[async_trait]
impl<P> DataProvider for &P
where
    P: DataProvider + ?Sized,
{
    type Value = P::Value;
    type Error = P::Error;

    async fn get(&self) -> Result<Self::Value, Self::Error> {
        (**self).get().await
    }
}

#[async_trait]
impl<P> DataProvider for Arc<P>
where
    P: DataProvider + ?Sized,
{
    type Value = P::Value;
    type Error = P::Error;

    async fn get(&self) -> Result<Self::Value, Self::Error> {
        self.as_ref().get().await
    }
}

#[async_trait]
impl<P> DataProvider for Box<P>
where
    P: DataProvider + ?Sized,
{
    type Value = P::Value;
    type Error = P::Error;

    async fn get(&self) -> Result<Self::Value, Self::Error> {
        self.as_ref().get().await
    }
}

/// Adapter turning an async closure into a [`DataProvider`].
///
/// ```rust
/// use std::convert::Infallible;
/// use ttlproxy_core::{DataProvider, provider_fn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = provider_fn(|| async { Ok::<_, Infallible>(42u32) });
/// assert_eq!(provider.get().await, Ok(42));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FnProvider<F> {
    f: F,
}

/// Creates a [`FnProvider`] from a closure returning a future.
pub fn provider_fn<F, Fut, V, E>(f: F) -> FnProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, E>> + Send,
    V: Clone + Send + Sync + 'static,
    E: Send,
{
    FnProvider { f }
}

#[async_trait]
impl<F, Fut, V, E> DataProvider for FnProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, E>> + Send,
    V: Clone + Send + Sync + 'static,
    E: Send,
{
    type Value = V;
    type Error = E;

    async fn get(&self) -> Result<Self::Value, Self::Error> {
        (self.f)().await
    }
}
