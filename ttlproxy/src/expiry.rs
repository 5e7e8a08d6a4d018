//! Background scheduling of cache invalidations.
//!
//! Used by [`ExpiryMode::Scheduled`](crate::ExpiryMode::Scheduled): every
//! population spawns one tokio task that sleeps for the TTL and then runs the
//! invalidation action. Tasks are tracked by the generation they were scheduled
//! for so they can be counted, cancelled and awaited.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use ttlproxy::expiry::ExpiryScheduler;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let scheduler = ExpiryScheduler::new();
//! scheduler.schedule(1, Duration::from_secs(10), || println!("expired"));
//! assert_eq!(scheduler.pending(), 1);
//!
//! scheduler.wait_all().await;
//! assert_eq!(scheduler.pending(), 0);
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug_span, trace, warn};

use crate::metrics;

/// Internal state shared across clones.
#[derive(Debug, Default)]
struct ExpirySchedulerInner {
    tasks: DashMap<u64, JoinHandle<()>>,
}

/// Spawns and tracks delayed invalidation tasks.
///
/// Clones share the same set of tasks.
#[derive(Clone, Debug, Default)]
pub struct ExpiryScheduler {
    inner: Arc<ExpirySchedulerInner>,
}

impl ExpiryScheduler {
    /// Create a scheduler with no pending tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `invalidate` once `delay` has elapsed, in the background.
    ///
    /// Returns `false` when called outside a tokio runtime. Nothing is
    /// scheduled in that case; expired values are still rejected on read.
    pub fn schedule<F>(&self, generation: u64, delay: Duration, invalidate: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!(generation, "no tokio runtime, expiry task not scheduled");
            return false;
        };

        self.cleanup_finished();

        let inner = Arc::clone(&self.inner);
        let span = debug_span!("ttlproxy.expiry", generation, delay_ms = delay.as_millis() as u64);
        // The entry guard blocks the task's own `remove` until its handle is stored.
        let entry = self.inner.tasks.entry(generation);
        let handle = runtime.spawn(
            async move {
                tokio::time::sleep(delay).await;
                invalidate();
                inner.tasks.remove(&generation);
                trace!("expiry task finished");
            }
            .instrument(span),
        );
        entry.insert(handle);
        metrics::record_expiry_scheduled();
        true
    }

    /// Number of scheduled tasks that have not fired yet.
    pub fn pending(&self) -> usize {
        self.inner
            .tasks
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Whether a task for `generation` is still waiting to fire.
    pub fn is_pending(&self, generation: u64) -> bool {
        self.inner
            .tasks
            .get(&generation)
            .is_some_and(|task| !task.is_finished())
    }

    /// Abort every pending task.
    pub fn cancel_all(&self) {
        self.inner.tasks.retain(|_, task| {
            task.abort();
            false
        });
    }

    /// Abort pending tasks scheduled for `generation` or any older one.
    ///
    /// Tasks of newer generations keep running.
    pub fn cancel_through(&self, generation: u64) {
        self.inner.tasks.retain(|scheduled, task| {
            if *scheduled > generation {
                return true;
            }
            task.abort();
            false
        });
    }

    /// Wait until every tracked task has fired or been cancelled.
    ///
    /// A panic inside an invalidation action is resumed on the caller.
    pub async fn wait_all(&self) {
        loop {
            let Some(generation) = self.inner.tasks.iter().next().map(|task| *task.key()) else {
                break;
            };
            if let Some((_, handle)) = self.inner.tasks.remove(&generation)
                && let Err(err) = handle.await
                && err.is_panic()
            {
                std::panic::resume_unwind(err.into_panic());
            }
        }
    }

    fn cleanup_finished(&self) {
        self.inner.tasks.retain(|_, task| !task.is_finished());
    }
}
