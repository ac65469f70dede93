use crate::{Limiter, Policy};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// [`MultiLimiter`] enables key-based limiting, where each key has its own [`Limiter`].
///
/// This behavior is useful when you want to limit a set of keys independently, for example
/// a network client that throttles refreshes of each endpoint separately, or debounces saves
/// per document.
///
/// # Examples
///
/// ```
/// use rate_gate::{MultiLimiter, Policy};
/// use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let limiter = MultiLimiter::new(Policy::Throttle, Duration::from_secs(60));
///     static COUNT: AtomicUsize = AtomicUsize::new(0);
///
///     for endpoint in ["/feed", "/feed", "/profile", "/feed"] {
///         limiter
///             .run(endpoint, || {
///                 COUNT.fetch_add(1, SeqCst);
///             })
///             .await;
///     }
///
///     // One call per endpoint made it through
///     assert_eq!(COUNT.load(SeqCst), 2);
/// }
/// ```
pub struct MultiLimiter<K> {
    policy: Policy,

    /// The duration for each [`Limiter`] associated with a particular key
    duration: Duration,

    /// The key-specific [`Limiter`]s
    ///
    /// A shard is locked only while a key's [`Limiter`] is looked up or inserted. Limiters are
    /// shared out of the map so that no shard stays locked while work runs.
    limiters: dashmap::DashMap<K, Arc<Limiter>>,
}

impl<K: Eq + Hash + Clone + fmt::Debug> MultiLimiter<K> {
    /// Creates a new [`MultiLimiter`].
    pub fn new(policy: Policy, duration: Duration) -> Self {
        Self {
            policy,
            duration,
            limiters: dashmap::DashMap::new(),
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Submits work under `key`, creating the key's [`Limiter`] on first use.
    ///
    /// See [`Limiter::run`] for what happens to the work.
    pub async fn run<F>(&self, key: K, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let limiter = self
            .limiters
            .entry(key.clone())
            .or_insert_with(|| {
                debug!(?key, policy = %self.policy, "created limiter");
                Arc::new(Limiter::new(self.policy, self.duration))
            })
            .value()
            .clone();
        // The shard guard is gone by now, so work may submit to this limiter again.
        limiter.run(work).await
    }

    /// Drops the limiter for `key`, cancelling its pending debounced work. Returns whether the
    /// key was known.
    ///
    /// The next submission under `key` starts from a fresh [`Limiter`].
    pub fn remove(&self, key: &K) -> bool {
        match self.limiters.remove(key) {
            Some((key, limiter)) => {
                limiter.reset();
                debug!(?key, "removed limiter");
                true
            }
            None => false,
        }
    }

    /// Resets the limiter for `key`, if it exists.
    pub fn reset(&self, key: &K) {
        if let Some(limiter) = self.limiters.get(key) {
            limiter.reset();
        }
    }

    /// Resets every limiter.
    pub fn reset_all(&self) {
        for limiter in self.limiters.iter() {
            limiter.reset();
        }
    }

    /// Returns the number of keys seen so far.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

impl<K: Eq + Hash> fmt::Debug for MultiLimiter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiLimiter")
            .field("policy", &self.policy)
            .field("duration", &self.duration)
            .field("keys", &self.limiters.len())
            .finish()
    }
}
