use crate::error::{Error, Result};
use crate::{Debouncer, Throttler};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a [`Limiter`] decides which submitted work runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Run at most once per duration, favoring the earliest call. Later calls in the window
    /// are dropped.
    Throttle,

    /// Run once calls stop arriving for the duration, favoring the latest call. Earlier calls
    /// in a burst are superseded.
    Debounce,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Throttle => f.write_str("throttle"),
            Policy::Debounce => f.write_str("debounce"),
        }
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("throttle") {
            Ok(Policy::Throttle)
        } else if s.eq_ignore_ascii_case("debounce") {
            Ok(Policy::Debounce)
        } else {
            Err(Error::UnknownPolicy(s.to_owned()))
        }
    }
}

/// [`Limiter`] is a tool which decides whether, and when, repeatedly submitted work runs.
///
/// * [`Policy::Throttle`]: work runs immediately if nothing ran during the last `duration`,
///   otherwise it is dropped.
/// * [`Policy::Debounce`]: work runs `duration` after its submission unless another submission
///   supersedes it first.
///
/// Dropped and superseded work is discarded silently. A zero duration lets every submission run
/// immediately under either policy.
///
/// # Examples
///
/// ```
/// use rate_gate::{Limiter, Policy};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let limiter = Limiter::new(Policy::Throttle, Duration::from_secs(1));
///     let greeting = Arc::new(Mutex::new(String::new()));
///
///     for part in ["h", "e", "l", "l", "o"] {
///         let greeting = greeting.clone();
///         limiter.run(move || greeting.lock().unwrap().push_str(part)).await;
///     }
///
///     // Only the first call made it through the window
///     assert_eq!(*greeting.lock().unwrap(), "h");
/// }
/// ```
#[derive(Debug)]
pub struct Limiter {
    policy: Policy,
    duration: Duration,
    engine: Engine,
}

#[derive(Debug)]
enum Engine {
    Throttle(Throttler),
    Debounce(Debouncer),
}

impl Limiter {
    /// Creates a new limiter.
    pub fn new(policy: Policy, duration: Duration) -> Self {
        let engine = match policy {
            Policy::Throttle => Engine::Throttle(Throttler::new(duration)),
            Policy::Debounce => Engine::Debounce(Debouncer::new(duration)),
        };
        Self {
            policy,
            duration,
            engine,
        }
    }

    /// Creates a throttling limiter.
    pub fn throttle(duration: Duration) -> Self {
        Self::new(Policy::Throttle, duration)
    }

    /// Creates a debouncing limiter.
    pub fn debounce(duration: Duration) -> Self {
        Self::new(Policy::Debounce, duration)
    }

    /// Creates a limiter from a duration in seconds, as read from configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use rate_gate::{Error, Limiter, Policy};
    /// use std::time::Duration;
    ///
    /// let limiter = Limiter::from_secs_f64(Policy::Debounce, 0.25).unwrap();
    /// assert_eq!(limiter.duration(), Duration::from_millis(250));
    ///
    /// assert_eq!(
    ///     Limiter::from_secs_f64(Policy::Throttle, -1.0).unwrap_err(),
    ///     Error::InvalidDuration(-1.0),
    /// );
    /// ```
    pub fn from_secs_f64(policy: Policy, secs: f64) -> Result<Self> {
        let duration =
            Duration::try_from_secs_f64(secs).map_err(|_| Error::InvalidDuration(secs))?;
        Ok(Self::new(policy, duration))
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Submits one unit of work.
    ///
    /// When throttling, admitted work runs inside this call, before it returns. When
    /// debouncing, this returns right after scheduling and the work later runs on a spawned
    /// Tokio task.
    ///
    /// There is no signal for dropped or superseded work.
    ///
    /// # Examples
    ///
    /// ```
    /// use rate_gate::Limiter;
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// async fn refresh() { /* some computation */ }
    ///
    /// async fn on_scroll(limiter: Arc<Limiter>) {
    ///     limiter
    ///         .run(|| {
    ///             tokio::spawn(refresh());
    ///         })
    ///         .await
    /// }
    /// ```
    pub async fn run<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.engine {
            Engine::Throttle(throttler) => {
                throttler.execute(work);
            }
            Engine::Debounce(debouncer) => debouncer.call(work),
        }
    }

    /// Clears all scheduling state, so the next submission is treated as the first one ever.
    ///
    /// Pending debounced work is cancelled and never runs.
    pub fn reset(&self) {
        match &self.engine {
            Engine::Throttle(throttler) => throttler.reset(),
            Engine::Debounce(debouncer) => debouncer.reset(),
        }
    }
}
