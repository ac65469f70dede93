use crate::Synchronized;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// [`Throttler`] runs work at most once per period, dropping whatever arrives in between.
///
/// The first call always runs. After work runs at time `T`, every call before `T + period` is
/// discarded; the first call at or after `T + period` runs and opens a new window.
///
/// Unlike [`Limiter`](crate::Limiter), a [`Throttler`] is synchronous and reports whether the
/// work ran. It does not need a Tokio runtime.
///
/// Windows are claimed at least `period` apart, but work runs after the lock is released. If a
/// thread is descheduled between claiming a window and starting its work, a later window's work
/// on another thread may start first, or less than `period` after it. Callers that need the
/// starts themselves spaced must serialize the work.
///
/// # Examples
///
/// ```
/// use rate_gate::Throttler;
/// use std::time::Duration;
///
/// let throttler = Throttler::new(Duration::from_secs(60));
///
/// assert!(throttler.execute(|| println!("refreshing")));
///
/// // Still inside the window
/// assert!(!throttler.execute(|| println!("refreshing again")));
///
/// throttler.reset();
/// assert!(throttler.execute(|| println!("refreshing after reset")));
/// ```
#[derive(Debug)]
pub struct Throttler {
    period: Duration,

    /// When work last ran, `None` if it never did (or since the last reset).
    last_run: Synchronized<Option<Instant>>,
}

impl Throttler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_run: Synchronized::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Runs `work` if the window is open, returning whether it ran.
    ///
    /// The decision and the update of the window are made under the lock; `work` itself runs
    /// after the lock is released, on the calling thread, before this returns.
    pub fn execute<F>(&self, work: F) -> bool
    where
        F: FnOnce(),
    {
        if !self.acquire() {
            return false;
        }
        work();
        true
    }

    /// Claims the current window, returning `false` if it is already taken.
    fn acquire(&self) -> bool {
        let period = self.period;
        self.last_run.with_lock(|last_run| {
            let now = Instant::now();
            let elapsed = last_run.map(|at| now.saturating_duration_since(at));
            match elapsed {
                Some(elapsed) if elapsed < period => {
                    let remaining = period - elapsed;
                    debug!(?remaining, "throttled");
                    false
                }
                _ => {
                    trace!("window open, running");
                    *last_run = Some(now);
                    true
                }
            }
        })
    }

    /// Forgets the last execution, so the next call runs.
    pub fn reset(&self) {
        debug!("throttler reset");
        self.last_run.with_lock(|last_run| *last_run = None);
    }
}
