use crate::Synchronized;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Stand-in deadline for delays too long to represent as an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// [`Debouncer`] delays work until calls stop arriving for a quiet period.
///
/// Every call cancels the execution scheduled by the previous one (if it has not run yet) and
/// schedules its own work `delay` from now. Only the last call of a burst ever runs. Calls
/// spaced `delay` or more apart all run.
///
/// Scheduled work runs on a task spawned onto the current Tokio runtime. Dropping the
/// [`Debouncer`] cancels whatever is still pending.
///
/// # Examples
///
/// ```
/// use rate_gate::Debouncer;
/// use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let debouncer = Debouncer::new(Duration::from_millis(20));
///     let saves = Arc::new(AtomicUsize::new(0));
///
///     for _ in 0..5 {
///         let saves = saves.clone();
///         debouncer.call(move || {
///             saves.fetch_add(1, SeqCst);
///         });
///     }
///
///     tokio::time::sleep(Duration::from_millis(100)).await;
///
///     // Only the last of the five calls ran
///     assert_eq!(saves.load(SeqCst), 1);
/// }
/// ```
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    state: Arc<Synchronized<State>>,
}

#[derive(Debug, Default)]
struct State {
    /// Generation handed to the most recently scheduled work.
    latest: u64,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,

    /// Set under the lock when the work is cancelled. Aborting the task is not enough once it
    /// has finished sleeping and is waiting for the lock.
    cancelled: Arc<AtomicBool>,
}

impl Pending {
    fn cancel(self) {
        self.cancelled.store(true, Relaxed);
        self.handle.abort();
    }
}

impl State {
    /// Cancels the scheduled execution, if any.
    fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.cancel();
                true
            }
            None => false,
        }
    }

    /// Makes room for new work: a pending execution that is not due yet is cancelled, one
    /// whose quiet period already elapsed is left to run.
    fn supersede(&mut self, now: Instant) {
        match self.pending.take() {
            Some(pending) if now >= pending.deadline => {
                trace!(generation = pending.generation, "pending work is due, letting it run");
            }
            Some(pending) => {
                debug!(generation = pending.generation, "pending work superseded");
                pending.cancel();
            }
            None => {}
        }
    }

    /// Called by a woken task; returns whether its work may run.
    fn claim(&mut self, generation: u64, cancelled: &AtomicBool) -> bool {
        if cancelled.load(Relaxed) {
            return false;
        }
        if matches!(&self.pending, Some(pending) if pending.generation == generation) {
            self.pending = None;
        }
        true
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: Arc::new(Synchronized::default()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `work` to run once `delay` passes without another call, superseding any
    /// pending work. Returns immediately.
    ///
    /// With a zero delay the work runs on the calling thread before this returns.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime with a non-zero delay.
    pub fn call<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.delay.is_zero() {
            trace!("no delay, running");
            work();
            return;
        }

        let delay = self.delay;
        let shared = self.state.clone();
        self.state.with_lock(move |state| {
            let now = Instant::now();
            state.supersede(now);

            state.latest += 1;
            let generation = state.latest;
            let deadline = now
                .checked_add(delay)
                .unwrap_or_else(|| now + FAR_FUTURE);
            let cancelled = Arc::new(AtomicBool::new(false));
            let flag = cancelled.clone();

            let handle = tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if shared.with_lock(|state| state.claim(generation, &flag)) {
                    trace!(generation, "quiet period elapsed, running");
                    work();
                }
            });

            trace!(generation, ?delay, "scheduled");
            state.pending = Some(Pending {
                generation,
                deadline,
                handle,
                cancelled,
            });
        });
    }

    /// Returns `true` while the most recently submitted work is scheduled and has not started.
    pub fn is_pending(&self) -> bool {
        self.state.with_lock(|state| state.pending.is_some())
    }

    /// Cancels pending work without running it.
    pub fn reset(&self) {
        if self.state.with_lock(State::cancel) {
            debug!("debouncer reset, pending work cancelled");
        } else {
            debug!("debouncer reset");
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.state.with_lock(State::cancel);
    }
}
