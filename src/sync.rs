use std::fmt;
use std::sync::{Mutex, PoisonError};

/// [`Synchronized`] guards a single value so that read-modify-write sequences from concurrent
/// callers are serialized.
///
/// All access goes through [`Synchronized::with_lock`], which hands the closure exclusive,
/// mutable access to the value. Two concurrent closures never interleave: one completes entirely
/// before the other begins.
///
/// A closure that panics does not poison the cell. Later callers still get the value, in
/// whatever state the panicking closure left it.
///
/// # Examples
///
/// ```
/// use rate_gate::Synchronized;
/// use std::sync::Arc;
/// use std::thread;
///
/// let counter = Arc::new(Synchronized::new(0));
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let counter = counter.clone();
///         thread::spawn(move || {
///             for _ in 0..100 {
///                 counter.with_lock(|n| *n += 1);
///             }
///         })
///     })
///     .collect();
///
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(counter.with_lock(|n| *n), 400);
/// ```
#[derive(Default)]
pub struct Synchronized<V> {
    value: Mutex<V>,
}

impl<V> Synchronized<V> {
    /// Creates a new cell holding `value`.
    pub fn new(value: V) -> Self {
        Self {
            value: Mutex::new(value),
        }
    }

    /// Runs `body` with exclusive access to the value and returns its result.
    ///
    /// Blocks until no other caller is inside `with_lock`. The lock is released when `body`
    /// returns or unwinds.
    pub fn with_lock<R>(&self, body: impl FnOnce(&mut V) -> R) -> R {
        let mut guard = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        body(&mut guard)
    }

    /// Returns a mutable reference to the value. No locking is needed since `&mut self`
    /// guarantees exclusive access.
    pub fn get_mut(&mut self) -> &mut V {
        self.value.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consumes the cell, returning the value.
    pub fn into_inner(self) -> V {
        self.value.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: fmt::Debug> fmt::Debug for Synchronized<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_lock(|value| f.debug_tuple("Synchronized").field(value).finish())
    }
}

/// [`Atomic`] is a [`Synchronized`] value read and written as a whole.
///
/// # Examples
///
/// ```
/// use rate_gate::Atomic;
///
/// let name = Atomic::new(String::from("h"));
/// name.update(|s| s.push_str("ello"));
///
/// assert_eq!(name.load(), "hello");
/// assert_eq!(name.swap(String::new()), "hello");
/// assert!(name.load().is_empty());
/// ```
#[derive(Default)]
pub struct Atomic<V> {
    inner: Synchronized<V>,
}

impl<V> Atomic<V> {
    pub fn new(value: V) -> Self {
        Self {
            inner: Synchronized::new(value),
        }
    }

    /// Replaces the value.
    pub fn store(&self, value: V) {
        self.inner.with_lock(|current| *current = value);
    }

    /// Replaces the value, returning the previous one.
    pub fn swap(&self, value: V) -> V {
        self.inner
            .with_lock(|current| std::mem::replace(current, value))
    }

    /// Runs `body` against the value under the lock and returns its result.
    pub fn update<R>(&self, body: impl FnOnce(&mut V) -> R) -> R {
        self.inner.with_lock(body)
    }

    pub fn into_inner(self) -> V {
        self.inner.into_inner()
    }
}

impl<V: Clone> Atomic<V> {
    /// Returns a copy of the current value.
    pub fn load(&self) -> V {
        self.inner.with_lock(|value| value.clone())
    }
}

impl<V: fmt::Debug> fmt::Debug for Atomic<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner
            .with_lock(|value| f.debug_tuple("Atomic").field(value).finish())
    }
}
