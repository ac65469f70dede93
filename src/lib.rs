//! Tools for limiting how often repeatedly submitted work runs
//!
//! * [`Limiter`], a throttling or debouncing limiter
//! * [`MultiLimiter`], a key-based limiter
//! * [`Throttler`] and [`Debouncer`], the synchronous engines behind [`Limiter`]
//! * [`Synchronized`] and [`Atomic`], lock-guarded values
//!
//! # Examples
//!
//! ```
//! use rate_gate::{Limiter, Policy};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let search = Limiter::new(Policy::Debounce, Duration::from_millis(10));
//!
//!     // Only the last keystroke triggers a search, 10ms after it was typed
//!     for query in ["r", "ru", "rus", "rust"] {
//!         search.run(move || computation(query)).await;
//!     }
//!
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//! }
//!
//! fn computation(_query: &str) { }
//! ```
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use multi::MultiLimiter;
pub use single::{Limiter, Policy};
pub use sync::{Atomic, Synchronized};
pub use throttle::Throttler;
mod debounce;
mod error;
mod multi;
mod single;
mod sync;
mod throttle;
