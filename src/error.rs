/// Errors raised while configuring a limiter.
///
/// Running work never fails; only turning loosely-typed configuration (seconds as a float, a
/// policy name) into a [`Limiter`](crate::Limiter) can.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The duration was negative, NaN or infinite.
    #[error("invalid duration: {0} seconds")]
    InvalidDuration(f64),

    /// The policy name was neither `throttle` nor `debounce`.
    #[error("unknown policy `{0}`, expected `throttle` or `debounce`")]
    UnknownPolicy(String),
}

pub type Result<T> = std::result::Result<T, Error>;
