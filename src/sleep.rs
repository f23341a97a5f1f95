use std::future::Future;
use std::time::Duration;

/// Source of the backoff delay between attempts.
///
/// The request timeout itself is enforced by the HTTP transport; only the
/// waits between attempts go through this trait, so tests can record them
/// instead of sleeping.
pub trait Sleeper: Clone + Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
