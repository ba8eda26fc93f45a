//! Injectable suspension for poll loops.

use std::future::Future;
use std::time::Duration;

/// Suspends the current task between polls
pub trait Sleeper {
    /// Wait for `duration`
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl<P: Sleeper> Sleeper for &P {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}
