//! Self-cancelling once-per-second tick stream.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Whether the tick stream should keep running.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickControl {
    /// Schedule the next tick.
    Continue,
    /// End the stream.
    Stop,
}

/// Owner of at most one periodic tick task.
///
/// Starting a new stream aborts the previous one. Missed ticks (e.g. while
/// the host was suspended) are skipped, not replayed.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Create a ticker with no running stream.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Start a tick stream, cancelling any stream already running.
    ///
    /// The first tick fires one `period` after the call.
    pub fn start<F, Fut>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickControl> + Send + 'static,
    {
        self.stop();
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if on_tick().await == TickControl::Stop {
                    break;
                }
            }
        }));
    }

    /// Cancel the running stream, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counting(counter: &Arc<AtomicU64>) -> impl FnMut() -> std::future::Ready<TickControl> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(TickControl::Continue)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut ticker = Ticker::new();
        ticker.start(Duration::from_secs(1), counting(&counter));

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(ticker.is_active());

        ticker.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(!ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_cancels_previous_stream() {
        let counter = Arc::new(AtomicU64::new(0));
        let mut ticker = Ticker::new();
        ticker.start(Duration::from_secs(1), counting(&counter));
        ticker.start(Duration::from_secs(1), counting(&counter));

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_control_ends_stream() {
        let counter = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&counter);
        let mut ticker = Ticker::new();
        ticker.start(Duration::from_secs(1), move || {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n >= 2 {
                TickControl::Stop
            } else {
                TickControl::Continue
            })
        });

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(!ticker.is_active());
    }
}
