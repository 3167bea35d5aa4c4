use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::warn;

/// Absolute point in time used for session expiry and heartbeat deadlines.
/// `tokio::time::Instant` rather than `std::time::Instant` so it composes
/// directly with `sleep_until` without a conversion at every call site.
pub type Deadline = Instant;

type TimerError = Box<dyn std::error::Error + Send + Sync>;

/// A periodic callback with a sliding window: on every firing the callback
/// may return an absolute deadline to push the *next* firing into the
/// future instead of running again at the fixed interval. This is what
/// lets heartbeat sending coalesce with recent outbound traffic instead of
/// firing needlessly.
///
/// Errors from the callback are logged and swallowed — the timer keeps
/// running at the configured interval until [`PeriodicTimer::stop`] is
/// called (or it is dropped).
pub struct PeriodicTimer {
    handle: JoinHandle<()>,
}

impl PeriodicTimer {
    pub fn spawn<F, Fut>(interval: Duration, mut callback: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Option<Deadline>, TimerError>> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut deadline = Instant::now() + interval;
            loop {
                sleep_until(deadline).await;
                deadline = match callback().await {
                    Ok(Some(reschedule)) => reschedule,
                    Ok(None) => Instant::now() + interval,
                    Err(err) => {
                        warn!(error = %err, "periodic timer callback failed");
                        Instant::now() + interval
                    }
                };
            }
        });
        Self { handle }
    }

    /// Stops the timer. Equivalent to dropping it.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn fires_on_the_configured_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = count.clone();
        let timer = PeriodicTimer::spawn(Duration::from_millis(100), move || {
            let counted = counted.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        });

        tokio::time::advance(Duration::from_millis(350)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        timer.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn a_returned_deadline_slides_the_next_firing() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = count.clone();
        let pushed_once = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let pushed = pushed_once.clone();
        let timer = PeriodicTimer::spawn(Duration::from_millis(100), move || {
            let counted = counted.clone();
            let pushed = pushed.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                if !pushed.swap(true, Ordering::SeqCst) {
                    // Slide the very next firing out by 500ms.
                    Ok(Some(Instant::now() + Duration::from_millis(500)))
                } else {
                    Ok(None)
                }
            }
        });

        tokio::time::advance(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 1, "slid deadline not yet reached");

        tokio::time::advance(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        timer.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn callback_errors_are_swallowed_and_the_timer_keeps_running() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = count.clone();
        let timer = PeriodicTimer::spawn(Duration::from_millis(100), move || {
            let counted = counted.clone();
            async move {
                let n = counted.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(Box::<dyn std::error::Error + Send + Sync>::from("boom"))
                } else {
                    Ok(None)
                }
            }
        });

        tokio::time::advance(Duration::from_millis(250)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        timer.stop();
    }
}
