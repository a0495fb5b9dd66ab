use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Owned handle to one repeating countdown task.
///
/// Ticks come from a monotonic tokio interval. If the runtime falls behind,
/// missed ticks are delivered one after another rather than merged, so every
/// elapsed period is applied exactly once. Dropping the timer cancels it.
#[derive(Debug, Default)]
pub struct CountdownTimer {
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Call `on_tick` once per `period`, first one period from now, until it
    /// returns `ControlFlow::Break`. Any previous task is cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        self.cancel();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        });

        self.handle = Some(handle);
    }

    /// Abort the running task, if any. No tick fires after this returns
    /// unless one is already executing on another worker.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period_until_break() {
        let count = Arc::new(AtomicU32::new(0));
        let mut timer = CountdownTimer::new();

        let c = Arc::clone(&count);
        timer.start(Duration::from_secs(1), move || {
            if c.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let count = Arc::new(AtomicU32::new(0));
        let mut timer = CountdownTimer::new();

        let c = Arc::clone(&count);
        timer.start(Duration::from_secs(1), move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        });

        time::sleep(Duration::from_millis(1500)).await;
        timer.cancel();
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!timer.is_running());
    }
}
