//! Trailing-call debouncing on top of tokio timers.

use log::debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

type Action<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Collapses bursts of `trigger` calls into one trailing invocation of the
/// wrapped action, `delay` after the last call.
///
/// Only the most recent arguments survive. The pending timer lives in a single
/// slot: each trigger aborts the previous one before arming a new timer.
pub struct Debouncer<T> {
    action: Action<T>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(action),
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedules `action(args)` after the quiet window, replacing any call
    /// that has not fired yet. Must be called from within a tokio runtime.
    pub fn trigger(&self, args: T) {
        let action = self.action.clone();
        let delay = self.delay;

        let mut pending = self.lock_pending();
        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                debug!("Debounce: replacing pending call");
            }
            previous.abort();
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action(args);
        }));
    }

    /// Drops the pending call, if any. Returns true when a call was cancelled.
    pub fn cancel(&self) -> bool {
        match self.lock_pending().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                debug!("Debounce: pending call cancelled");
                true
            }
            _ => false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        // The slot only ever holds a handle, so a poisoned guard is still usable
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let slot = self
            .pending
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_debouncer(delay_ms: u64) -> (Debouncer<u32>, Arc<Mutex<Vec<u32>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), move |value| {
            sink.lock().unwrap().push(value);
        });
        (debouncer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_quiet_window() {
        let (debouncer, calls) = recording_debouncer(750);

        debouncer.trigger(1);
        tokio::time::sleep(Duration::from_millis(749)).await;
        assert!(calls.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*calls.lock().unwrap(), vec![1]);
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_last_call() {
        let (debouncer, calls) = recording_debouncer(750);

        for value in 1..=5 {
            debouncer.trigger(value);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        // Window restarts on every call, so nothing has fired yet
        assert!(calls.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(*calls.lock().unwrap(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_quiet_periods_fire_separately() {
        let (debouncer, calls) = recording_debouncer(100);

        debouncer.trigger(1);
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.trigger(2);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(*calls.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_call() {
        let (debouncer, calls) = recording_debouncer(100);

        debouncer.trigger(7);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_debouncer_cancels_timer() {
        let (debouncer, calls) = recording_debouncer(100);

        debouncer.trigger(3);
        drop(debouncer);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(calls.lock().unwrap().is_empty());
    }
}
