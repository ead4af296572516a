//! Debounced autosave.
//!
//! A single pending slot: scheduling a new save aborts the one waiting in
//! the slot and restarts the delay, so a burst of edits commits once, after
//! the last edit has been quiet for the whole delay.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{FolioError, Result};

/// Default quiet period before an autosave commits.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;

/// Trailing-edge debouncer for background saves.
#[derive(Debug)]
pub struct AutosaveScheduler {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS))
    }
}

impl AutosaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` once the delay elapses without another call.
    ///
    /// Needs a tokio runtime on the calling thread.
    pub fn schedule<F, Fut>(&self, task: F) -> Result<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = Handle::try_current()
            .map_err(|_| FolioError::dependency_missing("tokio runtime"))?;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                previous.abort();
                tracing::debug!("autosave window reset");
            }
        }

        let delay = self.delay;
        *pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task().await;
        }));
        Ok(())
    }

    /// Drop the pending save, if any. Returns whether one was waiting.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                tracing::debug!("pending autosave cancelled");
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter_task(count: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> {
        let count = Arc::clone(count);
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_commits_once() {
        let scheduler = AutosaveScheduler::new(Duration::from_millis(2000));
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            scheduler.schedule(counter_task(&count)).unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(scheduler.is_pending());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_commit_each() {
        let scheduler = AutosaveScheduler::new(Duration::from_millis(2000));
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            scheduler.schedule(counter_task(&count)).unwrap();
            tokio::time::sleep(Duration::from_millis(2100)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let scheduler = AutosaveScheduler::default();
        let count = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(counter_task(&count)).unwrap();
        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_without_runtime() {
        let scheduler = AutosaveScheduler::default();
        let err = scheduler
            .schedule(|| std::future::ready(()))
            .unwrap_err();
        assert!(matches!(err, FolioError::DependencyMissing { .. }));
    }
}
