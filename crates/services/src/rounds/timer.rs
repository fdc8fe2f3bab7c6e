use std::time::Duration;

use tokio::task::JoinHandle;

/// One-shot, cancellable delay that fires a callback when the reveal ends.
///
/// At most one firing is pending; scheduling again replaces it. Dropping the
/// timer cancels it.
#[derive(Debug, Default)]
pub struct RevealTimer {
    pending: Option<JoinHandle<()>>,
}

impl RevealTimer {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Run `fire` after `dwell`, cancelling whatever was scheduled before.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, dwell: Duration, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            fire();
        }));
    }

    /// Abort the pending firing, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RevealTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&hits);
        (hits, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_dwell() {
        let (hits, fire) = counter();
        let mut timer = RevealTimer::idle();
        timer.schedule(Duration::from_millis(1500), fire);
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_and_prevents_firing() {
        let (hits, fire) = counter();
        let mut timer = RevealTimer::idle();
        timer.schedule(Duration::from_millis(100), fire);
        timer.cancel();
        timer.cancel();
        assert!(!timer.is_pending());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_timer_cancels_it() {
        let (hits, fire) = counter();
        {
            let mut timer = RevealTimer::idle();
            timer.schedule(Duration::from_millis(100), fire);
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_pending_firing() {
        let (first_hits, first) = counter();
        let (second_hits, second) = counter();
        let mut timer = RevealTimer::idle();
        timer.schedule(Duration::from_millis(100), first);
        timer.schedule(Duration::from_millis(100), second);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(first_hits.load(Ordering::SeqCst), 0);
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    }
}
