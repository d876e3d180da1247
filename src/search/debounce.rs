use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Trailing-edge debounce: a slot holding at most one pending timer.
///
/// Each [`schedule`](Self::schedule) clears the previous timer, so only the
/// last call inside a quiescence window ever fires. [`shutdown`](Self::shutdown)
/// (also run on drop) makes every timer from this slot inert for good.
#[derive(Debug)]
pub struct DebounceSlot {
    delay: Duration,
    root: CancellationToken,
    pending: Option<CancellationToken>,
}

impl DebounceSlot {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            root: CancellationToken::new(),
            pending: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        if self.root.is_cancelled() {
            return;
        }
        let token = self.root.child_token();
        self.pending = Some(token.clone());
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => trace!("debounce timer cleared"),
                _ = tokio::time::sleep(delay) => fire(),
            }
        });
    }

    /// Clears the pending timer, if any. The slot stays usable.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    pub fn shutdown(&mut self) {
        self.cancel();
        self.root.cancel();
    }

    #[cfg(test)]
    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl Drop for DebounceSlot {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::{Instant, sleep};

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_with_last_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = DebounceSlot::new(DELAY);
        let start = Instant::now();

        for text in ["w", "wa", "wat"] {
            let tx = tx.clone();
            slot.schedule(move || {
                let _ = tx.send((text, Instant::now()));
            });
            sleep(Duration::from_millis(100)).await;
        }

        let (text, fired_at) = rx.recv().await.unwrap();
        assert_eq!(text, "wat");
        // last schedule happened at +200ms
        assert!(fired_at - start >= Duration::from_millis(200) + DELAY);

        sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn calls_spaced_beyond_window_each_fire() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = DebounceSlot::new(DELAY);
        for n in 0..2 {
            let tx = tx.clone();
            slot.schedule(move || {
                let _ = tx.send(n);
            });
            sleep(DELAY * 2).await;
        }
        assert_eq!(rx.recv().await, Some(0));
        assert_eq!(rx.recv().await, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_clears_pending_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut slot = DebounceSlot::new(DELAY);
        slot.schedule(move || {
            let _ = tx.send(());
        });
        slot.cancel();
        sleep(DELAY * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_makes_slot_inert() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        let mut slot = DebounceSlot::new(DELAY);
        let tx1 = tx.clone();
        slot.schedule(move || {
            let _ = tx1.send(1);
        });
        slot.shutdown();
        assert!(slot.is_shut_down());
        slot.schedule(move || {
            let _ = tx.send(2);
        });
        sleep(DELAY * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_clears_pending_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        {
            let mut slot = DebounceSlot::new(DELAY);
            slot.schedule(move || {
                let _ = tx.send(());
            });
        }
        sleep(DELAY * 3).await;
        assert!(rx.try_recv().is_err());
    }
}
