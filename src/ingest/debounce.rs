//! Change-signal debouncing.
//!
//! The external database emits a burst of raw file-system signals for every
//! logical change. The watcher collapses a burst into one check after a
//! quiet period, with a maximum-wait ceiling so a continuous burst cannot
//! delay processing indefinitely. Consolidation affects latency only, never
//! resolution correctness.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::trace;

/// Collapses signal bursts into single flushes.
pub struct Debouncer {
    quiet: Duration,
    max_wait: Duration,
}

impl Debouncer {
    /// Creates a debouncer with a quiet period and a max-wait ceiling.
    #[must_use]
    pub const fn new(quiet: Duration, max_wait: Duration) -> Self {
        Self { quiet, max_wait }
    }

    /// Drains `signals`, invoking `on_flush` once per consolidated burst.
    ///
    /// A flush fires when no signal has arrived for the quiet period, or
    /// when a burst has been running for the max-wait ceiling. Returns when
    /// the sender side closes, flushing any signals still pending.
    pub async fn run<F>(&self, mut signals: mpsc::UnboundedReceiver<()>, mut on_flush: F)
    where
        F: FnMut(),
    {
        while signals.recv().await.is_some() {
            let burst_deadline = Instant::now() + self.max_wait;
            let mut closed = false;
            loop {
                let quiet_deadline = Instant::now() + self.quiet;
                let deadline = quiet_deadline.min(burst_deadline);
                tokio::select! {
                    () = sleep_until(deadline) => break,
                    received = signals.recv() => {
                        if received.is_none() {
                            closed = true;
                            break;
                        }
                        // Burst continues; the quiet timer restarts on the
                        // next loop iteration.
                    }
                }
            }
            trace!("debounced burst flushed");
            on_flush();
            if closed {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{Duration, advance};

    fn counting_flush() -> (Arc<AtomicUsize>, impl FnMut()) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        (count, move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_flush() {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(Duration::from_millis(100), Duration::from_secs(5));
        let (count, on_flush) = counting_flush();

        let task = tokio::spawn(async move { debouncer.run(rx, on_flush).await });
        for _ in 0..10 {
            tx.send(()).unwrap();
        }
        drop(tx);
        task.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_bursts_flush_separately() {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(Duration::from_millis(100), Duration::from_secs(5));
        let (count, on_flush) = counting_flush();

        let task = tokio::spawn(async move { debouncer.run(rx, on_flush).await });
        tx.send(()).unwrap();
        advance(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tx.send(()).unwrap();
        drop(tx);
        task.await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_burst_hits_max_wait() {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(Duration::from_millis(100), Duration::from_millis(350));
        let (count, on_flush) = counting_flush();

        let task = tokio::spawn(async move { debouncer.run(rx, on_flush).await });

        // Keep signalling faster than the quiet period; only the ceiling
        // can end the burst.
        for _ in 0..10 {
            tx.send(()).unwrap();
            advance(Duration::from_millis(50)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        drop(tx);
        task.await.unwrap();
    }
}
