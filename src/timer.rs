//! Cancellable one-shot timers
//!
//! A `Timer` delivers a value into an mpsc channel after a delay, unless it
//! is dropped first. Timer handles are stored on the owning registry entry
//! (keyed by connection), so replacing a pending timer or removing the
//! connection cancels it synchronously. Receivers must still tolerate a
//! late value that was already in flight when the timer was dropped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A pending delayed send; aborted when dropped
#[derive(Debug)]
pub struct Timer {
    handle: JoinHandle<()>,
}

impl Timer {
    /// Schedule `value` to be sent into `tx` after `delay`
    ///
    /// The send result is ignored; a closed receiver means the owner of
    /// this timer is already gone.
    pub fn schedule<T: Send + 'static>(tx: mpsc::Sender<T>, delay: Duration, value: T) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value).await;
        });
        Self { handle }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::time::timeout;

    #[tokio::test]
    async fn test_timer_fires_after_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        let _timer = Timer::schedule(tx, Duration::from_millis(10), 7u32);

        let got = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timer should fire")
            .unwrap();
        assert_eq!(got, 7);
    }

    #[tokio::test]
    async fn test_dropped_timer_never_fires() {
        let (tx, mut rx) = mpsc::channel(4);
        let timer = Timer::schedule(tx, Duration::from_millis(20), 1u32);
        drop(timer);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_replacing_timer_cancels_prior() {
        let (tx, mut rx) = mpsc::channel(4);

        let mut slot = Some(Timer::schedule(tx.clone(), Duration::from_millis(30), 1u32));
        // Storing a new timer drops (and aborts) the prior one
        slot.replace(Timer::schedule(tx, Duration::from_millis(30), 2u32));

        let got = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("replacement timer should fire")
            .unwrap();
        assert_eq!(got, 2);
        assert!(rx.try_recv().is_err());
    }
}
