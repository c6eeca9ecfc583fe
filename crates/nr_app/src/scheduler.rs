use nr_core::Event;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Delivers an event back to the session once a delay has passed.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, after: Duration, event: Event);
}

/// Sleeps on the tokio runtime and sends the event into the session's queue.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    tx: UnboundedSender<Event>,
}

impl TokioScheduler {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, after: Duration, event: Event) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if tx.send(event).is_err() {
                debug!("Session gone before timer fired");
            }
        });
    }
}

/// Holds scheduled events until the caller fires them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: Mutex<Vec<(Duration, Event)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<(Duration, Event)> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, after: Duration, event: Event) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((after, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_tokio_scheduler_delivers_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(tx);
        scheduler.schedule(Duration::from_millis(10), Event::BadgeExpired);
        assert_eq!(rx.recv().await, Some(Event::BadgeExpired));
    }

    #[test]
    fn test_manual_scheduler_keeps_order() {
        let scheduler = ManualScheduler::new();
        scheduler.schedule(Duration::from_millis(300), Event::NextPage);
        scheduler.schedule(Duration::from_secs(4), Event::BadgeExpired);
        let pending = scheduler.take();
        assert_eq!(pending[0].1, Event::NextPage);
        assert_eq!(pending[1].0, Duration::from_secs(4));
        assert!(scheduler.take().is_empty());
    }
}
