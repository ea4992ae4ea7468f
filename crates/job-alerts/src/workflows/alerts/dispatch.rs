use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

use super::repository::{DispatchError, MatchEvent, MatchNotifier};

/// Notifier that emits one event per matched pair onto a bounded queue.
///
/// The matching pass never waits on delivery; a [`NotificationWorker`] drains the queue.
#[derive(Debug, Clone)]
pub struct QueuedNotifier {
    sender: mpsc::Sender<MatchEvent>,
}

impl QueuedNotifier {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MatchEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl MatchNotifier for QueuedNotifier {
    fn dispatch(&self, event: &MatchEvent) -> Result<(), DispatchError> {
        self.sender
            .try_send(event.clone())
            .map_err(|err| match err {
                TrySendError::Full(_) => DispatchError::QueueFull,
                TrySendError::Closed(_) => DispatchError::QueueClosed,
            })
    }
}

/// Delivery side of the notification system (e-mail, push, in-app).
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, event: &MatchEvent) -> Result<(), DispatchError>;
}

/// Sink that only records deliveries in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn deliver(&self, event: &MatchEvent) -> Result<(), DispatchError> {
        info!(
            job_id = %event.job_id.0,
            alert_id = %event.alert_id.0,
            user_id = %event.user_id.0,
            frequency = ?event.alert_frequency,
            match_percentage = event.match_percentage,
            "job alert notification handed to delivery"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Consumes queued match events until every sender is dropped.
pub struct NotificationWorker<S> {
    receiver: mpsc::Receiver<MatchEvent>,
    sink: Arc<S>,
}

impl<S> NotificationWorker<S>
where
    S: NotificationSink + 'static,
{
    pub fn new(receiver: mpsc::Receiver<MatchEvent>, sink: Arc<S>) -> Self {
        Self { receiver, sink }
    }

    pub async fn run(mut self) -> WorkerReport {
        let mut report = WorkerReport::default();
        while let Some(event) = self.receiver.recv().await {
            match self.sink.deliver(&event) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        job_id = %event.job_id.0,
                        alert_id = %event.alert_id.0,
                        error = %err,
                        "job alert notification delivery failed"
                    );
                }
            }
        }
        report
    }
}
