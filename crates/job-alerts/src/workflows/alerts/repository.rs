use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AlertFrequency, AlertId, JobAlert, JobId, UserId};

/// Read access to persisted alerts so the service can be exercised in isolation.
pub trait AlertRepository: Send + Sync {
    /// Active alerts ordered by id, strictly after `after`, at most `limit` of them.
    fn active_page(
        &self,
        after: Option<&AlertId>,
        limit: usize,
    ) -> Result<Vec<JobAlert>, RepositoryError>;

    /// Lazily walks the active alerts `page_size` at a time, following the id cursor.
    fn pages(&self, page_size: usize) -> ActivePages<'_, Self> {
        ActivePages {
            repository: self,
            page_size: page_size.max(1),
            cursor: None,
            exhausted: false,
        }
    }

    /// Every active alert, read page by page.
    fn load_active(&self, page_size: usize) -> Result<Vec<JobAlert>, RepositoryError> {
        let mut alerts = Vec::new();
        for page in self.pages(page_size) {
            alerts.extend(page?);
        }
        Ok(alerts)
    }
}

/// Iterator over pages of active alerts. Stops after a short page or the first error.
pub struct ActivePages<'a, R: ?Sized> {
    repository: &'a R,
    page_size: usize,
    cursor: Option<AlertId>,
    exhausted: bool,
}

impl<R: AlertRepository + ?Sized> Iterator for ActivePages<'_, R> {
    type Item = Result<Vec<JobAlert>, RepositoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let page = match self
            .repository
            .active_page(self.cursor.as_ref(), self.page_size)
        {
            Ok(page) => page,
            Err(err) => {
                self.exhausted = true;
                return Some(Err(err));
            }
        };

        self.exhausted = page.len() < self.page_size;
        match page.last() {
            Some(last) => self.cursor = Some(last.id.clone()),
            None => return None,
        }
        Some(Ok(page))
    }
}

/// Error enumeration for alert storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("alert store unavailable: {0}")]
    Unavailable(String),
    #[error("alert store returned unreadable data: {0}")]
    Corrupt(String),
}

/// Outbound hand-off to the notification system, called once per matched pair.
pub trait MatchNotifier: Send + Sync {
    fn dispatch(&self, event: &MatchEvent) -> Result<(), DispatchError>;
}

/// Payload describing one matched (job, alert) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub job_id: JobId,
    pub job_title: String,
    pub alert_id: AlertId,
    pub user_id: UserId,
    pub alert_frequency: AlertFrequency,
    pub match_percentage: f64,
    pub matched_at: DateTime<Utc>,
}

/// Dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification queue is full")]
    QueueFull,
    #[error("notification queue is closed")]
    QueueClosed,
}

/// Records which (job, alert) pairs were already notified.
pub trait NotificationLedger: Send + Sync {
    fn has_notified(&self, job_id: &JobId, alert_id: &AlertId) -> Result<bool, RepositoryError>;
    fn record(&self, job_id: &JobId, alert_id: &AlertId) -> Result<(), RepositoryError>;
}
