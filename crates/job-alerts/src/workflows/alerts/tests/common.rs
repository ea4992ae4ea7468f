use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::alerts::domain::{
    AlertFrequency, AlertId, AlertStatus, JobAlert, JobId, JobPosting, JobStatus, UserId,
};
use crate::workflows::alerts::repository::{
    AlertRepository, DispatchError, MatchEvent, MatchNotifier, NotificationLedger,
    RepositoryError,
};
use crate::workflows::alerts::{AlertMatchingService, MatchingSettings};

pub(super) fn backend_job() -> JobPosting {
    JobPosting {
        id: JobId("job-100".to_string()),
        title: "Backend Engineer".to_string(),
        description: "Go and Python".to_string(),
        department: "engineering".to_string(),
        experience_level: "Mid Level".to_string(),
        salary_min: Some(60_000.0),
        salary_max: Some(90_000.0),
        location: "Kathmandu".to_string(),
        status: JobStatus::Active,
    }
}

pub(super) fn alert(id: &str) -> JobAlert {
    JobAlert {
        id: AlertId(id.to_string()),
        user_id: UserId(format!("user-{id}")),
        job_category: None,
        experience_level: None,
        salary_min: None,
        salary_max: None,
        location: None,
        keywords: None,
        status: AlertStatus::Active,
        alert_frequency: AlertFrequency::Daily,
    }
}

pub(super) fn full_alert(id: &str) -> JobAlert {
    JobAlert {
        job_category: Some("engineering".to_string()),
        experience_level: Some("Mid Level".to_string()),
        salary_min: Some(50_000.0),
        salary_max: Some(100_000.0),
        location: Some("Kathmandu".to_string()),
        keywords: Some("golang,python".to_string()),
        ..alert(id)
    }
}

/// Alert passing only the unconstrained salary ceiling against [`backend_job`] (1 of 6).
pub(super) fn mismatched_alert(id: &str) -> JobAlert {
    JobAlert {
        job_category: Some("marketing".to_string()),
        experience_level: Some("Senior".to_string()),
        salary_min: Some(95_000.0),
        location: Some("Pokhara".to_string()),
        keywords: Some("seo".to_string()),
        ..alert(id)
    }
}

/// Alert that fails validation.
pub(super) fn malformed_alert(id: &str) -> JobAlert {
    JobAlert {
        salary_min: Some(f64::NAN),
        ..alert(id)
    }
}

pub(super) fn settings() -> MatchingSettings {
    MatchingSettings {
        page_size: 3,
        soft_deadline: None,
        ..MatchingSettings::default()
    }
}

pub(super) fn build_service(
    alerts: Vec<JobAlert>,
) -> (
    AlertMatchingService<MemoryAlerts, MemoryNotifier>,
    Arc<MemoryAlerts>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryAlerts::with(alerts));
    let notifier = Arc::new(MemoryNotifier::default());
    let service = AlertMatchingService::new(repository.clone(), notifier.clone(), settings());
    (service, repository, notifier)
}

#[derive(Default)]
pub(super) struct MemoryAlerts {
    alerts: Mutex<BTreeMap<AlertId, JobAlert>>,
    pub(super) page_requests: Mutex<usize>,
}

impl MemoryAlerts {
    pub(super) fn with(alerts: Vec<JobAlert>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.alerts.lock().expect("alerts mutex poisoned");
            for alert in alerts {
                guard.insert(alert.id.clone(), alert);
            }
        }
        repository
    }

    pub(super) fn page_requests(&self) -> usize {
        *self.page_requests.lock().expect("counter mutex poisoned")
    }
}

impl AlertRepository for MemoryAlerts {
    fn active_page(
        &self,
        after: Option<&AlertId>,
        limit: usize,
    ) -> Result<Vec<JobAlert>, RepositoryError> {
        *self.page_requests.lock().expect("counter mutex poisoned") += 1;
        let guard = self.alerts.lock().expect("alerts mutex poisoned");
        Ok(guard
            .values()
            .filter(|alert| alert.is_active())
            .filter(|alert| after.map(|cursor| &alert.id > cursor).unwrap_or(true))
            .take(limit)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableAlerts;

impl AlertRepository for UnavailableAlerts {
    fn active_page(
        &self,
        _after: Option<&AlertId>,
        _limit: usize,
    ) -> Result<Vec<JobAlert>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<MatchEvent>>,
    failing: Mutex<HashSet<AlertId>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<MatchEvent> {
        self.events.lock().expect("events mutex poisoned").clone()
    }

    pub(super) fn fail_for(&self, alert_id: &str) {
        self.failing
            .lock()
            .expect("failing mutex poisoned")
            .insert(AlertId(alert_id.to_string()));
    }
}

impl MatchNotifier for MemoryNotifier {
    fn dispatch(&self, event: &MatchEvent) -> Result<(), DispatchError> {
        if self
            .failing
            .lock()
            .expect("failing mutex poisoned")
            .contains(&event.alert_id)
        {
            return Err(DispatchError::Transport("smtp relay refused".to_string()));
        }
        self.events
            .lock()
            .expect("events mutex poisoned")
            .push(event.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryLedger {
    notified: Mutex<HashSet<(JobId, AlertId)>>,
}

impl NotificationLedger for MemoryLedger {
    fn has_notified(&self, job_id: &JobId, alert_id: &AlertId) -> Result<bool, RepositoryError> {
        Ok(self
            .notified
            .lock()
            .expect("ledger mutex poisoned")
            .contains(&(job_id.clone(), alert_id.clone())))
    }

    fn record(&self, job_id: &JobId, alert_id: &AlertId) -> Result<(), RepositoryError> {
        self.notified
            .lock()
            .expect("ledger mutex poisoned")
            .insert((job_id.clone(), alert_id.clone()));
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
