use job_alerts::error::AppError;
use job_alerts::workflows::alerts::{
    AlertId, AlertRepository, DispatchError, JobAlert, JobId, MatchEvent, MatchNotifier,
    NotificationLedger, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Alert store keyed by id so pages come back in cursor order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertRepository {
    alerts: Arc<Mutex<BTreeMap<AlertId, JobAlert>>>,
}

impl InMemoryAlertRepository {
    pub(crate) fn from_alerts(alerts: Vec<JobAlert>) -> Self {
        let repository = Self::default();
        for alert in alerts {
            repository.upsert(alert);
        }
        repository
    }

    pub(crate) fn upsert(&self, alert: JobAlert) {
        let mut guard = self.alerts.lock().expect("repository mutex poisoned");
        guard.insert(alert.id.clone(), alert);
    }
}

impl AlertRepository for InMemoryAlertRepository {
    fn active_page(
        &self,
        after: Option<&AlertId>,
        limit: usize,
    ) -> Result<Vec<JobAlert>, RepositoryError> {
        let guard = self
            .alerts
            .lock()
            .map_err(|_| RepositoryError::Unavailable("alert store lock poisoned".to_string()))?;
        Ok(guard
            .values()
            .filter(|alert| alert.is_active())
            .filter(|alert| after.map_or(true, |cursor| &alert.id > cursor))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Notifier that keeps every dispatched event, used by the one-shot `match` command.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMatchNotifier {
    events: Arc<Mutex<Vec<MatchEvent>>>,
}

impl MatchNotifier for InMemoryMatchNotifier {
    fn dispatch(&self, event: &MatchEvent) -> Result<(), DispatchError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| DispatchError::Transport("outbox lock poisoned".to_string()))?;
        guard.push(event.clone());
        Ok(())
    }
}

impl InMemoryMatchNotifier {
    pub(crate) fn events(&self) -> Vec<MatchEvent> {
        self.events.lock().expect("outbox mutex poisoned").clone()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationLedger {
    notified: Arc<Mutex<HashSet<(JobId, AlertId)>>>,
}

impl NotificationLedger for InMemoryNotificationLedger {
    fn has_notified(&self, job_id: &JobId, alert_id: &AlertId) -> Result<bool, RepositoryError> {
        let guard = self
            .notified
            .lock()
            .map_err(|_| RepositoryError::Unavailable("ledger lock poisoned".to_string()))?;
        Ok(guard.contains(&(job_id.clone(), alert_id.clone())))
    }

    fn record(&self, job_id: &JobId, alert_id: &AlertId) -> Result<(), RepositoryError> {
        let mut guard = self
            .notified
            .lock()
            .map_err(|_| RepositoryError::Unavailable("ledger lock poisoned".to_string()))?;
        guard.insert((job_id.clone(), alert_id.clone()));
        Ok(())
    }
}

pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|err| AppError::Input(format!("{}: {err}", path.display())))
}
