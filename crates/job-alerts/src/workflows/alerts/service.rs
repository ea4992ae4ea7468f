use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::domain::{JobAlert, JobId, JobPosting};
use super::evaluation::{
    CriteriaEvaluator, CriteriaReport, EvaluationError, MatchResult, MatchScore, MatchScorer,
};
use super::repository::{
    AlertRepository, MatchEvent, MatchNotifier, NotificationLedger, RepositoryError,
};

/// Whether a job that is published again re-notifies alerts it already matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenotifyPolicy {
    Always,
    Never,
}

/// Tuning for a matching pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingSettings {
    pub page_size: usize,
    pub soft_deadline: Option<Duration>,
    pub renotify: RenotifyPolicy,
    pub dispatch_queue_capacity: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            page_size: 500,
            soft_deadline: Some(Duration::from_secs(120)),
            renotify: RenotifyPolicy::Always,
            dispatch_queue_capacity: 1024,
        }
    }
}

/// Counts and matches produced by one pass over the active alerts.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingSummary {
    pub job_id: JobId,
    pub evaluated: usize,
    pub matched: Vec<MatchResult>,
    pub skipped: usize,
    pub dispatched: usize,
    pub dispatch_failures: usize,
    pub suppressed: usize,
    pub deadline_exceeded: bool,
}

impl MatchingSummary {
    fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            evaluated: 0,
            matched: Vec::new(),
            skipped: 0,
            dispatched: 0,
            dispatch_failures: 0,
            suppressed: 0,
            deadline_exceeded: false,
        }
    }
}

/// Service composing the alert store, the evaluator/scorer pair, and the notifier.
pub struct AlertMatchingService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    ledger: Option<Arc<dyn NotificationLedger>>,
    evaluator: CriteriaEvaluator,
    scorer: MatchScorer,
    settings: MatchingSettings,
}

impl<R, N> AlertMatchingService<R, N>
where
    R: AlertRepository + 'static,
    N: MatchNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, settings: MatchingSettings) -> Self {
        let settings = MatchingSettings {
            page_size: settings.page_size.max(1),
            ..settings
        };

        Self {
            repository,
            notifier,
            ledger: None,
            evaluator: CriteriaEvaluator,
            scorer: MatchScorer,
            settings,
        }
    }

    /// Successful dispatches are recorded in the ledger; it is consulted under `RenotifyPolicy::Never`.
    pub fn with_ledger(mut self, ledger: Arc<dyn NotificationLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn settings(&self) -> &MatchingSettings {
        &self.settings
    }

    /// Score one pair without dispatching anything.
    pub fn evaluate_pair(
        &self,
        job: &JobPosting,
        alert: &JobAlert,
    ) -> Result<(CriteriaReport, MatchScore), EvaluationError> {
        let report = self.evaluator.evaluate(job, alert)?;
        let score = self.scorer.score(&report);
        Ok((report, score))
    }

    /// Match a newly published (or re-activated) job against every active alert.
    ///
    /// Callers invoke this on the transition into the published state; the job status is not
    /// re-checked here. Only a failure to read alerts aborts the pass.
    pub fn on_job_published(
        &self,
        job: &JobPosting,
    ) -> Result<MatchingSummary, AlertMatchingError> {
        if self.settings.renotify == RenotifyPolicy::Never && self.ledger.is_none() {
            return Err(AlertMatchingError::LedgerRequired);
        }

        let started = Instant::now();
        let mut summary = MatchingSummary::new(job.id.clone());
        let mut matches: Vec<(JobAlert, MatchScore)> = Vec::new();
        let mut pages = self.repository.pages(self.settings.page_size);

        'pages: loop {
            if self.deadline_passed(started) {
                summary.deadline_exceeded = true;
                break;
            }

            let Some(page) = pages.next() else {
                break;
            };

            for alert in page? {
                if self.deadline_passed(started) {
                    summary.deadline_exceeded = true;
                    break 'pages;
                }

                summary.evaluated += 1;
                match self.evaluate_pair(job, &alert) {
                    Ok((report, score)) => {
                        debug!(
                            job_id = %job.id.0,
                            alert_id = %alert.id.0,
                            criteria_detail = %report,
                            total_criteria = report.total_criteria,
                            matched_criteria = report.matched_criteria,
                            match_percentage = score.percentage,
                            "job alert evaluated"
                        );
                        if score.matched {
                            matches.push((alert, score));
                        }
                    }
                    Err(err) => {
                        summary.skipped += 1;
                        warn!(
                            job_id = %job.id.0,
                            alert_id = %alert.id.0,
                            error = %err,
                            "skipping job alert that could not be evaluated"
                        );
                    }
                }
            }
        }

        if summary.deadline_exceeded {
            warn!(
                job_id = %job.id.0,
                evaluated = summary.evaluated,
                "soft deadline reached; remaining alerts were not evaluated"
            );
        }

        for (alert, score) in matches {
            self.notify(job, &alert, score, &mut summary);
        }

        info!(
            job_id = %job.id.0,
            matched_alerts_count = summary.matched.len(),
            dispatched = summary.dispatched,
            skipped = summary.skipped,
            "job alert matching finished"
        );

        Ok(summary)
    }

    /// Run the pass as a background unit of work on the blocking pool.
    pub fn spawn_matching(
        self: &Arc<Self>,
        job: JobPosting,
    ) -> JoinHandle<Result<MatchingSummary, AlertMatchingError>> {
        let service = Arc::clone(self);
        tokio::task::spawn_blocking(move || service.on_job_published(&job))
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.settings
            .soft_deadline
            .map(|deadline| started.elapsed() >= deadline)
            .unwrap_or(false)
    }

    fn notify(
        &self,
        job: &JobPosting,
        alert: &JobAlert,
        score: MatchScore,
        summary: &mut MatchingSummary,
    ) {
        summary.matched.push(MatchResult {
            job_id: job.id.clone(),
            alert_id: alert.id.clone(),
            match_percentage: score.percentage,
        });

        if self.settings.renotify == RenotifyPolicy::Never {
            if let Some(ledger) = &self.ledger {
                match ledger.has_notified(&job.id, &alert.id) {
                    Ok(true) => {
                        summary.suppressed += 1;
                        debug!(
                            job_id = %job.id.0,
                            alert_id = %alert.id.0,
                            "alert already notified for this job"
                        );
                        return;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        summary.dispatch_failures += 1;
                        warn!(
                            job_id = %job.id.0,
                            alert_id = %alert.id.0,
                            error = %err,
                            "notification ledger lookup failed"
                        );
                        return;
                    }
                }
            }
        }

        let event = MatchEvent {
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            alert_id: alert.id.clone(),
            user_id: alert.user_id.clone(),
            alert_frequency: alert.alert_frequency,
            match_percentage: score.percentage,
            matched_at: Utc::now(),
        };

        match self.notifier.dispatch(&event) {
            Ok(()) => {
                summary.dispatched += 1;
                if let Some(ledger) = &self.ledger {
                    if let Err(err) = ledger.record(&job.id, &alert.id) {
                        warn!(
                            job_id = %job.id.0,
                            alert_id = %alert.id.0,
                            error = %err,
                            "failed to record notification"
                        );
                    }
                }
            }
            Err(err) => {
                summary.dispatch_failures += 1;
                warn!(
                    job_id = %job.id.0,
                    alert_id = %alert.id.0,
                    error = %err,
                    "job alert notification dispatch failed"
                );
            }
        }
    }
}

/// Error raised by the matching service. Per-alert problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum AlertMatchingError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("re-notification is disabled but no notification ledger is configured")]
    LedgerRequired,
}
