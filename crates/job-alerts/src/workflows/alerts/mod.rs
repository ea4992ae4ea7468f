//! Job-alert matching: scores a newly published job posting against every active saved
//! search and hands the alerts that clear the match threshold to a notification system.
//!
//! The evaluator and scorer are pure; the service drives a single synchronous pass over the
//! active alerts and isolates failures per alert so one malformed record never aborts a batch.

pub mod dispatch;
pub mod domain;
pub(crate) mod evaluation;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use dispatch::{
    NotificationSink, NotificationWorker, QueuedNotifier, TracingSink, WorkerReport,
};
pub use domain::{
    AlertFrequency, AlertId, AlertStatus, JobAlert, JobId, JobPosting, JobStatus, UserId,
};
pub use evaluation::{
    CriteriaEvaluator, CriteriaReport, Criterion, CriterionCheck, EvaluationError, MatchResult,
    MatchScore, MatchScorer, MATCH_THRESHOLD,
};
pub use repository::{
    ActivePages, AlertRepository, DispatchError, MatchEvent, MatchNotifier, NotificationLedger,
    RepositoryError,
};
pub use router::alert_router;
pub use service::{
    AlertMatchingError, AlertMatchingService, MatchingSettings, MatchingSummary, RenotifyPolicy,
};
