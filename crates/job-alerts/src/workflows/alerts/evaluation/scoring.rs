use serde::{Deserialize, Serialize};

use super::super::domain::{AlertId, JobId};
use super::CriteriaReport;

/// Minimum percentage at which an alert counts as matched. Not configurable per alert.
pub const MATCH_THRESHOLD: f64 = 30.0;

pub(crate) fn match_percentage(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    matched as f64 / total as f64 * 100.0
}

/// Aggregate compatibility between one job and one alert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub percentage: f64,
    pub matched: bool,
}

impl MatchScore {
    pub fn from_percentage(percentage: f64) -> Self {
        Self {
            percentage,
            matched: percentage >= MATCH_THRESHOLD,
        }
    }
}

/// Turns criterion counts into a percentage and applies the fixed threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatchScorer;

impl MatchScorer {
    pub fn score(&self, report: &CriteriaReport) -> MatchScore {
        MatchScore::from_percentage(match_percentage(
            report.matched_criteria,
            report.total_criteria,
        ))
    }
}

/// Transient (job, alert, percentage) triple handed to dispatch and then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job_id: JobId,
    pub alert_id: AlertId,
    pub match_percentage: f64,
}
