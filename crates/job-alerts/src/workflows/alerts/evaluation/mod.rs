mod rules;
pub(crate) mod scoring;

pub use scoring::{MatchResult, MatchScore, MatchScorer, MATCH_THRESHOLD};

use super::domain::{JobAlert, JobPosting};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter dimension compared between a posting and an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Category,
    ExperienceLevel,
    SalaryMin,
    SalaryMax,
    Location,
    Keywords,
}

impl Criterion {
    pub fn label(self) -> &'static str {
        match self {
            Criterion::Category => "category",
            Criterion::ExperienceLevel => "experience_level",
            Criterion::SalaryMin => "salary_min",
            Criterion::SalaryMax => "salary_max",
            Criterion::Location => "location",
            Criterion::Keywords => "keywords",
        }
    }
}

/// Outcome of a single criterion, kept for audit logs and previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionCheck {
    pub criterion: Criterion,
    pub matched: bool,
    pub detail: String,
}

impl CriterionCheck {
    fn unconstrained(criterion: Criterion) -> Self {
        Self {
            criterion,
            matched: true,
            detail: "alert sets no constraint".to_string(),
        }
    }
}

/// Per-criterion results with the counts the scorer works from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaReport {
    pub checks: Vec<CriterionCheck>,
    pub total_criteria: usize,
    pub matched_criteria: usize,
}

impl CriteriaReport {
    fn from_checks(checks: Vec<CriterionCheck>) -> Self {
        let matched_criteria = checks.iter().filter(|check| check.matched).count();
        Self {
            total_criteria: checks.len(),
            matched_criteria,
            checks,
        }
    }

    pub fn check(&self, criterion: Criterion) -> Option<&CriterionCheck> {
        self.checks.iter().find(|check| check.criterion == criterion)
    }
}

impl fmt::Display for CriteriaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for check in &self.checks {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(
                f,
                "{}={}",
                check.criterion.label(),
                if check.matched { "pass" } else { "fail" }
            )?;
        }
        Ok(())
    }
}

/// Malformed alert data on a single (job, alert) pair. The pair is skipped, never the batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("{field} must be a finite amount (found {value})")]
    InvalidSalary { field: &'static str, value: f64 },
    #[error("alert is {status}, only active alerts are matched")]
    InactiveAlert { status: &'static str },
}

/// Stateless comparison of one posting against one alert.
#[derive(Debug, Default, Clone, Copy)]
pub struct CriteriaEvaluator;

impl CriteriaEvaluator {
    pub fn evaluate(
        &self,
        job: &JobPosting,
        alert: &JobAlert,
    ) -> Result<CriteriaReport, EvaluationError> {
        rules::validate(alert)?;

        let mut checks = vec![
            rules::check_category(job, alert),
            rules::check_experience(job, alert),
            rules::check_salary_min(job, alert),
            rules::check_salary_max(job, alert),
            rules::check_location(job, alert),
        ];
        checks.extend(rules::check_keywords(job, alert));

        Ok(CriteriaReport::from_checks(checks))
    }
}
