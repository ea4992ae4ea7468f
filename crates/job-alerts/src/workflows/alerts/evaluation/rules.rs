use super::super::domain::{non_blank, JobAlert, JobPosting};
use super::{Criterion, CriterionCheck, EvaluationError};

/// Rejects alerts the evaluator cannot score. Odd job-side salaries only fail the salary
/// criteria they feed.
pub(crate) fn validate(alert: &JobAlert) -> Result<(), EvaluationError> {
    if !alert.is_active() {
        return Err(EvaluationError::InactiveAlert {
            status: alert.status.label(),
        });
    }

    for (field, value) in [
        ("alert.salary_min", alert.salary_min),
        ("alert.salary_max", alert.salary_max),
    ] {
        if let Some(value) = value {
            if !value.is_finite() {
                return Err(EvaluationError::InvalidSalary { field, value });
            }
        }
    }

    Ok(())
}

pub(crate) fn check_category(job: &JobPosting, alert: &JobAlert) -> CriterionCheck {
    text_equality(Criterion::Category, &job.department, &alert.job_category)
}

pub(crate) fn check_experience(job: &JobPosting, alert: &JobAlert) -> CriterionCheck {
    text_equality(
        Criterion::ExperienceLevel,
        &job.experience_level,
        &alert.experience_level,
    )
}

/// Exact equality after lowercasing both sides; surrounding whitespace is significant.
fn text_equality(criterion: Criterion, job_value: &str, wanted: &Option<String>) -> CriterionCheck {
    match wanted.as_deref() {
        Some(wanted) if !wanted.trim().is_empty() => CriterionCheck {
            criterion,
            matched: job_value.to_lowercase() == wanted.to_lowercase(),
            detail: format!("job '{job_value}' vs alert '{wanted}'"),
        },
        _ => CriterionCheck::unconstrained(criterion),
    }
}

fn salary_check(
    criterion: Criterion,
    offered: Option<f64>,
    bound: f64,
    within: fn(f64, f64) -> bool,
) -> CriterionCheck {
    let label = criterion.label();
    match offered {
        Some(offered) if offered.is_finite() => CriterionCheck {
            criterion,
            matched: within(offered, bound),
            detail: format!("job {label} {offered} vs alert {label} {bound}"),
        },
        Some(offered) => CriterionCheck {
            criterion,
            matched: false,
            detail: format!("job {label} {offered} is not a usable amount"),
        },
        None => CriterionCheck {
            criterion,
            matched: false,
            detail: format!("job has no {label}; alert sets {bound}"),
        },
    }
}

pub(crate) fn check_salary_min(job: &JobPosting, alert: &JobAlert) -> CriterionCheck {
    match alert.salary_min {
        None => CriterionCheck::unconstrained(Criterion::SalaryMin),
        Some(floor) => salary_check(Criterion::SalaryMin, job.salary_min, floor, |offered, floor| {
            offered >= floor
        }),
    }
}

pub(crate) fn check_salary_max(job: &JobPosting, alert: &JobAlert) -> CriterionCheck {
    match alert.salary_max {
        None => CriterionCheck::unconstrained(Criterion::SalaryMax),
        Some(ceiling) => {
            salary_check(Criterion::SalaryMax, job.salary_max, ceiling, |offered, ceiling| {
                offered <= ceiling
            })
        }
    }
}

pub(crate) fn check_location(job: &JobPosting, alert: &JobAlert) -> CriterionCheck {
    match non_blank(&alert.location) {
        None => CriterionCheck::unconstrained(Criterion::Location),
        Some(wanted) => CriterionCheck {
            criterion: Criterion::Location,
            matched: job.location.to_lowercase().contains(&wanted.to_lowercase()),
            detail: format!("job '{}' contains '{}'", job.location, wanted),
        },
    }
}

/// `None` when the alert's keyword text is blank; the criterion is then not counted at all.
/// Text made only of separators is counted and fails.
pub(crate) fn check_keywords(job: &JobPosting, alert: &JobAlert) -> Option<CriterionCheck> {
    non_blank(&alert.keywords)?;
    let keywords = alert.keyword_list();

    let title = job.title.to_lowercase();
    let description = job.description.to_lowercase();
    let found: Vec<&str> = keywords
        .iter()
        .copied()
        .filter(|keyword| {
            let needle = keyword.to_lowercase();
            title.contains(&needle) || description.contains(&needle)
        })
        .collect();

    let detail = if keywords.is_empty() {
        "alert keywords contain no usable token".to_string()
    } else if found.is_empty() {
        format!("none of [{}] found", keywords.join(", "))
    } else {
        format!("found [{}]", found.join(", "))
    };

    Some(CriterionCheck {
        criterion: Criterion::Keywords,
        matched: !found.is_empty(),
        detail,
    })
}
