use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{JobAlert, JobPosting};
use super::evaluation::CriterionCheck;
use super::repository::{AlertRepository, MatchNotifier};
use super::service::AlertMatchingService;

/// Router builder exposing the publish trigger and a scoring preview.
pub fn alert_router<R, N>(service: Arc<AlertMatchingService<R, N>>) -> Router
where
    R: AlertRepository + 'static,
    N: MatchNotifier + 'static,
{
    Router::new()
        .route("/api/v1/jobs/published", post(published_handler::<R, N>))
        .route("/api/v1/alerts/evaluate", post(evaluate_handler::<R, N>))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub job: JobPosting,
    pub alert: JobAlert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub checks: Vec<CriterionCheck>,
    pub total_criteria: usize,
    pub matched_criteria: usize,
    pub match_percentage: f64,
    pub matched: bool,
}

pub(crate) async fn published_handler<R, N>(
    State(service): State<Arc<AlertMatchingService<R, N>>>,
    axum::Json(job): axum::Json<JobPosting>,
) -> Response
where
    R: AlertRepository + 'static,
    N: MatchNotifier + 'static,
{
    if !job.status.is_published() {
        let payload = json!({
            "error": format!("job {} is {}, only active jobs are matched", job.id.0, job.status.label()),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    let job_id = job.id.clone();
    let handle = service.spawn_matching(job);
    let logged_id = job_id.clone();
    tokio::spawn(async move {
        match handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => error!(job_id = %logged_id.0, error = %err, "job alert matching failed"),
            Err(err) => error!(job_id = %logged_id.0, error = %err, "job alert matching task aborted"),
        }
    });

    let payload = json!({
        "job_id": job_id.0,
        "status": "queued",
    });
    (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
}

pub(crate) async fn evaluate_handler<R, N>(
    State(service): State<Arc<AlertMatchingService<R, N>>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response
where
    R: AlertRepository + 'static,
    N: MatchNotifier + 'static,
{
    match service.evaluate_pair(&request.job, &request.alert) {
        Ok((report, score)) => {
            let body = EvaluateResponse {
                checks: report.checks,
                total_criteria: report.total_criteria,
                matched_criteria: report.matched_criteria,
                match_percentage: score.percentage,
                matched: score.matched,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
