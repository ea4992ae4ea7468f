use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::workflows::alerts::domain::JobStatus;
use crate::workflows::alerts::router::{evaluate_handler, EvaluateRequest};
use crate::workflows::alerts::alert_router;

fn json_request(uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serializable body"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn published_route_queues_matching_and_dispatches() {
    let (service, _, notifier) = build_service(vec![full_alert("alert-a"), alert("alert-b")]);
    let router = alert_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "/api/v1/jobs/published",
            serde_json::to_value(backend_job()).expect("job serializes"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "job_id": "job-100", "status": "queued" }));

    for _ in 0..100 {
        if notifier.events().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(notifier.events().len(), 2);
}

#[tokio::test]
async fn published_route_rejects_unpublished_jobs() {
    let (service, repository, notifier) = build_service(vec![alert("alert-a")]);
    let router = alert_router(Arc::new(service));
    let mut job = backend_job();
    job.status = JobStatus::Draft;

    let response = router
        .oneshot(json_request(
            "/api/v1/jobs/published",
            serde_json::to_value(job).expect("job serializes"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("draft"));
    assert_eq!(repository.page_requests(), 0);
    assert!(notifier.events().is_empty());
}

#[tokio::test]
async fn evaluate_route_reports_criteria() {
    let (service, _, notifier) = build_service(Vec::new());
    let router = alert_router(Arc::new(service));
    let mut alert = alert("alert-preview");
    alert.job_category = Some("marketing".to_string());

    let response = router
        .oneshot(json_request(
            "/api/v1/alerts/evaluate",
            json!({ "job": backend_job(), "alert": alert }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["total_criteria"], json!(5));
    assert_eq!(payload["matched_criteria"], json!(4));
    assert_eq!(payload["match_percentage"], json!(80.0));
    assert_eq!(payload["matched"], json!(true));
    assert_eq!(payload["checks"][0]["criterion"], json!("category"));
    assert_eq!(payload["checks"][0]["matched"], json!(false));
    assert!(notifier.events().is_empty(), "preview never dispatches");
}

#[tokio::test]
async fn evaluate_handler_returns_unprocessable_for_malformed_alerts() {
    let (service, _, _) = build_service(Vec::new());

    let response = evaluate_handler::<MemoryAlerts, MemoryNotifier>(
        State(Arc::new(service)),
        axum::Json(EvaluateRequest {
            job: backend_job(),
            alert: malformed_alert("alert-bad"),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("alert.salary_min"));
}
