use crate::cli::ServeArgs;
use crate::infra::{
    read_json_file, AppState, InMemoryAlertRepository, InMemoryNotificationLedger,
};
use crate::routes::with_alert_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_alerts::config::AppConfig;
use job_alerts::error::AppError;
use job_alerts::telemetry;
use job_alerts::workflows::alerts::{
    AlertMatchingService, JobAlert, NotificationWorker, QueuedNotifier, TracingSink,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (notifier, receiver) = QueuedNotifier::channel(config.matching.dispatch_queue_capacity);
    tokio::spawn(NotificationWorker::new(receiver, Arc::new(TracingSink)).run());

    let alerts: Vec<JobAlert> = match args.alerts.take() {
        Some(path) => read_json_file(&path)?,
        None => Vec::new(),
    };
    info!(seeded_alerts = alerts.len(), "alert store initialised");
    let repository = Arc::new(InMemoryAlertRepository::from_alerts(alerts));
    let matching_service = Arc::new(
        AlertMatchingService::new(repository, Arc::new(notifier), config.matching.clone())
            .with_ledger(Arc::new(InMemoryNotificationLedger::default())),
    );

    let app = with_alert_routes(matching_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, renotify = ?config.matching.renotify, "job alert matcher ready");

    axum::serve(listener, app).await?;
    Ok(())
}
