use crate::infra::{
    read_json_file, InMemoryAlertRepository, InMemoryMatchNotifier, InMemoryNotificationLedger,
};
use clap::Args;
use job_alerts::config::AppConfig;
use job_alerts::error::AppError;
use job_alerts::workflows::alerts::{
    AlertMatchingService, JobAlert, JobPosting, MatchingSummary, MatchEvent,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// JSON file holding the published job posting
    #[arg(long)]
    pub(crate) job: PathBuf,
    /// JSON file holding an array of job alerts
    #[arg(long)]
    pub(crate) alerts: PathBuf,
    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let job: JobPosting = read_json_file(&args.job)?;
    let alerts: Vec<JobAlert> = read_json_file(&args.alerts)?;

    let (summary, events) = match_job(job, alerts, config)?;

    if args.json {
        let payload = serde_json::json!({ "summary": summary, "events": events });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", render_summary(&summary, &events));
    }
    Ok(())
}

fn match_job(
    job: JobPosting,
    alerts: Vec<JobAlert>,
    config: AppConfig,
) -> Result<(MatchingSummary, Vec<MatchEvent>), AppError> {
    if !job.status.is_published() {
        return Err(AppError::Input(format!(
            "job {} is {}, only active jobs are matched",
            job.id.0,
            job.status.label()
        )));
    }

    let notifier = Arc::new(InMemoryMatchNotifier::default());
    let service = AlertMatchingService::new(
        Arc::new(InMemoryAlertRepository::from_alerts(alerts)),
        notifier.clone(),
        config.matching,
    )
    .with_ledger(Arc::new(InMemoryNotificationLedger::default()));

    let summary = service.on_job_published(&job)?;
    Ok((summary, notifier.events()))
}

fn render_summary(summary: &MatchingSummary, events: &[MatchEvent]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Job {}\n", summary.job_id.0));
    out.push_str(&format!(
        "  evaluated {} alert(s), matched {}, skipped {}\n",
        summary.evaluated,
        summary.matched.len(),
        summary.skipped
    ));
    if summary.deadline_exceeded {
        out.push_str("  soft deadline reached before every alert was evaluated\n");
    }
    for event in events {
        out.push_str(&format!(
            "  - {} ({}) {:.1}% [{:?}]\n",
            event.alert_id.0, event.user_id.0, event.match_percentage, event.alert_frequency
        ));
    }
    if summary.dispatch_failures > 0 {
        out.push_str(&format!(
            "  {} notification(s) failed to dispatch\n",
            summary.dispatch_failures
        ));
    }
    out
}
