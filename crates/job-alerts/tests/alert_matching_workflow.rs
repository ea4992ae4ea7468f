//! Integration scenarios for publishing a job and fanning it out to matching alerts.
//!
//! Scenarios go through the public service facade so scoring, threshold and dispatch are
//! validated together.

mod common {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use job_alerts::workflows::alerts::{
        AlertFrequency, AlertId, AlertMatchingService, AlertRepository, AlertStatus,
        DispatchError, JobAlert, JobId, JobPosting, JobStatus, MatchEvent, MatchNotifier,
        MatchingSettings, RepositoryError, UserId,
    };

    pub(super) fn job() -> JobPosting {
        JobPosting {
            id: JobId("job-kathmandu-1".to_string()),
            title: "Backend Engineer".to_string(),
            description: "Go and Python".to_string(),
            department: "engineering".to_string(),
            experience_level: "Mid Level".to_string(),
            salary_min: Some(60_000.0),
            salary_max: Some(90_000.0),
            location: "Kathmandu".to_string(),
            status: JobStatus::Active,
        }
    }

    pub(super) fn empty_alert(id: &str) -> JobAlert {
        JobAlert {
            id: AlertId(id.to_string()),
            user_id: UserId(format!("seeker-{id}")),
            job_category: None,
            experience_level: None,
            salary_min: None,
            salary_max: None,
            location: None,
            keywords: None,
            status: AlertStatus::Active,
            alert_frequency: AlertFrequency::Daily,
        }
    }

    #[derive(Default)]
    pub(super) struct Store {
        alerts: Mutex<BTreeMap<AlertId, JobAlert>>,
    }

    impl Store {
        pub(super) fn insert(&self, alert: JobAlert) {
            self.alerts
                .lock()
                .expect("store mutex poisoned")
                .insert(alert.id.clone(), alert);
        }
    }

    impl AlertRepository for Store {
        fn active_page(
            &self,
            after: Option<&AlertId>,
            limit: usize,
        ) -> Result<Vec<JobAlert>, RepositoryError> {
            let guard = self.alerts.lock().expect("store mutex poisoned");
            Ok(guard
                .values()
                .filter(|alert| alert.status == AlertStatus::Active)
                .filter(|alert| after.map_or(true, |cursor| &alert.id > cursor))
                .take(limit)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct Outbox {
        events: Mutex<Vec<MatchEvent>>,
    }

    impl Outbox {
        pub(super) fn events(&self) -> Vec<MatchEvent> {
            self.events.lock().expect("outbox mutex poisoned").clone()
        }
    }

    impl MatchNotifier for Outbox {
        fn dispatch(&self, event: &MatchEvent) -> Result<(), DispatchError> {
            self.events
                .lock()
                .expect("outbox mutex poisoned")
                .push(event.clone());
            Ok(())
        }
    }

    pub(super) fn service(
        alerts: Vec<JobAlert>,
    ) -> (AlertMatchingService<Store, Outbox>, Arc<Outbox>) {
        let store = Arc::new(Store::default());
        for alert in alerts {
            store.insert(alert);
        }
        let outbox = Arc::new(Outbox::default());
        let service = AlertMatchingService::new(store, outbox.clone(), MatchingSettings::default());
        (service, outbox)
    }
}

use common::*;
use job_alerts::workflows::alerts::{AlertId, Criterion, JobAlert};

fn percentage_for(alert_id: &str, summary: &job_alerts::workflows::alerts::MatchingSummary) -> f64 {
    summary
        .matched
        .iter()
        .find(|result| result.alert_id == AlertId(alert_id.to_string()))
        .map(|result| result.match_percentage)
        .unwrap_or_else(|| panic!("{alert_id} should have matched"))
}

#[test]
fn fully_aligned_alert_scores_one_hundred_percent() {
    let alert = JobAlert {
        job_category: Some("engineering".to_string()),
        experience_level: Some("Mid Level".to_string()),
        salary_min: Some(50_000.0),
        salary_max: Some(100_000.0),
        location: Some("Kathmandu".to_string()),
        keywords: Some("golang,python".to_string()),
        ..empty_alert("alert-a")
    };
    let (service, outbox) = service(vec![alert]);

    let summary = service.on_job_published(&job()).expect("pass completes");

    assert_eq!(percentage_for("alert-a", &summary), 100.0);
    assert_eq!(outbox.events().len(), 1);
}

#[test]
fn category_mismatch_scores_eighty_percent_and_still_notifies() {
    let alert = JobAlert {
        job_category: Some("marketing".to_string()),
        ..empty_alert("alert-b")
    };
    let (service, outbox) = service(vec![alert.clone()]);

    let (report, score) = service
        .evaluate_pair(&job(), &alert)
        .expect("pair evaluates");
    assert_eq!(report.total_criteria, 5);
    assert!(report.check(Criterion::Keywords).is_none());

    let summary = service.on_job_published(&job()).expect("pass completes");

    assert_eq!(score.percentage, 80.0);
    assert_eq!(percentage_for("alert-b", &summary), 80.0);
    assert_eq!(outbox.events()[0].alert_id, AlertId("alert-b".to_string()));
}

#[test]
fn absent_job_salary_ceiling_lowers_the_score_by_one_criterion() {
    let mut job = job();
    job.salary_max = None;
    let alert = JobAlert {
        salary_max: Some(80_000.0),
        ..empty_alert("alert-c")
    };
    let (service, _) = service(vec![alert]);

    let summary = service.on_job_published(&job).expect("pass completes");

    assert_eq!(percentage_for("alert-c", &summary), 80.0);
}

#[test]
fn scores_below_threshold_are_not_notified() {
    let alert = JobAlert {
        job_category: Some("finance".to_string()),
        experience_level: Some("Entry".to_string()),
        salary_min: Some(120_000.0),
        location: Some("Lalitpur".to_string()),
        keywords: Some("excel".to_string()),
        ..empty_alert("alert-d")
    };
    let (service, outbox) = service(vec![alert, empty_alert("alert-e")]);

    let summary = service.on_job_published(&job()).expect("pass completes");

    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.matched.len(), 1);
    assert_eq!(outbox.events().len(), 1);
    assert_eq!(outbox.events()[0].alert_id, AlertId("alert-e".to_string()));
}
