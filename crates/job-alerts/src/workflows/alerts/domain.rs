use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for saved job alerts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlertId(pub String);

/// Jobseeker owning an alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Publication state of a posting. Only `Active` postings are eligible for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Active,
    Inactive,
    Closed,
}

impl JobStatus {
    pub fn is_published(self) -> bool {
        matches!(self, JobStatus::Active)
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Active => "active",
            JobStatus::Inactive => "inactive",
            JobStatus::Closed => "closed",
        }
    }
}

/// Read-only snapshot of the posting fields consumed by matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub department: String,
    pub experience_level: String,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub location: String,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Paused,
    Expired,
}

impl AlertStatus {
    pub fn label(self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Paused => "paused",
            AlertStatus::Expired => "expired",
        }
    }
}

/// Delivery cadence requested by the alert owner. Batching is the notification system's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
    Daily,
    Weekly,
    Monthly,
}

/// Saved search a jobseeker wants to be notified about. Unset fields place no constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAlert {
    pub id: AlertId,
    pub user_id: UserId,
    #[serde(default)]
    pub job_category: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    pub status: AlertStatus,
    pub alert_frequency: AlertFrequency,
}

impl JobAlert {
    /// Alert with no filters, owned by `user_id`.
    pub fn open(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: AlertId(id.into()),
            user_id: UserId(user_id.into()),
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

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Comma separated keywords, trimmed, with empty tokens dropped.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|keyword| !keyword.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Treats blank strings the same as an absent value.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
