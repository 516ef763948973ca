use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's application to a job, as returned by the apply and
/// applicants endpoints. The `user_email`/`job_title`/`cv_url` fields
/// are denormalized by the backend for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: i64,
    pub user: i64,
    pub user_email: String,
    pub job: i64,
    pub job_title: String,
    pub cv: Option<i64>,
    pub cv_url: Option<String>,
    pub applied_at: DateTime<Utc>,
}
