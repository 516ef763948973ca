use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The backend only distinguishes these two arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Contract")]
    Contract,
}

impl EmploymentType {
    pub fn label(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::Contract => "Contract",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub employment_type: EmploymentType,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn summary(&self) -> String {
        format!("{} at {}", self.title, self.company)
    }
}

/// Create/update payload for `POST /api/jobs/` and `PUT /api/jobs/{id}/`.
#[derive(Debug, Clone, Serialize)]
pub struct JobInput {
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
    pub tags: Vec<String>,
    pub employment_type: EmploymentType,
}

/// One page of the cursor-paginated listing from `GET /api/jobs/`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobPage {
    #[serde(default)]
    pub count: Option<i64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Job>,
}

impl JobPage {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Result page from the fuzzy search endpoint `GET /api/jobs/search/`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSearchPage {
    pub results: Vec<Job>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_JSON: &str = r#"{
        "id": 7,
        "title": "Platform Engineer",
        "company": "Initech",
        "description": "Keep the lights on.",
        "location": "Remote",
        "tags": ["rust", "sre"],
        "employment_type": "Full-time",
        "created_at": "2025-06-01T09:30:00Z"
    }"#;

    #[test]
    fn test_parse_job() {
        let job: Job = serde_json::from_str(JOB_JSON).expect("Failed to parse job");
        assert_eq!(job.summary(), "Platform Engineer at Initech");
        assert_eq!(job.employment_type, EmploymentType::FullTime);
        assert_eq!(job.tags, vec!["rust", "sre"]);
    }

    #[test]
    fn test_parse_last_page() {
        let json = format!(
            r#"{{"count": 1, "next": null, "previous": "http://x/api/jobs/?page=1", "results": [{}]}}"#,
            JOB_JSON
        );
        let page: JobPage = serde_json::from_str(&json).expect("Failed to parse job page");
        assert!(!page.has_next());
        assert_eq!(page.results.len(), 1);
    }

    #[test]
    fn test_employment_type_wire_names() {
        // The backend stores the display strings verbatim, dashes included
        let ft = serde_json::to_string(&EmploymentType::FullTime).expect("serialize");
        assert_eq!(ft, "\"Full-time\"");
        let parsed: EmploymentType =
            serde_json::from_str("\"Contract\"").expect("Failed to parse employment type");
        assert_eq!(parsed, EmploymentType::Contract);
    }
}
