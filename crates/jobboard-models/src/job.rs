//! Job postings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::UserId;

/// Job ID type.
pub type JobId = i64;

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
    Contract,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full_time",
            JobType::PartTime => "part_time",
            JobType::Internship => "internship",
            JobType::Contract => "contract",
        }
    }
}

/// A job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub job_type: JobType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    /// Account that posted the job.
    pub posted_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Create job request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(min = 1, max = 10000))]
    pub description: String,
    #[serde(default)]
    pub job_type: JobType,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub salary: Option<String>,
}

/// Query filters for listing jobs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    /// Case-insensitive match against title, company and description.
    #[serde(default)]
    pub q: Option<String>,
    /// Case-insensitive substring of the location.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let hit = job.title.to_lowercase().contains(&q)
                || job.company.to_lowercase().contains(&q)
                || job.description.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        if let Some(location) = self.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            if !job.location.to_lowercase().contains(&location.to_lowercase()) {
                return false;
            }
        }
        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }
        true
    }
}
