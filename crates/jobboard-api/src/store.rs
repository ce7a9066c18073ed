//! Persistence for users, jobs, applications and resumes.
//!
//! Handlers talk to the [`Store`] trait only. [`InMemoryStore`] backs the
//! server and the tests; a relational implementation slots in behind the
//! same trait.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use jobboard_models::{
    Application, ApplicationId, ApplicationStatus, CreateJobRequest, Job, JobFilter, JobId,
    NewUser, Resume, Role, User, UserId,
};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub users: u64,
    pub users_by_role: BTreeMap<String, u64>,
    pub jobs: u64,
    pub applications: u64,
    pub resumes: u64,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    /// Delete a user and everything they own. Returns `false` if absent.
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    async fn create_job(&self, posted_by: UserId, job: CreateJobRequest) -> StoreResult<Job>;
    async fn get_job(&self, id: JobId) -> StoreResult<Option<Job>>;
    /// Newest first.
    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>>;
    /// Delete a job and its applications. Returns `false` if absent.
    async fn delete_job(&self, id: JobId) -> StoreResult<bool>;

    /// Fails with `NotFound` for an unknown job and `Conflict` on a repeat application.
    async fn create_application(
        &self,
        job_id: JobId,
        student_id: UserId,
        cover_letter: Option<String>,
    ) -> StoreResult<Application>;
    async fn get_application(&self, id: ApplicationId) -> StoreResult<Option<Application>>;
    async fn list_applications_for_student(&self, student_id: UserId) -> StoreResult<Vec<Application>>;
    async fn list_applications_for_job(&self, job_id: JobId) -> StoreResult<Vec<Application>>;
    async fn update_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>>;

    async fn get_resume(&self, student_id: UserId) -> StoreResult<Option<Resume>>;
    async fn upsert_resume(&self, resume: Resume) -> StoreResult<Resume>;

    async fn stats(&self) -> StoreResult<StoreStats>;
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, Application>,
    resumes: HashMap<UserId, Resume>,
    next_user_id: i64,
    next_job_id: i64,
    next_application_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// Process-local store guarded by a single async lock.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "An account with email {} already exists",
                user.email
            )));
        }

        let id = Tables::next_id(&mut tables.next_user_id);
        let record = User {
            id,
            name: user.name,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(id, record.clone());
        debug!(user_id = id, role = %record.role, "Created user");
        Ok(record)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }

        let owned_jobs: Vec<JobId> = tables
            .jobs
            .values()
            .filter(|j| j.posted_by == id)
            .map(|j| j.id)
            .collect();
        tables.jobs.retain(|_, j| j.posted_by != id);
        tables
            .applications
            .retain(|_, a| a.student_id != id && !owned_jobs.contains(&a.job_id));
        tables.resumes.remove(&id);

        debug!(user_id = id, removed_jobs = owned_jobs.len(), "Deleted user");
        Ok(true)
    }

    async fn create_job(&self, posted_by: UserId, job: CreateJobRequest) -> StoreResult<Job> {
        let mut tables = self.tables.write().await;
        let id = Tables::next_id(&mut tables.next_job_id);
        let record = Job {
            id,
            title: job.title.trim().to_string(),
            company: job.company.trim().to_string(),
            location: job.location.trim().to_string(),
            description: job.description,
            job_type: job.job_type,
            salary: job.salary,
            posted_by,
            created_at: Utc::now(),
        };
        tables.jobs.insert(id, record.clone());
        Ok(record)
    }

    async fn get_job(&self, id: JobId) -> StoreResult<Option<Job>> {
        Ok(self.tables.read().await.jobs.get(&id).cloned())
    }

    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .values()
            .rev()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect())
    }

    async fn delete_job(&self, id: JobId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.jobs.remove(&id).is_none() {
            return Ok(false);
        }
        tables.applications.retain(|_, a| a.job_id != id);
        Ok(true)
    }

    async fn create_application(
        &self,
        job_id: JobId,
        student_id: UserId,
        cover_letter: Option<String>,
    ) -> StoreResult<Application> {
        let mut tables = self.tables.write().await;
        if !tables.jobs.contains_key(&job_id) {
            return Err(StoreError::NotFound(format!("Job {} not found", job_id)));
        }
        if tables
            .applications
            .values()
            .any(|a| a.job_id == job_id && a.student_id == student_id)
        {
            return Err(StoreError::Conflict("Already applied to this job".to_string()));
        }

        let id = Tables::next_id(&mut tables.next_application_id);
        let record = Application {
            id,
            job_id,
            student_id,
            cover_letter: cover_letter.filter(|c| !c.trim().is_empty()),
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        tables.applications.insert(id, record.clone());
        Ok(record)
    }

    async fn get_application(&self, id: ApplicationId) -> StoreResult<Option<Application>> {
        Ok(self.tables.read().await.applications.get(&id).cloned())
    }

    async fn list_applications_for_student(&self, student_id: UserId) -> StoreResult<Vec<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .values()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn list_applications_for_job(&self, job_id: JobId) -> StoreResult<Vec<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn update_application_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>> {
        let mut tables = self.tables.write().await;
        Ok(tables.applications.get_mut(&id).map(|a| {
            a.status = status;
            a.clone()
        }))
    }

    async fn get_resume(&self, student_id: UserId) -> StoreResult<Option<Resume>> {
        Ok(self.tables.read().await.resumes.get(&student_id).cloned())
    }

    async fn upsert_resume(&self, resume: Resume) -> StoreResult<Resume> {
        let mut tables = self.tables.write().await;
        tables.resumes.insert(resume.student_id, resume.clone());
        Ok(resume)
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        let tables = self.tables.read().await;
        let mut users_by_role: BTreeMap<String, u64> = Role::ALL
            .iter()
            .map(|r| (r.as_str().to_string(), 0))
            .collect();
        for user in tables.users.values() {
            *users_by_role.entry(user.role.as_str().to_string()).or_default() += 1;
        }

        Ok(StoreStats {
            users: tables.users.len() as u64,
            users_by_role,
            jobs: tables.jobs.len() as u64,
            applications: tables.applications.len() as u64,
            resumes: tables.resumes.len() as u64,
        })
    }
}
