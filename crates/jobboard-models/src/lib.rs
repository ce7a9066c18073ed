//! Shared data models for the job board backend.
//!
//! This crate provides Serde-serializable types for:
//! - Roles and verified identities
//! - User accounts
//! - Job postings and applications
//! - Student resumes

pub mod application;
pub mod job;
pub mod resume;
pub mod role;
pub mod user;

pub use application::{
    Application, ApplicationId, ApplicationStatus, ApplyRequest, UpdateApplicationStatusRequest,
};
pub use job::{CreateJobRequest, Job, JobFilter, JobId, JobType};
pub use resume::{Education, Experience, Resume, ResumeUpdate};
pub use role::{Role, UnknownRole, UserId, VerifiedIdentity};
pub use user::{
    normalize_email, AuthResponse, LoginRequest, NewUser, SignupRequest, User, UserProfile,
};
