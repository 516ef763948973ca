//! Data models for the job board API.
//!
//! This module contains the typed records exchanged with the backend:
//!
//! - `UserProfile`, `UserType`, `LoginTokens`: account identity and auth
//! - `Job`, `JobPage`, `JobSearchPage`: listings and pagination
//! - `JobApplication`: a user's application to a job
//! - `Cv`: uploaded CV metadata

pub mod application;
pub mod cv;
pub mod job;
pub mod user;

pub use application::JobApplication;
pub use cv::Cv;
pub use job::{EmploymentType, Job, JobInput, JobPage, JobSearchPage};
pub use user::{LoginTokens, NewUser, ProfileUpdate, UserProfile, UserType};
