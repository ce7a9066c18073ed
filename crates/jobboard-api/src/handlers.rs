//! Request handlers.

pub mod account;
pub mod admin;
pub mod applications;
pub mod health;
pub mod jobs;
pub mod resume;

pub use health::*;
