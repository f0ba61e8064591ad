//! Helpdesk Core — domain models, error taxonomy, repository traits,
//! and the role-based authorization guard.

pub mod authz;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{HelpdeskError, HelpdeskResult};
