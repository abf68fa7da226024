//! Infrastructure layer - storage backends, coordinators and collaborators

pub mod auth;
pub mod blog;
pub mod counter;
pub mod logging;
pub mod notification;
pub mod rate_limit;
pub mod registration;
pub mod storage;
pub mod submission;
pub mod team;
