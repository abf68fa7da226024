//! Hackathon submissions

mod service;

pub use service::{SubmissionWorkflow, SubmitRequest};
