//! Submission domain module

mod entity;
mod validation;

pub use entity::{ProjectLinks, Submission, SubmissionId, SubmissionPatch, SubmissionStatus};
pub use validation::{
    validate_link, validate_project_description, validate_project_title,
    SubmissionValidationError, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, MIN_DESCRIPTION_LENGTH,
    MIN_TITLE_LENGTH,
};
