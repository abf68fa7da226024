//! Submission validation

use thiserror::Error;
use validator::ValidateUrl;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubmissionValidationError {
    #[error("Project title must be between {min} and {max} characters")]
    TitleLength { min: usize, max: usize },

    #[error("Project description must be between {min} and {max} characters")]
    DescriptionLength { min: usize, max: usize },

    #[error("{field} must be a valid http(s) URL")]
    InvalidUrl { field: &'static str },

    #[error("{0} is required")]
    MissingField(&'static str),
}

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MIN_DESCRIPTION_LENGTH: usize = 50;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

pub fn validate_project_title(title: &str) -> Result<(), SubmissionValidationError> {
    let length = title.trim().chars().count();

    if !(MIN_TITLE_LENGTH..=MAX_TITLE_LENGTH).contains(&length) {
        return Err(SubmissionValidationError::TitleLength {
            min: MIN_TITLE_LENGTH,
            max: MAX_TITLE_LENGTH,
        });
    }

    Ok(())
}

pub fn validate_project_description(description: &str) -> Result<(), SubmissionValidationError> {
    let length = description.trim().chars().count();

    if !(MIN_DESCRIPTION_LENGTH..=MAX_DESCRIPTION_LENGTH).contains(&length) {
        return Err(SubmissionValidationError::DescriptionLength {
            min: MIN_DESCRIPTION_LENGTH,
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    Ok(())
}

/// An absent link is fine; a present one must be an absolute http(s) URL
pub fn validate_link(
    field: &'static str,
    url: Option<&str>,
) -> Result<(), SubmissionValidationError> {
    let Some(url) = url else {
        return Ok(());
    };

    let url = url.trim();
    let http = url.starts_with("http://") || url.starts_with("https://");

    if !http || !url.validate_url() {
        return Err(SubmissionValidationError::InvalidUrl { field });
    }

    Ok(())
}
