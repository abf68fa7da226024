//! Team validation

use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },

    #[error("Team description cannot exceed {0} characters")]
    DescriptionTooLong(usize),

    #[error("Team size must be between {min} and {max}")]
    InvalidMaxSize { min: u32, max: u32 },

    #[error("Invite code must be {0} characters")]
    InviteCodeLength(usize),

    #[error("Invite code contains invalid characters")]
    InviteCodeCharacters,

    #[error("{0} is required")]
    MissingField(&'static str),
}

pub const MIN_TEAM_NAME_LENGTH: usize = 3;
pub const MAX_TEAM_NAME_LENGTH: usize = 50;
pub const MAX_TEAM_DESCRIPTION_LENGTH: usize = 500;
pub const MIN_TEAM_SIZE: u32 = 1;
pub const MAX_TEAM_SIZE: u32 = 10;
pub const DEFAULT_TEAM_SIZE: u32 = 5;

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    let length = name.trim().chars().count();

    if !(MIN_TEAM_NAME_LENGTH..=MAX_TEAM_NAME_LENGTH).contains(&length) {
        return Err(TeamValidationError::NameLength {
            min: MIN_TEAM_NAME_LENGTH,
            max: MAX_TEAM_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validate an optional team description
pub fn validate_team_description(description: Option<&str>) -> Result<(), TeamValidationError> {
    match description {
        Some(d) if d.chars().count() > MAX_TEAM_DESCRIPTION_LENGTH => Err(
            TeamValidationError::DescriptionTooLong(MAX_TEAM_DESCRIPTION_LENGTH),
        ),
        _ => Ok(()),
    }
}

/// Validate the maximum team size
pub fn validate_max_size(max_size: u32) -> Result<(), TeamValidationError> {
    if !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&max_size) {
        return Err(TeamValidationError::InvalidMaxSize {
            min: MIN_TEAM_SIZE,
            max: MAX_TEAM_SIZE,
        });
    }

    Ok(())
}

/// Validate that a required field is present
pub fn require(field: &'static str, value: &str) -> Result<(), TeamValidationError> {
    if value.trim().is_empty() {
        return Err(TeamValidationError::MissingField(field));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_team_name() {
        assert!(validate_team_name("Rustaceans").is_ok());
        assert!(validate_team_name("abc").is_ok());
        assert!(validate_team_name(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn test_team_name_bounds() {
        assert!(validate_team_name("ab").is_err());
        assert!(validate_team_name("   ab   ").is_err());
        assert!(validate_team_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_max_size_bounds() {
        assert!(validate_max_size(1).is_ok());
        assert!(validate_max_size(10).is_ok());
        assert_eq!(
            validate_max_size(0),
            Err(TeamValidationError::InvalidMaxSize { min: 1, max: 10 })
        );
        assert!(validate_max_size(11).is_err());
    }

    #[test]
    fn test_description_length() {
        assert!(validate_team_description(None).is_ok());
        assert!(validate_team_description(Some(&"d".repeat(500))).is_ok());
        assert!(validate_team_description(Some(&"d".repeat(501))).is_err());
    }

    #[test]
    fn test_require() {
        assert!(require("leader_id", "u1").is_ok());
        assert_eq!(
            require("leader_id", "  "),
            Err(TeamValidationError::MissingField("leader_id"))
        );
    }
}
