//! Team invite codes

use serde::{Deserialize, Serialize};

use super::validation::TeamValidationError;

/// Uppercase letters and digits without the look-alikes I, O, 0 and 1
pub const INVITE_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const INVITE_CODE_LENGTH: usize = 6;

/// Short token that resolves to exactly one team
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

impl InviteCode {
    /// Parses user input: surrounding whitespace is trimmed and case ignored
    pub fn parse(input: &str) -> Result<Self, TeamValidationError> {
        let code = input.trim().to_ascii_uppercase();

        if code.chars().count() != INVITE_CODE_LENGTH {
            return Err(TeamValidationError::InviteCodeLength(INVITE_CODE_LENGTH));
        }

        if !code.bytes().all(|b| INVITE_CODE_ALPHABET.contains(&b)) {
            return Err(TeamValidationError::InviteCodeCharacters);
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InviteCode {
    type Error = TeamValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InviteCode> for String {
    fn from(code: InviteCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for InviteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
