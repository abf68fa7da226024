//! Invite code generation

use rand::rngs::OsRng;
use rand::Rng;

use crate::domain::team::{InviteCode, INVITE_CODE_ALPHABET, INVITE_CODE_LENGTH};
use crate::domain::DomainError;

/// Source of candidate invite codes
pub trait InviteCodeGenerator: Send + Sync + std::fmt::Debug {
    fn generate(&self) -> Result<InviteCode, DomainError>;
}

/// Draws codes from the operating system's CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomInviteCodes;

impl InviteCodeGenerator for RandomInviteCodes {
    fn generate(&self) -> Result<InviteCode, DomainError> {
        let mut rng = OsRng;
        let code: String = (0..INVITE_CODE_LENGTH)
            .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
            .collect();

        InviteCode::parse(&code)
            .map_err(|e| DomainError::internal(format!("Generated invalid invite code: {}", e)))
    }
}
