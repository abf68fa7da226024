//! Authentication and authorization domain
//!
//! Credentials are checked by an external verifier. This module only models
//! what the verifier hands back and how admin privilege is derived from it.

mod policy;
mod principal;

use async_trait::async_trait;

use crate::domain::DomainError;

pub use policy::{AdminPolicy, AnyAdminPolicy, EmailAllowListPolicy, RoleLabelPolicy};
pub use principal::Principal;

/// Resolves a bearer credential into a verified identity
#[async_trait]
pub trait IdentityVerifier: Send + Sync + std::fmt::Debug {
    async fn verify(&self, credential: &str) -> Result<Principal, DomainError>;
}
