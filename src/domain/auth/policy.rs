//! Admin authorization policies
//!
//! Privilege can come from a role label on the verified identity or from an
//! email allow-list. Both sit behind [`AdminPolicy`] so call sites only ever
//! read `Principal::is_admin`.

use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use super::principal::Principal;

/// Decides whether a verified identity holds admin privilege
pub trait AdminPolicy: Send + Sync + Debug {
    fn is_admin(&self, principal: &Principal) -> bool;
}

/// Grants admin to identities carrying a role label
#[derive(Debug, Clone)]
pub struct RoleLabelPolicy {
    role: String,
}

impl RoleLabelPolicy {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl AdminPolicy for RoleLabelPolicy {
    fn is_admin(&self, principal: &Principal) -> bool {
        principal.has_role(&self.role)
    }
}

/// Grants admin to identities whose verified email is allow-listed
#[derive(Debug, Clone, Default)]
pub struct EmailAllowListPolicy {
    emails: HashSet<String>,
}

impl EmailAllowListPolicy {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }
}

impl AdminPolicy for EmailAllowListPolicy {
    fn is_admin(&self, principal: &Principal) -> bool {
        self.emails.contains(&principal.email.trim().to_lowercase())
    }
}

/// Grants admin when any inner policy does
#[derive(Debug, Clone, Default)]
pub struct AnyAdminPolicy {
    policies: Vec<Arc<dyn AdminPolicy>>,
}

impl AnyAdminPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, policy: impl AdminPolicy + 'static) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }
}

impl AdminPolicy for AnyAdminPolicy {
    fn is_admin(&self, principal: &Principal) -> bool {
        self.policies.iter().any(|p| p.is_admin(principal))
    }
}
