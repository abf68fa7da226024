//! HS256 bearer token verification

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::auth::{AdminPolicy, AnyAdminPolicy, IdentityVerifier, Principal};
use crate::domain::DomainError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(principal: &Principal, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: principal.user_id.clone(),
            email: principal.email.clone(),
            name: principal.name.clone(),
            roles: principal.roles.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Configuration for JWT verification
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret
    pub secret: String,
    /// Lifetime of tokens issued by [`JwtIdentityVerifier::issue`]
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// Verifies HS256 tokens and derives admin rights from the configured policy
#[derive(Clone)]
pub struct JwtIdentityVerifier {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    policy: Arc<dyn AdminPolicy>,
}

impl Debug for JwtIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityVerifier")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("secret", &"[hidden]")
            .field("policy", &self.policy)
            .finish()
    }
}

impl JwtIdentityVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            policy: Arc::new(AnyAdminPolicy::new()),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn AdminPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Signs a token for the principal. Used by local tooling and tests.
    pub fn issue(&self, principal: &Principal) -> Result<String, DomainError> {
        let claims = JwtClaims::new(principal, self.config.expiration_hours);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign JWT: {}", e)))
    }

    fn decode_claims(&self, token: &str) -> Result<JwtClaims, DomainError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::authentication(format!("Invalid token: {}", e)))
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<Principal, DomainError> {
        let claims = self.decode_claims(credential)?;

        if claims.sub.trim().is_empty() || claims.email.trim().is_empty() {
            return Err(DomainError::authentication("Token is missing subject or email"));
        }

        let principal =
            Principal::new(claims.sub, claims.email, claims.name).with_roles(claims.roles);
        let is_admin = self.policy.is_admin(&principal);

        Ok(principal.with_admin(is_admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::{EmailAllowListPolicy, RoleLabelPolicy};

    fn verifier() -> JwtIdentityVerifier {
        JwtIdentityVerifier::new(JwtConfig::new("test-secret", 24)).with_policy(Arc::new(
            AnyAdminPolicy::new()
                .with(RoleLabelPolicy::new("admin"))
                .with(EmailAllowListPolicy::new(["boss@example.com"])),
        ))
    }

    #[tokio::test]
    async fn test_issue_and_verify() {
        let verifier = verifier();
        let principal = Principal::new("u1", "u1@example.com", "User One");

        let token = verifier.issue(&principal).unwrap();
        let verified = verifier.verify(&token).await.unwrap();

        assert_eq!(verified.user_id, "u1");
        assert_eq!(verified.email, "u1@example.com");
        assert_eq!(verified.name, "User One");
        assert!(!verified.is_admin);
    }

    #[tokio::test]
    async fn test_admin_from_role_label() {
        let verifier = verifier();
        let principal = Principal::new("u1", "u1@example.com", "Admin")
            .with_roles(vec!["Admin".to_string()]);

        let token = verifier.issue(&principal).unwrap();
        assert!(verifier.verify(&token).await.unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_admin_from_email_list() {
        let verifier = verifier();
        let principal = Principal::new("u2", "Boss@Example.com", "Boss");

        let token = verifier.issue(&principal).unwrap();
        assert!(verifier.verify(&token).await.unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_admin_flag_in_token_is_ignored() {
        let verifier = verifier();
        let principal = Principal::new("u3", "u3@example.com", "Sneaky").with_admin(true);

        let token = verifier.issue(&principal).unwrap();
        assert!(!verifier.verify(&token).await.unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let other = JwtIdentityVerifier::new(JwtConfig::new("other-secret", 24));
        let token = other
            .issue(&Principal::new("u1", "u1@example.com", "User"))
            .unwrap();

        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, DomainError::Authentication { .. }));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let past = Utc::now() - Duration::hours(2);
        let claims = JwtClaims {
            sub: "u1".to_string(),
            email: "u1@example.com".to_string(),
            name: String::new(),
            roles: Vec::new(),
            iat: (past - Duration::hours(1)).timestamp(),
            exp: past.timestamp(),
        };
        assert!(claims.is_expired());

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(verifier().verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        assert!(verifier().verify("not-a-jwt").await.is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", verifier());
        assert!(!debug.contains("test-secret"));
    }
}
