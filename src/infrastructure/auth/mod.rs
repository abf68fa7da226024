//! Authentication infrastructure module
//!
//! Bearer tokens are verified here and turned into a [`Principal`].
//!
//! [`Principal`]: crate::domain::auth::Principal

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtIdentityVerifier};
