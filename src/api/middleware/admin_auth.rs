//! Admin authorization extractor

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::auth::Principal;

use super::user_auth::RequireUser;

/// Extractor that requires a verified caller with admin rights
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Principal);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(principal) = RequireUser::from_request_parts(parts, state).await?;

        if !principal.is_admin {
            debug!(user_id = %principal.user_id, "Rejected non-admin caller");
            return Err(ApiError::forbidden("Admin access required"));
        }

        Ok(RequireAdmin(principal))
    }
}
