//! Hides dependency failure details from clients

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::api::types::error::GENERIC_INTERNAL_MESSAGE;
use crate::api::types::{ApiError, DependencyFailure};

/// Replace the body of dependency failures with a generic message
///
/// The original error was already logged when it was converted. Setting
/// `server.expose_internal_errors` keeps the detailed message.
pub async fn mask_internal_errors(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if state.expose_internal_errors || response.extensions().get::<DependencyFailure>().is_none() {
        return response;
    }

    ApiError::internal(GENERIC_INTERNAL_MESSAGE).into_response()
}
