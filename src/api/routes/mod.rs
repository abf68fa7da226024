//! Participant and moderation API under `/api`

pub mod blogs;
pub mod events;
pub mod submissions;
pub mod teams;

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::state::AppState;

/// Create the `/api` router
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        // Events and registration
        .route("/events", post(events::create_event))
        .route("/events/{event_id}", get(events::get_event))
        .route("/events/{event_id}/registrations", post(events::register))
        .route("/events/{event_id}/team", get(events::my_team))
        // Team formation
        .route("/teams", post(teams::create_team))
        .route("/teams/join", post(teams::join_team))
        .route("/teams/{team_id}/lock", post(teams::lock_team))
        .route("/teams/{team_id}/reconcile", post(teams::reconcile_team))
        .route("/teams/{team_id}/members", get(teams::list_members))
        // Project submissions
        .route("/submissions", post(submissions::submit))
        .route("/submissions/{submission_id}", patch(submissions::update_submission))
        // Blog moderation
        .route("/blogs", get(blogs::list_blogs).post(blogs::create_blog))
        .route("/blogs/quota", get(blogs::quota))
        .route(
            "/blogs/{blog_id}",
            get(blogs::get_blog)
                .patch(blogs::update_blog)
                .delete(blogs::delete_blog),
        )
        .route("/blogs/{blog_id}/approve", post(blogs::approve_blog))
        .route("/blogs/{blog_id}/reject", post(blogs::reject_blog))
}
