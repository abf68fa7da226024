//! Project submission endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::submission::{
    ProjectLinks, Submission, SubmissionId, SubmissionPatch, SubmissionStatus,
};
use crate::infrastructure::submission::SubmitRequest;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitApiRequest {
    pub event_id: String,
    #[serde(default)]
    pub team_id: Option<String>,
    pub project_title: String,
    pub project_description: String,
    #[serde(flatten)]
    pub links: ProjectLinks,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub id: String,
    pub event_id: String,
    pub team_id: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub project_title: String,
    pub project_description: String,
    #[serde(flatten)]
    pub links: ProjectLinks,
    pub technologies: Vec<String>,
    pub status: SubmissionStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Submission> for SubmissionResponse {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id().as_str().to_string(),
            event_id: submission.event_id().as_str().to_string(),
            team_id: submission.team_id().map(|id| id.as_str().to_string()),
            user_id: submission.user_id().to_string(),
            user_name: submission.user_name().to_string(),
            project_title: submission.project_title().to_string(),
            project_description: submission.project_description().to_string(),
            links: submission.links().clone(),
            technologies: submission.technologies().to_vec(),
            status: submission.status(),
            created_at: submission.created_at().to_rfc3339(),
            updated_at: submission.updated_at().to_rfc3339(),
        }
    }
}

/// POST /api/submissions
pub async fn submit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<SubmitApiRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    debug!(
        event_id = %request.event_id,
        team_id = ?request.team_id,
        user_id = %user.user_id,
        "Submitting project"
    );

    let submission = state
        .submissions
        .submit(SubmitRequest {
            event_id: request.event_id,
            team_id: request.team_id,
            user_id: user.user_id,
            user_name: user.name,
            project_title: request.project_title,
            project_description: request.project_description,
            links: request.links,
            technologies: request.technologies,
        })
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(&submission))))
}

/// PATCH /api/submissions/{submission_id}
pub async fn update_submission(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(submission_id): Path<String>,
    Json(patch): Json<SubmissionPatch>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = state
        .submissions
        .update(&SubmissionId::new(submission_id), patch, &user)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SubmissionResponse::from(&submission)))
}
