//! Hackathon team endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{RequireAdmin, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::team::{HackathonTeam, TeamId, TeamMember};
use crate::infrastructure::team::{CreateTeamRequest, JoinTeamRequest};

/// Request to create a team led by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamApiRequest {
    pub event_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinTeamApiRequest {
    pub invite_code: String,
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Team as seen by participants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub description: Option<String>,
    pub leader_id: String,
    pub leader_name: String,
    pub invite_code: String,
    pub member_count: u32,
    pub max_size: u32,
    pub status: String,
    pub submission_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&HackathonTeam> for TeamResponse {
    fn from(team: &HackathonTeam) -> Self {
        Self {
            id: team.id().as_str().to_string(),
            event_id: team.event_id().as_str().to_string(),
            name: team.name().to_string(),
            description: team.description().map(String::from),
            leader_id: team.leader_id().to_string(),
            leader_name: team.leader_name().to_string(),
            invite_code: team.invite_code().as_str().to_string(),
            member_count: team.member_count(),
            max_size: team.max_size(),
            status: team.status().as_str().to_string(),
            submission_id: team.submission_id().map(|id| id.as_str().to_string()),
            created_at: team.created_at().to_rfc3339(),
            updated_at: team.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinTeamResponse {
    pub team_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub user_name: String,
    pub role: String,
    pub status: String,
    pub joined_at: String,
}

impl From<&TeamMember> for MemberResponse {
    fn from(member: &TeamMember) -> Self {
        Self {
            user_id: member.user_id().to_string(),
            user_name: member.user_name().to_string(),
            role: member.role().as_str().to_string(),
            status: member.status().as_str().to_string(),
            joined_at: member.joined_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMembersResponse {
    pub members: Vec<MemberResponse>,
    pub total: usize,
}

/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateTeamApiRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    debug!(event_id = %request.event_id, user_id = %user.user_id, "Creating team");

    let team = state
        .teams
        .create_team(CreateTeamRequest {
            event_id: request.event_id,
            name: request.name,
            description: request.description,
            leader_id: user.user_id,
            leader_name: user.name,
            leader_email: user.email,
            max_size: request.max_size,
        })
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// POST /api/teams/join
pub async fn join_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<JoinTeamApiRequest>,
) -> Result<Json<JoinTeamResponse>, ApiError> {
    debug!(user_id = %user.user_id, "Joining team by invite code");

    let team_name = state
        .teams
        .join_team(JoinTeamRequest {
            invite_code: request.invite_code,
            user_id: user.user_id,
            user_name: user.name,
            user_email: user.email,
            event_id: request.event_id,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Json(JoinTeamResponse { team_name }))
}

/// POST /api/teams/{team_id}/lock
pub async fn lock_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .teams
        .lock_team(&TeamId::new(team_id), &user)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(TeamResponse::from(&team)))
}

/// POST /api/teams/{team_id}/reconcile
pub async fn reconcile_team(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .teams
        .reconcile_member_count(&TeamId::new(team_id))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(TeamResponse::from(&team)))
}

/// GET /api/teams/{team_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let members = state
        .teams
        .list_members(&TeamId::new(team_id))
        .await
        .map_err(ApiError::from)?;

    let members: Vec<MemberResponse> = members.iter().map(MemberResponse::from).collect();
    let total = members.len();

    Ok(Json(ListMembersResponse { members, total }))
}
