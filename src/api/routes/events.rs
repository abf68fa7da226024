//! Event and registration endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{RequireAdmin, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::event::{Event, EventId};
use crate::infrastructure::registration::RegisterRequest;
use crate::infrastructure::team::TeamContext;

use super::teams::TeamResponse;

/// Request to publish an event
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventApiRequest {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub date: String,
    pub capacity: Option<u32>,
}

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id().as_str().to_string(),
            title: event.title().to_string(),
            date: event.date().to_rfc3339(),
            capacity: event.capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResponse {
    pub ticket_id: String,
    pub event_id: String,
}

/// Team of the caller for one event, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamContextResponse {
    pub team: Option<TeamResponse>,
    pub role: Option<String>,
}

impl From<Option<TeamContext>> for TeamContextResponse {
    fn from(context: Option<TeamContext>) -> Self {
        match context {
            Some(context) => Self {
                team: Some(TeamResponse::from(&context.team)),
                role: Some(context.role.as_str().to_string()),
            },
            None => Self {
                team: None,
                role: None,
            },
        }
    }
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<CreateEventApiRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    debug!(event_id = %request.id, admin = %admin.user_id, "Creating event");

    let mut event = Event::new(EventId::new(request.id.trim()), request.title, request.date);
    if let Some(capacity) = request.capacity {
        event = event.with_capacity(capacity);
    }

    let event = state
        .registrations
        .create_event(event)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(&event))))
}

/// GET /api/events/{event_id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state
        .registrations
        .get_event(&EventId::new(event_id))
        .await
        .map_err(ApiError::from)?;

    Ok(Json(EventResponse::from(&event)))
}

/// POST /api/events/{event_id}/registrations
pub async fn register(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(event_id): Path<String>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    debug!(event_id = %event_id, user_id = %user.user_id, "Registering for event");

    let ticket = state
        .registrations
        .register(RegisterRequest {
            event_id: event_id.clone(),
            user_id: user.user_id,
            user_name: user.name,
            user_email: user.email,
        })
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(TicketResponse {
            ticket_id: ticket.as_str().to_string(),
            event_id,
        }),
    ))
}

/// GET /api/events/{event_id}/team
pub async fn my_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(event_id): Path<String>,
) -> Result<Json<TeamContextResponse>, ApiError> {
    let context = state
        .teams
        .get_team_context(&EventId::new(event_id), &user.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(TeamContextResponse::from(context)))
}
