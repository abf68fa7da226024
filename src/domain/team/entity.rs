//! Hackathon team and membership entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::invite_code::InviteCode;
use crate::domain::error::{ConflictKind, DomainError};
use crate::domain::event::EventId;
use crate::domain::storage::{document_id, StorageEntity};
use crate::domain::submission::SubmissionId;

document_id!(
    /// Team identifier
    TeamId
);

document_id!(
    /// Membership identifier, derived from the (event, user) pair so a user
    /// can hold at most one membership document per event
    MemberId
);

impl MemberId {
    pub fn for_participant(event_id: &EventId, user_id: &str) -> Self {
        Self::derived(&["membership", event_id.as_str(), user_id])
    }
}

/// Lifecycle of a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    /// Accepting members
    #[default]
    Forming,
    /// Closed to new members
    Locked,
    /// Project submitted
    Submitted,
}

impl TeamStatus {
    pub fn accepts_members(&self) -> bool {
        matches!(self, Self::Forming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forming => "forming",
            Self::Locked => "locked",
            Self::Submitted => "submitted",
        }
    }
}

impl std::fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a user within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Leader,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Member => "member",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invitations are accept-only, so every stored membership is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Accepted,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
        }
    }
}

/// Hackathon team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackathonTeam {
    id: TeamId,
    event_id: EventId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    leader_id: String,
    leader_name: String,
    leader_email: String,
    invite_code: InviteCode,
    /// Advisory: recoverable by recounting memberships
    member_count: u32,
    max_size: u32,
    status: TeamStatus,
    submission_id: Option<SubmissionId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HackathonTeam {
    /// Create a forming team whose only member is its leader
    pub fn new(
        event_id: EventId,
        name: impl Into<String>,
        leader_id: impl Into<String>,
        leader_name: impl Into<String>,
        leader_email: impl Into<String>,
        invite_code: InviteCode,
        max_size: u32,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: TeamId::generate(),
            event_id,
            name: name.into().trim().to_string(),
            description: None,
            leader_id: leader_id.into(),
            leader_name: leader_name.into(),
            leader_email: leader_email.into(),
            invite_code,
            member_count: 1,
            max_size,
            status: TeamStatus::Forming,
            submission_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_member_count(mut self, member_count: u32) -> Self {
        self.member_count = member_count;
        self
    }

    pub fn with_status(mut self, status: TeamStatus) -> Self {
        self.status = status;
        self
    }

    // Getters

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn leader_id(&self) -> &str {
        &self.leader_id
    }

    pub fn leader_name(&self) -> &str {
        &self.leader_name
    }

    pub fn leader_email(&self) -> &str {
        &self.leader_email
    }

    pub fn invite_code(&self) -> &InviteCode {
        &self.invite_code
    }

    pub fn member_count(&self) -> u32 {
        self.member_count
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn status(&self) -> TeamStatus {
        self.status
    }

    pub fn submission_id(&self) -> Option<&SubmissionId> {
        self.submission_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_led_by(&self, user_id: &str) -> bool {
        self.leader_id == user_id
    }

    // Preconditions

    /// Locked and submitted teams take no new members
    pub fn ensure_accepting_members(&self) -> Result<(), DomainError> {
        if !self.status.accepts_members() {
            return Err(DomainError::conflict(
                ConflictKind::TeamLocked,
                format!("Team '{}' is {} and not accepting members", self.name, self.status),
            ));
        }

        Ok(())
    }

    pub fn ensure_has_room(&self) -> Result<(), DomainError> {
        if self.member_count >= self.max_size {
            return Err(DomainError::conflict(
                ConflictKind::TeamFull,
                format!("Team '{}' is full ({}/{})", self.name, self.member_count, self.max_size),
            ));
        }

        Ok(())
    }

    // Mutators

    pub fn lock(&mut self) -> Result<(), DomainError> {
        if self.status != TeamStatus::Forming {
            return Err(DomainError::conflict(
                ConflictKind::InvalidTransition,
                format!("Team '{}' is already {}", self.name, self.status),
            ));
        }

        self.status = TeamStatus::Locked;
        self.touch();
        Ok(())
    }

    /// Fields written when the team's project is accepted
    ///
    /// Applied as a partial write so a concurrent member count update survives.
    pub fn submitted_fields(submission_id: &SubmissionId) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::from(TeamStatus::Submitted.as_str()));
        fields.insert("submission_id".to_string(), Value::from(submission_id.as_str()));
        fields.insert("updated_at".to_string(), Value::from(Utc::now().to_rfc3339()));
        fields
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for HackathonTeam {
    type Key = TeamId;
    const COLLECTION: &'static str = "hackathon_teams";

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// Accepted membership of a user in a team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    id: MemberId,
    team_id: TeamId,
    event_id: EventId,
    user_id: String,
    user_name: String,
    user_email: String,
    role: MemberRole,
    status: MembershipStatus,
    joined_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn new(
        team: &HackathonTeam,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        role: MemberRole,
    ) -> Self {
        let user_id = user_id.into();

        Self {
            id: MemberId::for_participant(team.event_id(), &user_id),
            team_id: team.id().clone(),
            event_id: team.event_id().clone(),
            user_id,
            user_name: user_name.into(),
            user_email: user_email.into(),
            role,
            status: MembershipStatus::Accepted,
            joined_at: Utc::now(),
        }
    }

    /// Membership record for the team's own leader
    pub fn leader_of(team: &HackathonTeam) -> Self {
        Self::new(
            team,
            team.leader_id(),
            team.leader_name(),
            team.leader_email(),
            MemberRole::Leader,
        )
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn role(&self) -> MemberRole {
        self.role
    }

    pub fn status(&self) -> MembershipStatus {
        self.status
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}

impl StorageEntity for TeamMember {
    type Key = MemberId;
    const COLLECTION: &'static str = "team_members";

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
