//! Hackathon team formation

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::invite_code::{InviteCodeGenerator, RandomInviteCodes};
use crate::domain::auth::Principal;
use crate::domain::event::EventId;
use crate::domain::storage::{DocumentQuery, Storage};
use crate::domain::team::{
    require, validate_max_size, validate_team_description, validate_team_name, HackathonTeam,
    InviteCode, MemberId, MemberRole, MembershipStatus, TeamId, TeamMember, DEFAULT_TEAM_SIZE,
};
use crate::domain::{ConflictKind, DomainError};
use crate::infrastructure::counter;

/// Candidate codes tried before giving up
pub const MAX_INVITE_CODE_ATTEMPTS: usize = 5;

/// Request for creating a new team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub event_id: String,
    pub name: String,
    pub description: Option<String>,
    pub leader_id: String,
    pub leader_name: String,
    pub leader_email: String,
    pub max_size: Option<u32>,
}

/// Request for joining a team by invite code
#[derive(Debug, Clone)]
pub struct JoinTeamRequest {
    pub invite_code: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub event_id: Option<String>,
}

/// A user's team for an event and the role they hold in it
#[derive(Debug, Clone, Serialize)]
pub struct TeamContext {
    pub team: HackathonTeam,
    pub role: MemberRole,
}

/// Creates teams and admits members
#[derive(Debug, Clone)]
pub struct TeamFormationEngine {
    teams: Arc<dyn Storage<HackathonTeam>>,
    members: Arc<dyn Storage<TeamMember>>,
    codes: Arc<dyn InviteCodeGenerator>,
}

impl TeamFormationEngine {
    pub fn new(
        teams: Arc<dyn Storage<HackathonTeam>>,
        members: Arc<dyn Storage<TeamMember>>,
    ) -> Self {
        Self {
            teams,
            members,
            codes: Arc::new(RandomInviteCodes),
        }
    }

    pub fn with_code_generator(mut self, codes: Arc<dyn InviteCodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    /// Create a team led by the requester
    pub async fn create_team(&self, request: CreateTeamRequest) -> Result<HackathonTeam, DomainError> {
        let max_size = request.max_size.unwrap_or(DEFAULT_TEAM_SIZE);

        validate_team_name(&request.name)
            .and_then(|_| validate_team_description(request.description.as_deref()))
            .and_then(|_| validate_max_size(max_size))
            .and_then(|_| require("event_id", &request.event_id))
            .and_then(|_| require("leader_id", &request.leader_id))
            .and_then(|_| require("leader_name", &request.leader_name))
            .and_then(|_| require("leader_email", &request.leader_email))
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let event_id = EventId::new(request.event_id.trim());
        self.ensure_free_to_lead(&event_id, &request.leader_id).await?;

        let invite_code = self.unique_invite_code().await?;

        let mut team = HackathonTeam::new(
            event_id,
            request.name,
            request.leader_id,
            request.leader_name,
            request.leader_email,
            invite_code,
            max_size,
        );
        if let Some(description) = request.description.filter(|d| !d.trim().is_empty()) {
            team = team.with_description(description);
        }

        let team = self.teams.create(team).await?;

        if let Err(e) = self.members.create(TeamMember::leader_of(&team)).await {
            // Lost a race with another team or join for the same user
            if let Err(cleanup) = self.teams.delete(team.id()).await {
                warn!(team_id = %team.id(), error = %cleanup, "Failed to remove team after leader conflict");
            }
            return Err(if e.is_key_collision() {
                DomainError::conflict(
                    ConflictKind::AlreadyInTeam,
                    "User already belongs to a team for this event",
                )
            } else {
                e
            });
        }

        info!(
            team_id = %team.id(),
            event_id = %team.event_id(),
            leader_id = team.leader_id(),
            "Team created"
        );

        Ok(team)
    }

    /// Admit the requester to the team behind an invite code; returns the team name
    pub async fn join_team(&self, request: JoinTeamRequest) -> Result<String, DomainError> {
        require("user_id", &request.user_id)
            .and_then(|_| require("user_name", &request.user_name))
            .and_then(|_| require("user_email", &request.user_email))
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let team = self
            .find_by_invite_code(&request.invite_code, request.event_id.as_deref())
            .await?;

        team.ensure_accepting_members()?;
        team.ensure_has_room()?;

        let membership = self
            .members
            .get(&MemberId::for_participant(team.event_id(), &request.user_id))
            .await?;

        if matches!(membership, Some(ref m) if m.team_id() == team.id()) {
            return Err(already_member(&team));
        }

        if let Some(led) = self.led_team(team.event_id(), &request.user_id).await? {
            if led.id() == team.id() {
                return Err(already_member(&team));
            }
            return Err(DomainError::conflict(
                ConflictKind::AlreadyLeader,
                format!("User already leads team '{}' for this event", led.name()),
            ));
        }

        if membership.is_some() {
            return Err(already_in_team());
        }

        let member = TeamMember::new(
            &team,
            request.user_id,
            request.user_name,
            request.user_email,
            MemberRole::Member,
        );

        let member = self.members.create(member).await.map_err(|e| {
            if e.is_key_collision() {
                already_in_team()
            } else {
                e
            }
        })?;

        counter::adjust_best_effort(self.teams.as_ref(), team.id(), "member_count", |t| {
            u64::from(t.member_count()) + 1
        })
        .await;

        info!(
            team_id = %team.id(),
            user_id = member.user_id(),
            "Member joined team"
        );

        Ok(team.name().to_string())
    }

    /// The team a user leads or belongs to for an event
    pub async fn get_team_context(
        &self,
        event_id: &EventId,
        user_id: &str,
    ) -> Result<Option<TeamContext>, DomainError> {
        let membership = self
            .members
            .get(&MemberId::for_participant(event_id, user_id))
            .await?;

        if let Some(member) = membership {
            if let Some(team) = self.teams.get(member.team_id()).await? {
                return Ok(Some(TeamContext {
                    team,
                    role: member.role(),
                }));
            }
        }

        Ok(self
            .led_team(event_id, user_id)
            .await?
            .map(|team| TeamContext {
                team,
                role: MemberRole::Leader,
            }))
    }

    /// Close a forming team to new members. Leader or admin only.
    pub async fn lock_team(
        &self,
        team_id: &TeamId,
        principal: &Principal,
    ) -> Result<HackathonTeam, DomainError> {
        let mut team = self.get_team(team_id).await?;

        if !principal.is_admin && !team.is_led_by(&principal.user_id) {
            return Err(DomainError::authorization(
                "Only the team leader or an admin can lock the team",
            ));
        }

        team.lock()?;
        let team = self.teams.update(team).await?;

        info!(team_id = %team_id, user_id = %principal.user_id, "Team locked");
        Ok(team)
    }

    /// Rewrite `member_count` from the stored memberships
    pub async fn reconcile_member_count(&self, team_id: &TeamId) -> Result<HackathonTeam, DomainError> {
        let team = self.get_team(team_id).await?;

        let query = DocumentQuery::new()
            .eq("team_id", team_id.as_str())
            .eq("status", MembershipStatus::Accepted.as_str());
        let actual = counter::recount(self.members.as_ref(), &query).await?;

        if actual == team.member_count() {
            debug!(team_id = %team_id, member_count = actual, "Member count already accurate");
            return Ok(team);
        }

        let team =
            counter::set(self.teams.as_ref(), team_id, "member_count", u64::from(actual)).await?;

        info!(team_id = %team_id, member_count = actual, "Member count reconciled");
        Ok(team)
    }

    /// Accepted members of a team, in join order
    pub async fn list_members(&self, team_id: &TeamId) -> Result<Vec<TeamMember>, DomainError> {
        self.get_team(team_id).await?;

        let query = DocumentQuery::new().eq("team_id", team_id.as_str());
        let mut members = self.members.find(&query).await?.items;
        members.sort_by_key(|m| m.joined_at());

        Ok(members)
    }

    pub async fn get_team(&self, team_id: &TeamId) -> Result<HackathonTeam, DomainError> {
        self.teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))
    }

    async fn find_by_invite_code(
        &self,
        input: &str,
        event_id: Option<&str>,
    ) -> Result<HackathonTeam, DomainError> {
        let invalid = || DomainError::not_found("Invalid invite code");

        let code = InviteCode::parse(input).map_err(|_| invalid())?;
        let team = self
            .teams
            .find_one(&DocumentQuery::new().eq("invite_code", code.as_str()))
            .await?
            .ok_or_else(invalid)?;

        match event_id.map(str::trim).filter(|e| !e.is_empty()) {
            Some(expected) if expected != team.event_id().as_str() => Err(invalid()),
            _ => Ok(team),
        }
    }

    async fn led_team(
        &self,
        event_id: &EventId,
        user_id: &str,
    ) -> Result<Option<HackathonTeam>, DomainError> {
        let query = DocumentQuery::new()
            .eq("event_id", event_id.as_str())
            .eq("leader_id", user_id);
        self.teams.find_one(&query).await
    }

    async fn ensure_free_to_lead(&self, event_id: &EventId, user_id: &str) -> Result<(), DomainError> {
        if let Some(team) = self.led_team(event_id, user_id).await? {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyLeader,
                format!("User already leads team '{}' for this event", team.name()),
            ));
        }

        if self
            .members
            .exists(&MemberId::for_participant(event_id, user_id))
            .await?
        {
            return Err(already_in_team());
        }

        Ok(())
    }

    async fn unique_invite_code(&self) -> Result<InviteCode, DomainError> {
        for attempt in 1..=MAX_INVITE_CODE_ATTEMPTS {
            let code = self.codes.generate()?;
            let query = DocumentQuery::new().eq("invite_code", code.as_str());

            if self.teams.find_one(&query).await?.is_none() {
                return Ok(code);
            }

            debug!(attempt, "Invite code collision, drawing another");
        }

        Err(DomainError::internal(format!(
            "Could not allocate a unique invite code after {} attempts",
            MAX_INVITE_CODE_ATTEMPTS
        )))
    }
}

fn already_member(team: &HackathonTeam) -> DomainError {
    DomainError::conflict(
        ConflictKind::AlreadyMember,
        format!("Already a member of team '{}'", team.name()),
    )
}

fn already_in_team() -> DomainError {
    DomainError::conflict(
        ConflictKind::AlreadyInTeam,
        "User already belongs to a team for this event",
    )
}
