//! Hackathon project submissions

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::auth::Principal;
use crate::domain::event::EventId;
use crate::domain::storage::{DocumentQuery, Storage};
use crate::domain::submission::{ProjectLinks, Submission, SubmissionId, SubmissionPatch};
use crate::domain::team::{HackathonTeam, MemberId, TeamId, TeamMember, TeamStatus};
use crate::domain::{ConflictKind, DomainError};

/// Request for submitting a project
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub event_id: String,
    pub team_id: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub project_title: String,
    pub project_description: String,
    pub links: ProjectLinks,
    pub technologies: Vec<String>,
}

/// Accepts one submission per team and moves the team to `submitted`
#[derive(Debug, Clone)]
pub struct SubmissionWorkflow {
    submissions: Arc<dyn Storage<Submission>>,
    teams: Arc<dyn Storage<HackathonTeam>>,
    members: Arc<dyn Storage<TeamMember>>,
}

impl SubmissionWorkflow {
    pub fn new(
        submissions: Arc<dyn Storage<Submission>>,
        teams: Arc<dyn Storage<HackathonTeam>>,
        members: Arc<dyn Storage<TeamMember>>,
    ) -> Self {
        Self {
            submissions,
            teams,
            members,
        }
    }

    pub async fn submit(&self, request: SubmitRequest) -> Result<Submission, DomainError> {
        for (field, value) in [
            ("event_id", &request.event_id),
            ("user_id", &request.user_id),
            ("user_name", &request.user_name),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{} is required", field)));
            }
        }

        let event_id = EventId::new(request.event_id.trim());
        let team_id = request
            .team_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(TeamId::new);

        let submission = Submission::new(
            event_id.clone(),
            team_id.clone(),
            request.user_id,
            request.user_name,
            request.project_title,
            request.project_description,
        )
        .with_links(request.links)
        .with_technologies(request.technologies);

        submission
            .validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let Some(team_id) = team_id else {
            let submission = self.submissions.create(submission).await?;
            info!(submission_id = %submission.id(), event_id = %event_id, "Individual project submitted");
            return Ok(submission);
        };

        let team = self.team_in_event(&team_id, &event_id).await?;
        self.ensure_on_team(&team, submission.user_id()).await?;

        if team.status() == TeamStatus::Submitted {
            return Err(duplicate_submission(&team));
        }

        let existing = DocumentQuery::new()
            .eq("event_id", event_id.as_str())
            .eq("team_id", team_id.as_str());
        if self.submissions.find_one(&existing).await?.is_some() {
            return Err(duplicate_submission(&team));
        }

        let submission = self.submissions.create(submission).await.map_err(|e| {
            if e.is_key_collision() {
                duplicate_submission(&team)
            } else {
                e
            }
        })?;

        self.mark_team_submitted(&team_id, submission.id()).await;

        info!(
            submission_id = %submission.id(),
            team_id = %team_id,
            event_id = %event_id,
            "Team project submitted"
        );

        Ok(submission)
    }

    /// Edit content fields. Submitter or admin only.
    pub async fn update(
        &self,
        submission_id: &SubmissionId,
        patch: SubmissionPatch,
        principal: &Principal,
    ) -> Result<Submission, DomainError> {
        let mut submission = self.get(submission_id).await?;

        if !principal.is_admin && !submission.is_submitted_by(&principal.user_id) {
            return Err(DomainError::authorization(
                "Only the submitter or an admin can edit this submission",
            ));
        }

        submission.apply(patch);
        submission
            .validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let submission = self.submissions.update(submission).await?;
        info!(submission_id = %submission_id, user_id = %principal.user_id, "Submission updated");

        Ok(submission)
    }

    pub async fn get(&self, submission_id: &SubmissionId) -> Result<Submission, DomainError> {
        self.submissions.get(submission_id).await?.ok_or_else(|| {
            DomainError::not_found(format!("Submission '{}' not found", submission_id))
        })
    }

    async fn team_in_event(
        &self,
        team_id: &TeamId,
        event_id: &EventId,
    ) -> Result<HackathonTeam, DomainError> {
        self.teams
            .get(team_id)
            .await?
            .filter(|team| team.event_id() == event_id)
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Team '{}' not found for event '{}'",
                    team_id, event_id
                ))
            })
    }

    async fn ensure_on_team(&self, team: &HackathonTeam, user_id: &str) -> Result<(), DomainError> {
        if team.is_led_by(user_id) {
            return Ok(());
        }

        let membership = self
            .members
            .get(&MemberId::for_participant(team.event_id(), user_id))
            .await?;

        match membership {
            Some(member) if member.team_id() == team.id() => Ok(()),
            _ => Err(DomainError::authorization(format!(
                "Only members of team '{}' can submit for it",
                team.name()
            ))),
        }
    }

    /// The submission document already blocks duplicates, so a failed team
    /// write is logged rather than returned.
    async fn mark_team_submitted(&self, team_id: &TeamId, submission_id: &SubmissionId) {
        let fields = HackathonTeam::submitted_fields(submission_id);

        if let Err(e) = self.teams.patch(team_id, fields).await {
            warn!(
                team_id = %team_id,
                submission_id = %submission_id,
                error = %e,
                "Team not marked as submitted"
            );
        }
    }
}

fn duplicate_submission(team: &HackathonTeam) -> DomainError {
    DomainError::conflict(
        ConflictKind::DuplicateSubmission,
        format!("Team '{}' has already submitted a project", team.name()),
    )
}
