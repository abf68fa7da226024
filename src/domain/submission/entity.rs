//! Hackathon project submission entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    validate_link, validate_project_description, validate_project_title,
    SubmissionValidationError,
};
use crate::domain::event::EventId;
use crate::domain::storage::{document_id, StorageEntity};
use crate::domain::team::TeamId;

document_id!(
    /// Submission identifier
    SubmissionId
);

impl SubmissionId {
    /// Team submissions get one fixed key per (event, team) pair
    pub fn for_team(event_id: &EventId, team_id: &TeamId) -> Self {
        Self::derived(&["submission", event_id.as_str(), team_id.as_str()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Submitted,
}

/// Optional project links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_url: Option<String>,
}

impl ProjectLinks {
    pub fn validate(&self) -> Result<(), SubmissionValidationError> {
        validate_link("repository_url", self.repository_url.as_deref())?;
        validate_link("demo_url", self.demo_url.as_deref())?;
        validate_link("video_url", self.video_url.as_deref())?;
        validate_link("presentation_url", self.presentation_url.as_deref())?;
        Ok(())
    }
}

/// Content fields a submitter may change after submitting.
///
/// Scoring fields are owned by the judging flow and cannot be patched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmissionPatch {
    pub project_title: Option<String>,
    pub project_description: Option<String>,
    pub repository_url: Option<String>,
    pub demo_url: Option<String>,
    pub video_url: Option<String>,
    pub presentation_url: Option<String>,
    pub technologies: Option<Vec<String>>,
}

/// Project submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    id: SubmissionId,
    event_id: EventId,
    team_id: Option<TeamId>,
    user_id: String,
    user_name: String,
    project_title: String,
    project_description: String,
    #[serde(flatten)]
    links: ProjectLinks,
    technologies: Vec<String>,
    status: SubmissionStatus,
    total_score: u32,
    reviewed_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        event_id: EventId,
        team_id: Option<TeamId>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        project_title: impl Into<String>,
        project_description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let id = match &team_id {
            Some(team_id) => SubmissionId::for_team(&event_id, team_id),
            None => SubmissionId::generate(),
        };

        Self {
            id,
            event_id,
            team_id,
            user_id: user_id.into(),
            user_name: user_name.into(),
            project_title: project_title.into().trim().to_string(),
            project_description: project_description.into().trim().to_string(),
            links: ProjectLinks::default(),
            technologies: Vec::new(),
            status: SubmissionStatus::Submitted,
            total_score: 0,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_links(mut self, links: ProjectLinks) -> Self {
        self.links = links;
        self
    }

    pub fn with_technologies(mut self, technologies: Vec<String>) -> Self {
        self.technologies = technologies;
        self
    }

    /// Checks every content field
    pub fn validate(&self) -> Result<(), SubmissionValidationError> {
        validate_project_title(&self.project_title)?;
        validate_project_description(&self.project_description)?;
        self.links.validate()
    }

    pub fn id(&self) -> &SubmissionId {
        &self.id
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn project_title(&self) -> &str {
        &self.project_title
    }

    pub fn project_description(&self) -> &str {
        &self.project_description
    }

    pub fn links(&self) -> &ProjectLinks {
        &self.links
    }

    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn reviewed_by(&self) -> Option<&str> {
        self.reviewed_by.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_submitted_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Applies a content patch; the result must be validated by the caller
    pub fn apply(&mut self, patch: SubmissionPatch) {
        if let Some(title) = patch.project_title {
            self.project_title = title.trim().to_string();
        }
        if let Some(description) = patch.project_description {
            self.project_description = description.trim().to_string();
        }
        if let Some(url) = patch.repository_url {
            self.links.repository_url = Some(url);
        }
        if let Some(url) = patch.demo_url {
            self.links.demo_url = Some(url);
        }
        if let Some(url) = patch.video_url {
            self.links.video_url = Some(url);
        }
        if let Some(url) = patch.presentation_url {
            self.links.presentation_url = Some(url);
        }
        if let Some(technologies) = patch.technologies {
            self.technologies = technologies;
        }
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Submission {
    type Key = SubmissionId;
    const COLLECTION: &'static str = "hackathon_submissions";

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
