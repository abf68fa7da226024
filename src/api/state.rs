//! Application state for shared coordinators

use std::sync::Arc;

use crate::domain::auth::IdentityVerifier;
use crate::domain::blog::Blog;
use crate::domain::event::{Event, Registration};
use crate::domain::notification::RegistrationNotifier;
use crate::domain::storage::Storage;
use crate::domain::submission::Submission;
use crate::domain::team::{HackathonTeam, TeamMember};
use crate::domain::DomainError;
use crate::infrastructure::blog::ModerationStateMachine;
use crate::infrastructure::rate_limit::{QuotaConfig, RateLimitGuard};
use crate::infrastructure::registration::RegistrationCoordinator;
use crate::infrastructure::storage::StorageFactory;
use crate::infrastructure::submission::SubmissionWorkflow;
use crate::infrastructure::team::TeamFormationEngine;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub registrations: Arc<RegistrationCoordinator>,
    pub teams: Arc<TeamFormationEngine>,
    pub submissions: Arc<SubmissionWorkflow>,
    pub blogs: Arc<ModerationStateMachine>,
    pub quota: Arc<RateLimitGuard>,
    pub identity: Arc<dyn IdentityVerifier>,
    /// Probed by the readiness check
    pub events: Arc<dyn Storage<Event>>,
    pub expose_internal_errors: bool,
}

impl AppState {
    /// Wire every coordinator over stores created by the factory
    ///
    /// Coordinators that touch the same collection share one store.
    pub async fn build(
        storage: &StorageFactory,
        notifier: Arc<dyn RegistrationNotifier>,
        identity: Arc<dyn IdentityVerifier>,
        quota: QuotaConfig,
    ) -> Result<Self, DomainError> {
        let events = storage.create::<Event>().await?;
        let registrations = storage.create::<Registration>().await?;
        let teams = storage.create::<HackathonTeam>().await?;
        let members = storage.create::<TeamMember>().await?;
        let submissions = storage.create::<Submission>().await?;
        let blogs = storage.create::<Blog>().await?;

        let guard = Arc::new(RateLimitGuard::new(Arc::clone(&blogs), quota));

        Ok(Self {
            registrations: Arc::new(RegistrationCoordinator::new(
                Arc::clone(&events),
                registrations,
                notifier,
            )),
            teams: Arc::new(TeamFormationEngine::new(
                Arc::clone(&teams),
                Arc::clone(&members),
            )),
            submissions: Arc::new(SubmissionWorkflow::new(submissions, teams, members)),
            blogs: Arc::new(ModerationStateMachine::new(blogs, Arc::clone(&guard))),
            quota: guard,
            identity,
            events,
            expose_internal_errors: false,
        })
    }

    pub fn with_internal_errors_exposed(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("expose_internal_errors", &self.expose_internal_errors)
            .finish_non_exhaustive()
    }
}
