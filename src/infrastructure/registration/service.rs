//! Event registration coordinator

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::event::{Event, EventId, Registration, RegistrationId};
use crate::domain::notification::{RegistrationNotice, RegistrationNotifier};
use crate::domain::storage::{DocumentQuery, Storage};
use crate::domain::{ConflictKind, DomainError};

/// Request for registering a user to an event
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub event_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
}

/// Issues event tickets
#[derive(Debug, Clone)]
pub struct RegistrationCoordinator {
    events: Arc<dyn Storage<Event>>,
    registrations: Arc<dyn Storage<Registration>>,
    notifier: Arc<dyn RegistrationNotifier>,
}

impl RegistrationCoordinator {
    pub fn new(
        events: Arc<dyn Storage<Event>>,
        registrations: Arc<dyn Storage<Registration>>,
        notifier: Arc<dyn RegistrationNotifier>,
    ) -> Self {
        Self {
            events,
            registrations,
            notifier,
        }
    }

    /// Register a user and return the ticket id
    ///
    /// The confirmation email is sent in the background; its failure never
    /// fails the registration.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegistrationId, DomainError> {
        Self::validate(&request)?;

        let event_id = EventId::new(request.event_id.trim());
        let ticket_id = RegistrationId::for_attendee(&event_id, &request.user_id);

        if self.registrations.exists(&ticket_id).await? {
            return Err(Self::already_registered(&event_id));
        }

        let event = self
            .events
            .get(&event_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Event '{}' not found", event_id)))?;

        if event.capacity().is_some() {
            let registered = self.registration_count(&event_id).await?;
            event.ensure_seat_available(registered)?;
        }

        let registration = Registration::new(
            event_id.clone(),
            request.user_id,
            request.user_name,
            request.user_email,
        );

        let registration = self.registrations.create(registration).await.map_err(|e| {
            if e.is_key_collision() {
                Self::already_registered(&event_id)
            } else {
                e
            }
        })?;

        info!(
            event_id = %event_id,
            ticket_id = %registration.id(),
            user_id = registration.user_id(),
            "User registered for event"
        );

        self.notify(&event, &registration);

        Ok(registration.id().clone())
    }

    /// Store a new event. Ids are chosen by the caller and must be unused.
    pub async fn create_event(&self, event: Event) -> Result<Event, DomainError> {
        if event.id().as_str().trim().is_empty() || event.title().trim().is_empty() {
            return Err(DomainError::validation("Event id and title are required"));
        }

        let event = self.events.create(event).await?;
        info!(event_id = %event.id(), capacity = ?event.capacity(), "Event created");

        Ok(event)
    }

    pub async fn get_event(&self, event_id: &EventId) -> Result<Event, DomainError> {
        self.events
            .get(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Event '{}' not found", event_id)))
    }

    /// Number of registrations for the event
    pub async fn registration_count(&self, event_id: &EventId) -> Result<usize, DomainError> {
        let query = DocumentQuery::new().eq("event_id", event_id.as_str());
        self.registrations.count_matching(&query).await
    }

    fn notify(&self, event: &Event, registration: &Registration) {
        let notifier = Arc::clone(&self.notifier);
        let notice = RegistrationNotice::new(event, registration);
        let recipient = registration.user_email().to_string();

        tokio::spawn(async move {
            match notifier.send(&notice, &recipient).await {
                Ok(()) => debug!(ticket_id = %notice.ticket_id, "Registration notice sent"),
                Err(e) => warn!(
                    ticket_id = %notice.ticket_id,
                    error = %e,
                    "Failed to send registration notice"
                ),
            }
        });
    }

    fn validate(request: &RegisterRequest) -> Result<(), DomainError> {
        let fields = [
            ("event_id", &request.event_id),
            ("user_id", &request.user_id),
            ("user_name", &request.user_name),
            ("user_email", &request.user_email),
        ];

        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{} is required", field)));
            }
        }

        Ok(())
    }

    fn already_registered(event_id: &EventId) -> DomainError {
        DomainError::conflict(
            ConflictKind::AlreadyRegistered,
            format!("Already registered for event '{}'", event_id),
        )
    }
}
