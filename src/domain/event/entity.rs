//! Event and registration entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::{ConflictKind, DomainError};
use crate::domain::storage::{document_id, StorageEntity};

document_id!(
    /// Event identifier
    EventId
);

document_id!(
    /// Registration (ticket) identifier, derived from the (event, user) pair
    RegistrationId
);

impl RegistrationId {
    /// The one key a registration for this pair may have
    pub fn for_attendee(event_id: &EventId, user_id: &str) -> Self {
        Self::derived(&["registration", event_id.as_str(), user_id])
    }
}

/// Event as owned by the store; only capacity matters to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    title: String,
    date: DateTime<Utc>,
    /// `None` means unlimited
    #[serde(default)]
    capacity: Option<u32>,
}

impl Event {
    pub fn new(id: EventId, title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            date,
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Precondition for the next registration given the current count
    pub fn ensure_seat_available(&self, registered: usize) -> Result<(), DomainError> {
        match self.capacity {
            Some(capacity) if registered >= capacity as usize => Err(DomainError::conflict(
                ConflictKind::EventFull,
                format!("Event '{}' is full", self.title),
            )),
            _ => Ok(()),
        }
    }
}

impl StorageEntity for Event {
    type Key = EventId;
    const COLLECTION: &'static str = "events";

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// A confirmed event registration. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    id: RegistrationId,
    event_id: EventId,
    user_id: String,
    user_name: String,
    user_email: String,
    created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        event_id: EventId,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Self {
        let user_id = user_id.into();

        Self {
            id: RegistrationId::for_attendee(&event_id, &user_id),
            event_id,
            user_id,
            user_name: user_name.into(),
            user_email: user_email.into(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &RegistrationId {
        &self.id
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

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl StorageEntity for Registration {
    type Key = RegistrationId;
    const COLLECTION: &'static str = "registrations";

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
