//! Outbound registration notifications

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[cfg(test)]
use mockall::automock;

use crate::domain::event::{Event, Registration};
use crate::domain::DomainError;

/// Details sent to the email collaborator after a successful registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationNotice {
    pub ticket_id: String,
    pub event_id: String,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub user_name: String,
}

impl RegistrationNotice {
    pub fn new(event: &Event, registration: &Registration) -> Self {
        Self {
            ticket_id: registration.id().to_string(),
            event_id: event.id().to_string(),
            event_title: event.title().to_string(),
            event_date: event.date(),
            user_name: registration.user_name().to_string(),
        }
    }
}

/// Delivers registration confirmations. Callers treat failures as best-effort.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RegistrationNotifier: Send + Sync + std::fmt::Debug {
    async fn send(&self, notice: &RegistrationNotice, recipient: &str) -> Result<(), DomainError>;
}
