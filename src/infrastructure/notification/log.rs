use async_trait::async_trait;
use tracing::info;

use crate::domain::notification::{RegistrationNotice, RegistrationNotifier};
use crate::domain::DomainError;

/// Records notices in the log when no email service is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl RegistrationNotifier for LogNotifier {
    async fn send(&self, notice: &RegistrationNotice, recipient: &str) -> Result<(), DomainError> {
        info!(
            ticket_id = %notice.ticket_id,
            event_id = %notice.event_id,
            recipient,
            "Registration confirmed (email delivery disabled)"
        );
        Ok(())
    }
}
