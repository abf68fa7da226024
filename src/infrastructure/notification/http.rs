//! Email-service notifier over HTTP

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha2::Sha256;
use tracing::{debug, warn};

use crate::domain::notification::{RegistrationNotice, RegistrationNotifier};
use crate::domain::DomainError;

type HmacSha256 = Hmac<Sha256>;

pub const EVENT_HEADER: &str = "X-Notification-Event";
pub const SIGNATURE_HEADER: &str = "X-Notification-Signature";
const REGISTRATION_EVENT: &str = "registration.confirmed";

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    event: &'static str,
    recipient: &'a str,
    notice: &'a RegistrationNotice,
}

/// POSTs signed JSON to the email collaborator
#[derive(Debug, Clone)]
pub struct HttpEmailNotifier {
    client: Client,
    endpoint: String,
    signing_secret: Option<String>,
}

impl HttpEmailNotifier {
    pub fn new(
        endpoint: impl Into<String>,
        signing_secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            signing_secret: signing_secret.filter(|s| !s.is_empty()),
        })
    }

    /// HMAC-SHA256 of the body, hex encoded
    pub fn sign(secret: &str, payload: &str) -> Result<String, DomainError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| DomainError::internal(format!("Invalid signing key: {}", e)))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl RegistrationNotifier for HttpEmailNotifier {
    async fn send(&self, notice: &RegistrationNotice, recipient: &str) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&Envelope {
            event: REGISTRATION_EVENT,
            recipient,
            notice,
        })
        .map_err(|e| DomainError::notification(format!("Failed to encode notice: {}", e)))?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header(EVENT_HEADER, REGISTRATION_EVENT);

        if let Some(ref secret) = self.signing_secret {
            let signature = Self::sign(secret, &payload)?;
            request = request.header(SIGNATURE_HEADER, format!("sha256={}", signature));
        }

        let response = request.body(payload).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else if e.is_connect() {
                "connection failed".to_string()
            } else {
                e.to_string()
            };
            DomainError::notification(format!("Email service unreachable: {}", reason))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), ticket_id = %notice.ticket_id, "Email service rejected notice");
            return Err(DomainError::notification(format!(
                "Email service responded with {}",
                status
            )));
        }

        debug!(ticket_id = %notice.ticket_id, "Registration notice delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notice() -> RegistrationNotice {
        RegistrationNotice {
            ticket_id: "t-1".to_string(),
            event_id: "e-1".to_string(),
            event_title: "RustConf".to_string(),
            event_date: Utc::now(),
            user_name: "Ferris".to_string(),
        }
    }

    #[test]
    fn test_signature_is_stable_per_secret() {
        let a = HttpEmailNotifier::sign("secret", "{}").unwrap();
        let b = HttpEmailNotifier::sign("secret", "{}").unwrap();
        let c = HttpEmailNotifier::sign("other", "{}").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_send_posts_signed_notice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/notify"))
            .and(header(EVENT_HEADER, REGISTRATION_EVENT))
            .and(header_exists(SIGNATURE_HEADER))
            .and(body_partial_json(serde_json::json!({
                "recipient": "ferris@example.com",
                "notice": { "ticket_id": "t-1", "event_title": "RustConf" }
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = HttpEmailNotifier::new(
            format!("{}/notify", server.uri()),
            Some("shh".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        notifier.send(&notice(), "ferris@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let notifier =
            HttpEmailNotifier::new(server.uri(), None, Duration::from_secs(5)).unwrap();

        let err = notifier.send(&notice(), "ferris@example.com").await.unwrap_err();
        assert!(matches!(err, DomainError::Notification { .. }));
    }

    #[tokio::test]
    async fn test_unsigned_when_no_secret() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let notifier =
            HttpEmailNotifier::new(server.uri(), Some(String::new()), Duration::from_secs(5))
                .unwrap();
        notifier.send(&notice(), "ferris@example.com").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key(SIGNATURE_HEADER));
    }
}
