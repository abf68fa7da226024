use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::create_router_with_state;
use super::state::AppState;
use crate::domain::auth::{AnyAdminPolicy, Principal, RoleLabelPolicy};
use crate::domain::event::{Event, Registration};
use crate::domain::storage::mock::MockStorage;
use crate::infrastructure::auth::{JwtConfig, JwtIdentityVerifier};
use crate::infrastructure::notification::LogNotifier;
use crate::infrastructure::rate_limit::QuotaConfig;
use crate::infrastructure::registration::RegistrationCoordinator;
use crate::infrastructure::storage::{InMemoryStorage, StorageFactory};

const SECRET: &str = "route-test-secret";

fn verifier() -> JwtIdentityVerifier {
    JwtIdentityVerifier::new(JwtConfig::new(SECRET, 1))
        .with_policy(Arc::new(AnyAdminPolicy::new().with(RoleLabelPolicy::new("admin"))))
}

async fn state() -> AppState {
    AppState::build(
        &StorageFactory::in_memory(),
        Arc::new(LogNotifier),
        Arc::new(verifier()),
        QuotaConfig::new(2, 24),
    )
    .await
    .unwrap()
}

struct TestApp {
    router: Router,
    issuer: JwtIdentityVerifier,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_state(state().await)
    }

    fn with_state(state: AppState) -> Self {
        Self {
            router: create_router_with_state(state),
            issuer: verifier(),
        }
    }

    fn token(&self, user_id: &str) -> String {
        let principal = Principal::new(
            user_id,
            format!("{}@example.com", user_id),
            format!("User {}", user_id),
        );
        self.issuer.issue(&principal).unwrap()
    }

    fn admin_token(&self) -> String {
        let principal = Principal::new("root", "root@example.com", "Root")
            .with_roles(vec!["admin".to_string()]);
        self.issuer.issue(&principal).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, value)
    }

    async fn create_event(&self, id: &str, capacity: Option<u32>) {
        let admin = self.admin_token();
        let (status, _) = self
            .send(
                Method::POST,
                "/api/events",
                Some(&admin),
                Some(json!({
                    "id": id,
                    "title": "Spring Hackathon",
                    "date": "2026-11-01T09:00:00Z",
                    "capacity": capacity,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

fn error_code(body: &Value) -> Option<&str> {
    body["error"]["code"].as_str()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"][0]["name"], "storage");

    let (status, _) = app.send(Method::GET, "/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_set_and_propagated() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_ready_reports_unreachable_storage() {
    let mut state = state().await;
    state.events = Arc::new(MockStorage::<Event>::new().with_error("connection refused"));
    let app = TestApp::with_state(state);

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_event_creation_requires_admin() {
    let app = TestApp::new().await;
    let token = app.token("u1");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/events",
            Some(&token),
            Some(json!({"id": "e1", "title": "Meetup", "date": "2026-11-01T09:00:00Z"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/api/events/e1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_flow() {
    let app = TestApp::new().await;
    app.create_event("e1", Some(1)).await;

    let (status, _) = app
        .send(Method::POST, "/api/events/e1/registrations", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let u1 = app.token("u1");
    let (status, body) = app
        .send(Method::POST, "/api/events/e1/registrations", Some(&u1), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["event_id"], "e1");
    assert!(body["ticket_id"].as_str().is_some());

    let (status, body) = app
        .send(Method::POST, "/api/events/e1/registrations", Some(&u1), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), Some("already_registered"));

    let u2 = app.token("u2");
    let (status, body) = app
        .send(Method::POST, "/api/events/e1/registrations", Some(&u2), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), Some("event_full"));
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::GET, "/api/blogs/quota", Some("not-a-jwt"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["type"], "authentication_error");
}

#[tokio::test]
async fn test_team_formation_flow() {
    let app = TestApp::new().await;
    app.create_event("e1", None).await;

    let leader = app.token("lead");
    let (status, team) = app
        .send(
            Method::POST,
            "/api/teams",
            Some(&leader),
            Some(json!({"event_id": "e1", "name": "Ferris Fans", "max_size": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(team["member_count"], 1);
    let team_id = team["id"].as_str().unwrap().to_string();
    let code = team["invite_code"].as_str().unwrap().to_lowercase();

    let member = app.token("m1");
    let (status, body) = app
        .send(
            Method::POST,
            "/api/teams/join",
            Some(&member),
            Some(json!({"invite_code": code})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "Ferris Fans");

    let (status, body) = app
        .send(Method::GET, "/api/events/e1/team", Some(&member), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "member");
    assert_eq!(body["team"]["id"], team_id.as_str());

    let latecomer = app.token("m2");
    let (status, body) = app
        .send(
            Method::POST,
            "/api/teams/join",
            Some(&latecomer),
            Some(json!({"invite_code": code})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), Some("team_full"));

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/teams/{}/members", team_id),
            Some(&member),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["members"][0]["role"], "leader");

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/teams/{}/lock", team_id),
            Some(&member),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/teams/{}/lock", team_id),
            Some(&leader),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "locked");
}

#[tokio::test]
async fn test_unknown_invite_code() {
    let app = TestApp::new().await;
    let token = app.token("u1");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/teams/join",
            Some(&token),
            Some(json!({"invite_code": "ZZZZZZ"})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Invalid invite code");
}

#[tokio::test]
async fn test_reconcile_requires_admin() {
    let app = TestApp::new().await;
    app.create_event("e1", None).await;

    let leader = app.token("lead");
    let (_, team) = app
        .send(
            Method::POST,
            "/api/teams",
            Some(&leader),
            Some(json!({"event_id": "e1", "name": "Borrowck"})),
        )
        .await;
    let uri = format!("/api/teams/{}/reconcile", team["id"].as_str().unwrap());

    let (status, _) = app.send(Method::POST, &uri, Some(&leader), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token();
    let (status, body) = app.send(Method::POST, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member_count"], 1);
}

#[tokio::test]
async fn test_team_submission_is_unique() {
    let app = TestApp::new().await;
    app.create_event("e1", None).await;

    let leader = app.token("lead");
    let (_, team) = app
        .send(
            Method::POST,
            "/api/teams",
            Some(&leader),
            Some(json!({"event_id": "e1", "name": "Lifetimes"})),
        )
        .await;
    let team_id = team["id"].as_str().unwrap().to_string();

    let submission = json!({
        "event_id": "e1",
        "team_id": team_id,
        "project_title": "Borrow Planner",
        "project_description": "Plans borrows across a whole crate before you write them.",
        "repository_url": "https://github.com/example/borrow-planner",
        "technologies": ["rust", "axum"],
    });

    let (status, body) = app
        .send(Method::POST, "/api/submissions", Some(&leader), Some(submission.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "submitted");
    assert_eq!(body["repository_url"], "https://github.com/example/borrow-planner");
    let submission_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(Method::POST, "/api/submissions", Some(&leader), Some(submission))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), Some("duplicate_submission"));

    let outsider = app.token("nobody");
    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/submissions/{}", submission_id),
            Some(&outsider),
            Some(json!({"project_title": "Hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/submissions/{}", submission_id),
            Some(&leader),
            Some(json!({"project_title": "Borrow Planner 2"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project_title"], "Borrow Planner 2");
}

#[tokio::test]
async fn test_blog_quota_and_moderation() {
    let app = TestApp::new().await;
    let author = app.token("writer");
    let post = |n: u32| {
        json!({
            "title": format!("Weekly notes {}", n),
            "content": "Notes from this week's meetup, with links and a short recap.",
            "tags": ["meetup"],
        })
    };

    let (status, first) = app
        .send(Method::POST, "/api/blogs", Some(&author), Some(post(1)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "pending");
    let blog_id = first["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(Method::POST, "/api/blogs", Some(&author), Some(post(2)))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Method::POST, "/api/blogs", Some(&author), Some(post(3)))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["type"], "rate_limit_error");

    let (_, quota) = app
        .send(Method::GET, "/api/blogs/quota", Some(&author), None)
        .await;
    assert_eq!(quota["remaining"], 0);
    assert_eq!(quota["allowed"], false);

    // Pending posts are hidden from the public
    let (status, _) = app
        .send(Method::GET, &format!("/api/blogs/{}", blog_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::GET, "/api/blogs?status=pending", Some(&author), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token();
    let (status, body) = app
        .send(Method::GET, "/api/blogs?status=pending", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/blogs/{}/approve", blog_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "published");

    let (status, body) = app
        .send(Method::GET, &format!("/api/blogs/{}", blog_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["views"], 1);

    let (_, body) = app.send(Method::GET, "/api/blogs", None, None).await;
    assert_eq!(body["total"], 1);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/blogs/{}", blog_id),
            Some(&author),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/blogs/{}", blog_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let app = TestApp::new().await;
    let author = app.token("writer");
    let (_, blog) = app
        .send(
            Method::POST,
            "/api/blogs",
            Some(&author),
            Some(json!({
                "title": "Draft thoughts",
                "content": "Some thoughts that need another pass before publishing.",
            })),
        )
        .await;
    let uri = format!("/api/blogs/{}/reject", blog["id"].as_str().unwrap());

    let admin = app.admin_token();
    let (status, _) = app
        .send(Method::POST, &uri, Some(&admin), Some(json!({"reason": ""})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::POST,
            &uri,
            Some(&admin),
            Some(json!({"reason": "Please add sources for the benchmark numbers."})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");
}

#[tokio::test]
async fn test_malformed_json_uses_error_body() {
    let app = TestApp::new().await;
    let token = app.token("u1");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/teams")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error_code(&body), Some("invalid_json"));
}

fn state_with_broken_registrations(state: AppState) -> AppState {
    let mut state = state;
    state.registrations = Arc::new(RegistrationCoordinator::new(
        Arc::new(InMemoryStorage::<Event>::new()),
        Arc::new(MockStorage::<Registration>::new().with_error("connection reset by peer")),
        Arc::new(LogNotifier),
    ));
    state
}

#[tokio::test]
async fn test_dependency_errors_are_masked() {
    let app = TestApp::with_state(state_with_broken_registrations(state().await));
    let token = app.token("u1");

    let (status, body) = app
        .send(Method::POST, "/api/events/e1/registrations", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Internal server error");
}

#[tokio::test]
async fn test_dependency_errors_exposed_when_configured() {
    let state = state_with_broken_registrations(state().await).with_internal_errors_exposed(true);
    let app = TestApp::with_state(state);
    let token = app.token("u1");

    let (status, body) = app
        .send(Method::POST, "/api/events/e1/registrations", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("connection reset by peer"));
}
