//! Community Coordinator
//!
//! Coordination layer for a community platform backed by a document store
//! without transactions or unique constraints:
//! - Event registration with capacity limits
//! - Hackathon team formation through invite codes
//! - One project submission per team
//! - Blog moderation with a per-author submission quota

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api::state::AppState;
use domain::auth::{AnyAdminPolicy, EmailAllowListPolicy, IdentityVerifier, RoleLabelPolicy};
use domain::notification::RegistrationNotifier;
use infrastructure::{
    auth::{JwtConfig, JwtIdentityVerifier},
    notification::{HttpEmailNotifier, LogNotifier},
    rate_limit::QuotaConfig,
    storage::{PostgresConfig, StorageConfig, StorageFactory, StorageType},
};
use rand::Rng;
use tracing::{info, warn};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage = create_storage_factory(config).await?;
    let notifier = create_notifier(config)?;
    let identity = create_identity_verifier(config);
    let quota = QuotaConfig::new(
        config.limits.blog_submissions_per_window,
        config.limits.blog_window_hours,
    );

    let state = AppState::build(&storage, notifier, identity, quota)
        .await
        .context("Failed to initialize stores")?
        .with_internal_errors_exposed(config.server.expose_internal_errors);

    info!(
        blog_quota = quota.limit,
        blog_window_hours = config.limits.blog_window_hours,
        "Application state ready"
    );

    Ok(state)
}

async fn create_storage_factory(config: &AppConfig) -> anyhow::Result<StorageFactory> {
    let backend = StorageType::parse(&config.storage.backend).ok_or_else(|| {
        anyhow::anyhow!("Unknown storage backend '{}'", config.storage.backend)
    })?;

    let storage_config = match backend {
        StorageType::InMemory => StorageConfig::in_memory(),
        StorageType::Postgres => {
            let url = config
                .storage
                .database_url
                .clone()
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .ok_or_else(|| {
                    anyhow::anyhow!("storage.database_url or DATABASE_URL is required for postgres")
                })?;

            StorageConfig::Postgres(
                PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
            )
        }
    };

    let factory = StorageFactory::connect(&storage_config)
        .await
        .context("Failed to connect storage backend")?;

    Ok(factory.with_timeout(Duration::from_millis(config.storage.timeout_ms)))
}

fn create_notifier(config: &AppConfig) -> anyhow::Result<Arc<dyn RegistrationNotifier>> {
    match config.notification.endpoint.as_deref() {
        Some(endpoint) if !endpoint.trim().is_empty() => {
            info!(endpoint = %endpoint, "Registration notices go to the email service");
            let notifier = HttpEmailNotifier::new(
                endpoint,
                config.notification.signing_secret.clone(),
                Duration::from_secs(config.notification.timeout_secs),
            )?;
            Ok(Arc::new(notifier))
        }
        _ => {
            warn!("No notification endpoint configured. Registration notices are only logged.");
            Ok(Arc::new(LogNotifier))
        }
    }
}

fn create_identity_verifier(config: &AppConfig) -> Arc<dyn IdentityVerifier> {
    let secret = config
        .auth
        .jwt_secret
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var("JWT_SECRET").ok())
        .unwrap_or_else(|| {
            warn!(
                "No JWT secret configured. Generating random secret. \
                Tokens will NOT verify across restarts."
            );
            generate_random_secret()
        });

    let policy = AnyAdminPolicy::new()
        .with(RoleLabelPolicy::new(config.auth.admin_role.clone()))
        .with(EmailAllowListPolicy::new(config.auth.admin_emails.iter()));

    Arc::new(
        JwtIdentityVerifier::new(JwtConfig::new(secret, config.auth.token_expiration_hours))
            .with_policy(Arc::new(policy)),
    )
}

fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
