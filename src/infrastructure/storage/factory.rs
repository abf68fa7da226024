//! Storage factory for runtime storage selection

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

use super::in_memory::InMemoryStorage;
use super::postgres::{PostgresConfig, PostgresStorage};
use super::timeout::{TimeoutStorage, DEFAULT_STORE_TIMEOUT};

/// Supported storage types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

#[derive(Debug, Clone)]
enum Backend {
    InMemory,
    Postgres(PgPool),
}

/// Builds one timeout-bounded store per collection over a shared backend
#[derive(Debug, Clone)]
pub struct StorageFactory {
    backend: Backend,
    timeout: Duration,
}

impl StorageFactory {
    /// Connects the configured backend. Postgres pools are opened once here.
    pub async fn connect(config: &StorageConfig) -> Result<Self, DomainError> {
        let backend = match config {
            StorageConfig::InMemory => Backend::InMemory,
            StorageConfig::Postgres(pg_config) => Backend::Postgres(pg_config.connect().await?),
        };

        info!(backend = ?config.storage_type(), "Storage backend ready");

        Ok(Self {
            backend,
            timeout: DEFAULT_STORE_TIMEOUT,
        })
    }

    /// In-memory factory for tests and development
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::InMemory,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates the store for `E::COLLECTION`
    pub async fn create<E>(&self) -> Result<Arc<dyn Storage<E>>, DomainError>
    where
        E: StorageEntity + 'static,
    {
        let inner: Arc<dyn Storage<E>> = match &self.backend {
            Backend::InMemory => Arc::new(InMemoryStorage::<E>::new()),
            Backend::Postgres(pool) => {
                let storage = PostgresStorage::<E>::new(pool.clone());
                storage.ensure_table().await?;
                Arc::new(storage)
            }
        };

        Ok(Arc::new(TimeoutStorage::new(inner, self.timeout)))
    }
}
