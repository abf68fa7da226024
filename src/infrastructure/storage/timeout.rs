//! Bounded store calls

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::time::timeout;
use tracing::warn;

use crate::domain::storage::{DocumentQuery, FindResult, Storage, StorageEntity};
use crate::domain::DomainError;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Wraps a backend so that no call waits longer than the configured bound.
///
/// An elapsed call surfaces as a storage error. A write that already reached
/// the backend is not rolled back.
#[derive(Debug)]
pub struct TimeoutStorage<E>
where
    E: StorageEntity,
{
    inner: Arc<dyn Storage<E>>,
    limit: Duration,
}

impl<E> TimeoutStorage<E>
where
    E: StorageEntity + 'static,
{
    pub fn new(inner: Arc<dyn Storage<E>>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>> + Send,
    {
        match timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    collection = E::COLLECTION,
                    operation,
                    timeout_ms = self.limit.as_millis() as u64,
                    "Store call timed out"
                );
                Err(DomainError::storage(format!(
                    "{} on '{}' timed out after {}ms",
                    operation,
                    E::COLLECTION,
                    self.limit.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl<E> Storage<E> for TimeoutStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        self.bounded("get", self.inner.get(key)).await
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        self.bounded("list", self.inner.list()).await
    }

    async fn find(&self, query: &DocumentQuery) -> Result<FindResult<E>, DomainError> {
        self.bounded("find", self.inner.find(query)).await
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        self.bounded("create", self.inner.create(entity)).await
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        self.bounded("update", self.inner.update(entity)).await
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        self.bounded("delete", self.inner.delete(key)).await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.bounded("clear", self.inner.clear()).await
    }

    async fn patch(&self, key: &E::Key, fields: Map<String, Value>) -> Result<E, DomainError> {
        self.bounded("patch", self.inner.patch(key, fields)).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        self.bounded("count", self.inner.count()).await
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        self.bounded("exists", self.inner.exists(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::document_id;
    use crate::infrastructure::storage::InMemoryStorage;
    use serde::{Deserialize, Serialize};

    document_id!(SlowId);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Slow {
        id: SlowId,
    }

    impl StorageEntity for Slow {
        type Key = SlowId;
        const COLLECTION: &'static str = "slow";

        fn key(&self) -> &Self::Key {
            &self.id
        }
    }

    /// Backend whose reads never finish
    #[derive(Debug, Default)]
    struct StalledStorage {
        inner: InMemoryStorage<Slow>,
    }

    #[async_trait]
    impl Storage<Slow> for StalledStorage {
        async fn get(&self, _key: &SlowId) -> Result<Option<Slow>, DomainError> {
            std::future::pending().await
        }

        async fn list(&self) -> Result<Vec<Slow>, DomainError> {
            self.inner.list().await
        }

        async fn find(&self, _query: &DocumentQuery) -> Result<FindResult<Slow>, DomainError> {
            std::future::pending().await
        }

        async fn create(&self, entity: Slow) -> Result<Slow, DomainError> {
            self.inner.create(entity).await
        }

        async fn update(&self, entity: Slow) -> Result<Slow, DomainError> {
            self.inner.update(entity).await
        }

        async fn patch(&self, key: &SlowId, fields: Map<String, Value>) -> Result<Slow, DomainError> {
            self.inner.patch(key, fields).await
        }

        async fn delete(&self, key: &SlowId) -> Result<bool, DomainError> {
            self.inner.delete(key).await
        }

        async fn clear(&self) -> Result<(), DomainError> {
            self.inner.clear().await
        }
    }

    fn storage() -> TimeoutStorage<Slow> {
        TimeoutStorage::new(
            Arc::new(StalledStorage::default()),
            Duration::from_millis(50),
        )
    }

    #[tokio::test]
    async fn test_stalled_call_becomes_storage_error() {
        let err = storage().get(&SlowId::new("1")).await.unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_stalled_find_times_out() {
        let result = storage().find(&DocumentQuery::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fast_calls_pass_through() {
        let storage = storage();

        storage.create(Slow { id: SlowId::new("1") }).await.unwrap();
        assert_eq!(storage.list().await.unwrap().len(), 1);
        assert!(storage.delete(&SlowId::new("1")).await.unwrap());
    }
}
