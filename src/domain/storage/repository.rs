//! Storage trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::DomainError;

use super::entity::{StorageEntity, StorageKey};
use super::query::{DocumentQuery, FindResult};

/// Applies `fields` over an entity's serialized form
///
/// Backends that merge in process call this while holding their write lock.
pub fn merge_fields<E>(entity: &E, fields: Map<String, Value>) -> Result<E, DomainError>
where
    E: StorageEntity,
{
    let mut document = serde_json::to_value(entity)
        .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))?;

    match document {
        Value::Object(ref mut object) => object.extend(fields),
        _ => return Err(DomainError::storage("Entity is not stored as a JSON object")),
    }

    serde_json::from_value(document)
        .map_err(|e| DomainError::validation(format!("Invalid patch: {}", e)))
}

/// Generic document storage for one collection
///
/// Every call stands alone: there are no multi-document transactions and no
/// compare-and-swap. The only conditional write is `create`, which fails with
/// a key collision when the key is already taken.
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    /// Retrieves an entity by its key
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Retrieves entities matching every filter, capped by the query limit.
    /// `total` counts all matches regardless of the cap.
    async fn find(&self, query: &DocumentQuery) -> Result<FindResult<E>, DomainError>;

    /// Creates a new entity, returns a key collision if it already exists
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Replaces an existing entity, returns error if not found
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Deletes an entity by its key, returns true if deleted
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    /// Clears all entities (use with caution)
    async fn clear(&self) -> Result<(), DomainError>;

    /// Merges top-level fields into the stored document in a single write.
    /// Fields not named in `fields` keep whatever value the store holds.
    async fn patch(&self, key: &E::Key, fields: Map<String, Value>) -> Result<E, DomainError>;

    /// Returns the first match, if any
    async fn find_one(&self, query: &DocumentQuery) -> Result<Option<E>, DomainError> {
        let query = query.clone().with_limit(1);
        Ok(self.find(&query).await?.first())
    }

    /// Counts matches without transferring documents
    async fn count_matching(&self, query: &DocumentQuery) -> Result<usize, DomainError> {
        let query = query.clone().with_limit(0);
        Ok(self.find(&query).await?.total)
    }

    /// Checks if an entity exists by its key
    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Returns the count of entities
    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock storage whose failures can be switched on at any point of a test
    #[derive(Debug)]
    pub struct MockStorage<E>
    where
        E: StorageEntity,
    {
        entities: Mutex<HashMap<String, E>>,
        error: Mutex<Option<String>>,
    }

    impl<E> Default for MockStorage<E>
    where
        E: StorageEntity,
    {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<E> MockStorage<E>
    where
        E: StorageEntity,
    {
        pub fn new() -> Self {
            Self {
                entities: Mutex::new(HashMap::new()),
                error: Mutex::new(None),
            }
        }

        pub fn with_entity(self, entity: E) -> Self {
            self.entities
                .lock()
                .unwrap()
                .insert(entity.key().as_str().to_string(), entity);
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            self.set_error(Some(error.into()));
            self
        }

        pub fn set_error(&self, error: Option<String>) {
            *self.error.lock().unwrap() = error;
        }

        fn check_error(&self) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::storage(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl<E> Storage<E> for MockStorage<E>
    where
        E: StorageEntity + 'static,
    {
        async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
            self.check_error()?;
            Ok(self.entities.lock().unwrap().get(key.as_str()).cloned())
        }

        async fn list(&self) -> Result<Vec<E>, DomainError> {
            self.check_error()?;
            Ok(self.entities.lock().unwrap().values().cloned().collect())
        }

        async fn find(&self, query: &DocumentQuery) -> Result<FindResult<E>, DomainError> {
            self.check_error()?;
            let matching: Vec<(Value, E)> = self
                .entities
                .lock()
                .unwrap()
                .values()
                .map(|e| (serde_json::to_value(e).unwrap(), e.clone()))
                .filter(|(document, _)| query.matches(document))
                .collect();

            let total = matching.len();
            Ok(FindResult {
                items: query.arrange(matching),
                total,
            })
        }

        async fn create(&self, entity: E) -> Result<E, DomainError> {
            self.check_error()?;
            let key = entity.key().as_str().to_string();
            let mut entities = self.entities.lock().unwrap();

            if entities.contains_key(&key) {
                return Err(DomainError::already_exists(format!(
                    "Entity with key '{}' already exists",
                    key
                )));
            }

            entities.insert(key, entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: E) -> Result<E, DomainError> {
            self.check_error()?;
            let key = entity.key().as_str().to_string();
            let mut entities = self.entities.lock().unwrap();

            if !entities.contains_key(&key) {
                return Err(DomainError::not_found(format!(
                    "Entity with key '{}' not found",
                    key
                )));
            }

            entities.insert(key, entity.clone());
            Ok(entity)
        }

        async fn patch(&self, key: &E::Key, fields: Map<String, Value>) -> Result<E, DomainError> {
            self.check_error()?;
            let mut entities = self.entities.lock().unwrap();

            let Some(current) = entities.get(key.as_str()) else {
                return Err(DomainError::not_found(format!(
                    "Entity with key '{}' not found",
                    key.as_str()
                )));
            };

            let patched = merge_fields(current, fields)?;
            entities.insert(key.as_str().to_string(), patched.clone());
            Ok(patched)
        }

        async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
            self.check_error()?;
            Ok(self.entities.lock().unwrap().remove(key.as_str()).is_some())
        }

        async fn clear(&self) -> Result<(), DomainError> {
            self.check_error()?;
            self.entities.lock().unwrap().clear();
            Ok(())
        }
    }

    /// Changes the stored document right after the `nth` `get`, so the caller
    /// is left holding a stale copy while another writer has moved on.
    pub struct InterleavingStorage<E>
    where
        E: StorageEntity,
    {
        inner: MockStorage<E>,
        nth: usize,
        gets: AtomicUsize,
        interleave: Box<dyn Fn(&mut E) + Send + Sync>,
    }

    impl<E> InterleavingStorage<E>
    where
        E: StorageEntity,
    {
        pub fn new(
            inner: MockStorage<E>,
            nth: usize,
            interleave: impl Fn(&mut E) + Send + Sync + 'static,
        ) -> Self {
            Self {
                inner,
                nth,
                gets: AtomicUsize::new(0),
                interleave: Box::new(interleave),
            }
        }
    }

    impl<E> Debug for InterleavingStorage<E>
    where
        E: StorageEntity,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("InterleavingStorage")
                .field("nth", &self.nth)
                .finish_non_exhaustive()
        }
    }

    #[async_trait]
    impl<E> Storage<E> for InterleavingStorage<E>
    where
        E: StorageEntity + 'static,
    {
        async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
            let current = self.inner.get(key).await?;

            if self.gets.fetch_add(1, Ordering::SeqCst) + 1 == self.nth {
                if let Some(stored) = self.inner.entities.lock().unwrap().get_mut(key.as_str()) {
                    (self.interleave)(stored);
                }
            }

            Ok(current)
        }

        async fn list(&self) -> Result<Vec<E>, DomainError> {
            self.inner.list().await
        }

        async fn find(&self, query: &DocumentQuery) -> Result<FindResult<E>, DomainError> {
            self.inner.find(query).await
        }

        async fn create(&self, entity: E) -> Result<E, DomainError> {
            self.inner.create(entity).await
        }

        async fn update(&self, entity: E) -> Result<E, DomainError> {
            self.inner.update(entity).await
        }

        async fn patch(&self, key: &E::Key, fields: Map<String, Value>) -> Result<E, DomainError> {
            self.inner.patch(key, fields).await
        }

        async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
            self.inner.delete(key).await
        }

        async fn clear(&self) -> Result<(), DomainError> {
            self.inner.clear().await
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::storage::document_id;
        use serde::{Deserialize, Serialize};

        document_id!(TestKey);

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        struct TestEntity {
            id: TestKey,
            name: String,
            group: String,
        }

        impl StorageEntity for TestEntity {
            type Key = TestKey;
            const COLLECTION: &'static str = "tests";

            fn key(&self) -> &Self::Key {
                &self.id
            }
        }

        fn entity(id: &str, name: &str, group: &str) -> TestEntity {
            TestEntity {
                id: TestKey::new(id),
                name: name.to_string(),
                group: group.to_string(),
            }
        }

        #[tokio::test]
        async fn test_mock_storage_create_conflict() {
            let storage = MockStorage::new().with_entity(entity("1", "Test", "a"));

            let result = storage.create(entity("1", "Test", "a")).await;
            assert!(result.unwrap_err().is_key_collision());
        }

        #[tokio::test]
        async fn test_mock_storage_find_and_count() {
            let storage = MockStorage::new()
                .with_entity(entity("1", "One", "a"))
                .with_entity(entity("2", "Two", "a"))
                .with_entity(entity("3", "Three", "b"));

            let query = DocumentQuery::new().eq("group", "a");
            assert_eq!(storage.count_matching(&query).await.unwrap(), 2);

            let capped = storage.find(&query.clone().with_limit(1)).await.unwrap();
            assert_eq!(capped.items.len(), 1);
            assert_eq!(capped.total, 2);
        }

        #[tokio::test]
        async fn test_mock_patch_merges_fields() {
            let storage = MockStorage::new().with_entity(entity("1", "Test", "a"));

            let mut fields = Map::new();
            fields.insert("name".to_string(), Value::String("Patched".to_string()));

            let patched = storage.patch(&TestKey::new("1"), fields).await.unwrap();
            assert_eq!(patched.name, "Patched");
            assert_eq!(patched.group, "a");
        }

        #[tokio::test]
        async fn test_patch_missing_entity() {
            let storage: MockStorage<TestEntity> = MockStorage::new();

            let result = storage.patch(&TestKey::new("1"), Map::new()).await;
            assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
        }

        #[tokio::test]
        async fn test_interleaving_storage_changes_document_after_nth_get() {
            let storage = InterleavingStorage::new(
                MockStorage::new().with_entity(entity("1", "Test", "a")),
                2,
                |e: &mut TestEntity| e.group = "b".to_string(),
            );
            let key = TestKey::new("1");

            assert_eq!(storage.get(&key).await.unwrap().unwrap().group, "a");
            assert_eq!(storage.get(&key).await.unwrap().unwrap().group, "a");
            assert_eq!(storage.get(&key).await.unwrap().unwrap().group, "b");
        }

        #[tokio::test]
        async fn test_mock_storage_with_error() {
            let storage: MockStorage<TestEntity> =
                MockStorage::new().with_error("Simulated storage error");

            let result = storage.list().await;
            assert!(matches!(result.unwrap_err(), DomainError::Storage { .. }));

            storage.set_error(None);
            assert!(storage.list().await.is_ok());
        }
    }
}
