//! In-memory storage implementation

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::storage::{
    merge_fields, DocumentQuery, FindResult, Storage, StorageEntity, StorageKey,
};
use crate::domain::DomainError;

/// Thread-safe in-memory storage implementation
///
/// Useful for testing and development. Data is lost when the process terminates.
/// Filters are evaluated against each entity's serialized JSON, the same shape
/// the Postgres backend queries.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<HashMap<String, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }

    /// Creates storage pre-populated with entities
    pub fn with_entities(entities: Vec<E>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.key().as_str().to_string(), entity))
            .collect();

        Self {
            entities: RwLock::new(map),
        }
    }

    fn read_lock(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, E>>, DomainError> {
        self.entities
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, E>>, DomainError> {
        self.entities
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self.read_lock()?.get(key.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(self.read_lock()?.values().cloned().collect())
    }

    async fn find(&self, query: &DocumentQuery) -> Result<FindResult<E>, DomainError> {
        let entities = self.read_lock()?;
        let mut matches = Vec::new();

        for entity in entities.values() {
            let document = serde_json::to_value(entity)
                .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))?;

            if query.matches(&document) {
                matches.push((document, entity.clone()));
            }
        }

        let total = matches.len();
        Ok(FindResult {
            items: query.arrange(matches),
            total,
        })
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.write_lock()?;

        if entities.contains_key(&key) {
            return Err(DomainError::already_exists(format!(
                "{} document '{}' already exists",
                E::COLLECTION,
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.write_lock()?;

        if !entities.contains_key(&key) {
            return Err(DomainError::not_found(format!(
                "{} document '{}' not found",
                E::COLLECTION,
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn patch(&self, key: &E::Key, fields: Map<String, Value>) -> Result<E, DomainError> {
        let mut entities = self.write_lock()?;

        let current = entities.get(key.as_str()).ok_or_else(|| {
            DomainError::not_found(format!(
                "{} document '{}' not found",
                E::COLLECTION,
                key.as_str()
            ))
        })?;

        let patched = merge_fields(current, fields)?;
        entities.insert(key.as_str().to_string(), patched.clone());
        Ok(patched)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.write_lock()?.remove(key.as_str()).is_some())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.write_lock()?.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read_lock()?.len())
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.read_lock()?.contains_key(key.as_str()))
    }
}
