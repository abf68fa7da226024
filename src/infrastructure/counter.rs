//! Advisory counters stored on documents
//!
//! The store has no atomic increment, so counters such as a team's member
//! count or a post's views are read, changed and written back as a single
//! field. Concurrent writers can lose increments, never other fields. Stored
//! values are therefore advisory and can be recomputed from source documents
//! with [`recount`].

use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::storage::{DocumentQuery, Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Overwrite one counter field, leaving the rest of the document untouched
pub async fn set<E>(
    storage: &dyn Storage<E>,
    key: &E::Key,
    counter: &'static str,
    value: u64,
) -> Result<E, DomainError>
where
    E: StorageEntity + 'static,
{
    let mut fields = Map::new();
    fields.insert(counter.to_string(), Value::from(value));

    storage.patch(key, fields).await
}

/// Read the document, derive the next counter value and write only that field
pub async fn adjust<E, F>(
    storage: &dyn Storage<E>,
    key: &E::Key,
    counter: &'static str,
    next: F,
) -> Result<E, DomainError>
where
    E: StorageEntity + 'static,
    F: FnOnce(&E) -> u64 + Send,
{
    let current = storage.get(key).await?.ok_or_else(|| {
        DomainError::not_found(format!("{} document '{}' not found", E::COLLECTION, key.as_str()))
    })?;

    set(storage, key, counter, next(&current)).await
}

/// Like [`adjust`], but a failure is logged and swallowed
pub async fn adjust_best_effort<E, F>(
    storage: &dyn Storage<E>,
    key: &E::Key,
    counter: &'static str,
    next: F,
) -> Option<E>
where
    E: StorageEntity + 'static,
    F: FnOnce(&E) -> u64 + Send,
{
    match adjust(storage, key, counter, next).await {
        Ok(entity) => Some(entity),
        Err(e) => {
            warn!(
                collection = E::COLLECTION,
                key = key.as_str(),
                counter,
                error = %e,
                "Counter update failed; value is stale until reconciled"
            );
            None
        }
    }
}

/// Ground truth for a counter: the number of matching source documents
pub async fn recount<M>(storage: &dyn Storage<M>, query: &DocumentQuery) -> Result<u32, DomainError>
where
    M: StorageEntity + 'static,
{
    let total = storage.count_matching(query).await?;

    u32::try_from(total)
        .map_err(|_| DomainError::internal(format!("Count {} does not fit a counter", total)))
}
