//! Storage domain - Generic document storage abstraction layer

mod entity;
mod query;
mod repository;

pub(crate) use entity::document_id;
pub use entity::{derive_key, StorageEntity, StorageKey};
pub use query::{
    DocumentQuery, Filter, FilterOperator, FilterValue, FindResult, SortDirection, TimeOrder,
};
pub use repository::{merge_fields, Storage};

#[cfg(test)]
pub use repository::mock;
