//! Blog domain module
//!
//! Posts move `draft -> pending -> {published, rejected}`. Creation enters at
//! `pending`; approval and rejection are admin-only.

mod entity;
mod validation;

pub use entity::{Blog, BlogId, BlogPatch, BlogStatus};
pub use validation::{
    excerpt_from, normalize_tags, slugify, validate_blog_content, validate_blog_title,
    validate_rejection_reason, validate_tags, BlogValidationError, EXCERPT_LENGTH,
    MAX_CONTENT_LENGTH, MAX_REJECTION_REASON_LENGTH, MIN_REJECTION_REASON_LENGTH,
};
