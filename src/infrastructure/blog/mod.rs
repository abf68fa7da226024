//! Blog moderation

mod service;

pub use service::{CreateBlogRequest, ModerationStateMachine, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
