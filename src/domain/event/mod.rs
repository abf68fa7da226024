//! Event domain module

mod entity;

pub use entity::{Event, EventId, Registration, RegistrationId};
