//! Event registration

mod service;

pub use service::{RegisterRequest, RegistrationCoordinator};
