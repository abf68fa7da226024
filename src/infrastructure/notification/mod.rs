//! Registration notification delivery

mod http;
mod log;

pub use http::{HttpEmailNotifier, EVENT_HEADER, SIGNATURE_HEADER};
pub use log::LogNotifier;
