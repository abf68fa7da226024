//! API layer - HTTP endpoints and middleware

pub mod health;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use middleware::{OptionalUser, RequireAdmin, RequireUser};
pub use router::create_router_with_state;
pub use state::AppState;
