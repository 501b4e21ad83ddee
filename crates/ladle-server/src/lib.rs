//! The Ladle request-dispatch server.
//!
//! A flat path+query wire protocol routed onto the account/recipe stores
//! and the builder-session arena.

pub mod arena;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::app;
pub use state::AppState;
