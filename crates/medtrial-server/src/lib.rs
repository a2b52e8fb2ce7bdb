//! HTTP server for the clinical-trial management API.
//!
//! Wires configuration, tracing, the shared PostgreSQL pool, and the
//! axum router over the storage layer in `medtrial-db`.

pub mod config;
pub mod demo_auth;
pub mod handlers;
pub mod observability;
pub mod server;
pub mod state;
pub mod validation;

pub use config::AppConfig;
pub use server::{MedtrialServer, ServerBuilder, build_app};
pub use state::AppState;
