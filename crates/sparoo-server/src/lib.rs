//! Sparoo Server — HTTP surface for the provisioning pipeline.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

pub use config::ServerConfig;
pub use routes::{AppState, router};
