//! Sparoo Database — SurrealDB connection management, schema migrations
//! and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations for the `sparoo-core` traits
//! - Admin credential verification ([`verify_admin_password`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use repository::verify_admin_password;
pub use schema::run_migrations;
