//! Sparoo Core — domain models, error types and repository traits
//! shared by every Sparoo crate.

pub mod error;
pub mod models;
pub mod repository;
