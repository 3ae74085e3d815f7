//! Domain models for Sparoo.
//!
//! Every entity carries the identifier of the actor that created it;
//! that identifier is the only multi-tenancy boundary.

pub mod instance;
pub mod organization;
pub mod project;
