//! SurrealDB repository implementations.

mod instance;
mod organization;
mod project;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

pub use instance::{SurrealInstanceRepository, verify_admin_password};
pub use organization::SurrealOrganizationRepository;
pub use project::SurrealProjectRepository;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Parse a UUID stored as a string column.
fn parse_uuid(raw: &str, entity: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {entity} UUID: {e}")))
}
