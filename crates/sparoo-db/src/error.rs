//! Database-specific error types and conversions.

use sparoo_core::error::SparooError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Decode(String),

    #[error("Credential hashing failed: {0}")]
    Crypto(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for SparooError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => SparooError::NotFound { entity, id },
            DbError::Crypto(msg) => SparooError::Crypto(msg),
            other => SparooError::Database(other.to_string()),
        }
    }
}
