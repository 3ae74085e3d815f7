//! Error types for the Sparoo system.

use std::fmt;

use thiserror::Error;

/// Classification of a failed cluster submission.
///
/// Lets callers tell "try again later" (`Unavailable`) apart from
/// "fix the request or the deployment" (everything else).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterFailure {
    /// Cluster credentials were rejected.
    Unauthorized,
    /// The workload object already exists.
    Conflict,
    /// Control plane unreachable or the call timed out.
    Unavailable,
    /// Control plane refused the object body.
    Rejected,
}

impl ClusterFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterFailure::Unauthorized => "unauthorized",
            ClusterFailure::Conflict => "conflict",
            ClusterFailure::Unavailable => "unavailable",
            ClusterFailure::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ClusterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SparooError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict on {entity}: {reason}")]
    Conflict { entity: String, reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Cluster error ({kind}): {message}")]
    Cluster {
        kind: ClusterFailure,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SparooError {
    /// Shorthand for a validation failure on a single request field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SparooError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable, machine-readable kind used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SparooError::NotFound { .. } => "not_found",
            SparooError::Conflict { .. } => "conflict",
            SparooError::AuthorizationDenied { .. } => "authorization",
            SparooError::Validation { .. } => "validation",
            SparooError::Database(_) => "persistence",
            SparooError::Template(_) => "template",
            SparooError::Cluster { .. } => "cluster",
            SparooError::Configuration(_) => "configuration",
            SparooError::Crypto(_) => "crypto",
            SparooError::Internal(_) => "internal",
        }
    }
}

pub type SparooResult<T> = Result<T, SparooError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_names_the_field() {
        let err = SparooError::validation("allow_cidrs", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation error on `allow_cidrs`: must not be empty"
        );
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn cluster_error_displays_classification() {
        let err = SparooError::Cluster {
            kind: ClusterFailure::Unavailable,
            message: "timed out".into(),
        };
        assert_eq!(err.to_string(), "Cluster error (unavailable): timed out");
    }
}
