//! Provisioning error types.

use std::path::PathBuf;

use sparoo_core::error::{ClusterFailure, SparooError};
use thiserror::Error;

/// Failures while turning a template into a workload object.
///
/// These indicate a deployment or template bug, never a user error.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unresolved placeholder {{{{{0}}}}}")]
    UnresolvedPlaceholder(String),

    #[error("malformed placeholder at byte {offset}: {reason}")]
    MalformedPlaceholder { offset: usize, reason: String },

    #[error("rendered manifest is not valid YAML: {0}")]
    InvalidManifest(String),

    #[error("manifest declares {found}, expected {expected}")]
    KindMismatch { expected: String, found: String },

    #[error("no built-in template for engine {0}; set template_path")]
    NoBuiltinTemplate(String),

    #[error("cannot read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<TemplateError> for SparooError {
    fn from(err: TemplateError) -> Self {
        SparooError::Template(err.to_string())
    }
}

/// Cluster control-plane failures, classified for the caller.
#[derive(Debug, Clone, Error)]
pub enum ClusterError {
    #[error("cluster credentials rejected: {0}")]
    Unauthorized(String),

    #[error("workload already exists: {0}")]
    Conflict(String),

    #[error("control plane unavailable: {0}")]
    Unavailable(String),

    #[error("workload rejected by control plane: {0}")]
    Rejected(String),

    #[error("cluster credentials missing or malformed: {0}")]
    Configuration(String),
}

impl ClusterError {
    /// Classification for submission failures; `None` for setup errors.
    pub fn failure(&self) -> Option<ClusterFailure> {
        match self {
            ClusterError::Unauthorized(_) => Some(ClusterFailure::Unauthorized),
            ClusterError::Conflict(_) => Some(ClusterFailure::Conflict),
            ClusterError::Unavailable(_) => Some(ClusterFailure::Unavailable),
            ClusterError::Rejected(_) => Some(ClusterFailure::Rejected),
            ClusterError::Configuration(_) => None,
        }
    }
}

impl From<ClusterError> for SparooError {
    fn from(err: ClusterError) -> Self {
        match err.failure() {
            Some(kind) => SparooError::Cluster {
                kind,
                message: err.to_string(),
            },
            None => SparooError::Configuration(err.to_string()),
        }
    }
}
