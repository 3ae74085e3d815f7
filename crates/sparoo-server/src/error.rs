//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sparoo_core::error::{ClusterFailure, SparooError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or empty actor header")]
    Unauthenticated,

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] SparooError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Domain(err) => match err {
                SparooError::Validation { .. } => StatusCode::BAD_REQUEST,
                SparooError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
                SparooError::NotFound { .. } => StatusCode::NOT_FOUND,
                SparooError::Conflict { .. } => StatusCode::CONFLICT,
                SparooError::Cluster {
                    kind: ClusterFailure::Unavailable,
                    ..
                } => StatusCode::SERVICE_UNAVAILABLE,
                SparooError::Cluster { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::BadRequest(_) => "validation",
            Self::Domain(err) => err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Server-side failures are logged in full but reported generically.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = json!({ "error": self.kind(), "message": message });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: SparooError) -> StatusCode {
        ApiError::from(err).status_code()
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            status(SparooError::validation("allow_cidrs", "entry 2 is empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(SparooError::AuthorizationDenied {
                reason: "not owner".into()
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(SparooError::NotFound {
                entity: "instance".into(),
                id: "x".into()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(SparooError::Conflict {
                entity: "instance".into(),
                reason: "dup".into()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(SparooError::Cluster {
                kind: ClusterFailure::Unavailable,
                message: "timeout".into()
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(SparooError::Cluster {
                kind: ClusterFailure::Rejected,
                message: "invalid".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(SparooError::Database("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(SparooError::Template("unresolved".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthenticated_is_401() {
        assert_eq!(
            ApiError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
