//! Actor extraction.
//!
//! Authentication happens upstream; the gateway forwards the verified
//! subject identifier in the `x-sparoo-actor` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-sparoo-actor";

/// The authenticated subject making the request.
#[derive(Debug, Clone)]
pub struct Actor(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthenticated)?;
        Ok(Actor(actor.to_string()))
    }
}
