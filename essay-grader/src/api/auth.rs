//! Bearer authentication extractor
//!
//! Runs before the request body is read, so an unauthenticated request never
//! reaches the evaluation pipeline.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use essay_common::api::extract_bearer;
use tracing::{debug, warn};

use crate::{ApiError, AppState};

/// Caller identity taken from a validated bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

impl AuthenticatedUser {
    pub fn username(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = extract_bearer(header).map_err(|e| {
            debug!(path = %parts.uri.path(), error = %e, "Rejected request without usable bearer token");
            e
        })?;

        let subject = state.tokens.validate_token(token).map_err(|e| {
            warn!(path = %parts.uri.path(), error = %e, "Bearer token validation failed");
            e
        })?;

        debug!(user = %subject, "Bearer token validated");
        Ok(AuthenticatedUser(subject))
    }
}
