//! Shared API request/response types
//!
//! Plain value objects for the HTTP boundary. Score fields in responses are on
//! the 0-10 scale.

use serde::{Deserialize, Serialize};

// ========================================
// Grading
// ========================================

/// Body of `POST /v1/grade_essay`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EssayRequest {
    pub essay: String,
}

/// Scores (0-10) and corrective feedback for one essay
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EssayResponse {
    pub final_score: f64,
    pub relevance_score: f64,
    pub grammar_score: f64,
    pub structure_score: f64,
    pub depth_score: f64,
    pub corrections: String,
}

/// Body of `POST /v1/suggest_improvements`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImprovementRequest {
    pub essay: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ImprovementResponse {
    pub suggestions: String,
}

// ========================================
// Exemplary essays
// ========================================

/// Body of `POST /v1/generate_exemplary_essay`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExemplaryEssayRequest {
    pub theme: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExemplaryEssayResponse {
    pub essay: String,
}

// ========================================
// Authentication
// ========================================

/// OAuth2 password-grant form posted to `/v1/token`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Issued access token
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "bearer".to_string(),
        }
    }
}

// ========================================
// Error Response Types
// ========================================

/// Error body returned for 401 and 500 responses
///
/// # Examples
///
/// ```
/// use essay_common::api::types::ErrorResponse;
///
/// let error = ErrorResponse::new("Could not validate credentials");
/// assert_eq!(error.detail, "Could not validate credentials");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

// ========================================
// Tests
// ========================================
