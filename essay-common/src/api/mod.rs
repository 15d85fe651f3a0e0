//! Shared HTTP API functionality
//!
//! Provides bearer-token authentication and the request/response value types
//! exchanged at the HTTP boundary.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! The grader wraps these with axum extractors and handlers.

pub mod auth;
pub mod types;

pub use auth::{extract_bearer, hash_password, AuthError, Claims, TokenService};
pub use types::{
    ErrorResponse, EssayRequest, EssayResponse, ExemplaryEssayRequest, ExemplaryEssayResponse,
    ImprovementRequest, ImprovementResponse, TokenForm, TokenResponse,
};
