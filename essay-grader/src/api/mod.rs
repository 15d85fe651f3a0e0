//! HTTP API handlers for essay-grader
//!
//! Versioned routes live under `/v1`. Authentication is enforced per handler
//! through the [`AuthenticatedUser`] extractor.

pub mod auth;
pub mod exemplary;
pub mod grading;
pub mod health;
pub mod token;

pub use auth::AuthenticatedUser;
pub use exemplary::exemplary_routes;
pub use grading::grading_routes;
pub use health::health_routes;
pub use token::token_routes;
