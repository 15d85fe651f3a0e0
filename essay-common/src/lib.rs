//! # Essay Grader Common Library
//!
//! Shared code for the essay grading service:
//! - Error type
//! - Configuration loading and resolution
//! - Bearer token issuance and validation
//! - API request/response types

pub mod api;
pub mod config;
pub mod error;

pub use error::{Error, Result};
