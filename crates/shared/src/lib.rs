//! Shared types, errors, and configuration for FieldOps.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Non-negative monetary amounts
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - Caller identity resolution (JWT) and request payloads

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
