//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization with camelCase
//! field names, and validator for input validation.

pub mod bulk;
pub mod clicks;
pub mod delete;
pub mod health;
pub mod link;
pub mod stats;
