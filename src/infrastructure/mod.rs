//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and outbound fetches.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`preview`] - Open Graph preview fetching (HTTP and no-op implementations)

pub mod persistence;
pub mod preview;
