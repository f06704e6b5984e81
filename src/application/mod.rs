//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation, bulk creation, deletion
//! - [`services::click_service::ClickService`] - Click recording with fallback storage
//! - [`services::stats_service::StatsService`] - Merged click statistics
//! - [`services::auth_service::AuthService`] - Dashboard token authentication

pub mod services;
