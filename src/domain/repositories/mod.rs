//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the persistence backend. Implementations live in
//! `crate::infrastructure::persistence`; mocks are generated with `mockall`
//! for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Tracking link storage
//! - [`ClickRepository`] - Click events and per-link summaries

pub mod click_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
