//! Repository implementations.
//!
//! Concrete implementations of the domain repository traits: PostgreSQL via
//! SQLx, and in-process stores used for `STORAGE_BACKEND=memory`, the click
//! fallback, and tests.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage in PostgreSQL
//! - [`PgClickRepository`] - Click events and summaries in PostgreSQL
//! - [`MemoryLinkRepository`] - In-process link map
//! - [`MemoryClickRepository`] - In-process click store

pub mod memory_click_repository;
pub mod memory_link_repository;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory_click_repository::MemoryClickRepository;
pub use memory_link_repository::MemoryLinkRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
