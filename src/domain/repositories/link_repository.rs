//! Repository trait for tracking link storage.

use crate::domain::entities::{Link, LinkPreview, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for tracking links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Persists a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken. The
    /// existing record is never overwritten.
    ///
    /// Returns [`AppError::Storage`] if the backend fails.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by its id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Lists every link, newest first by creation time.
    async fn list_all(&self) -> Result<Vec<Link>, AppError>;

    /// Removes a link.
    ///
    /// Returns `Ok(false)` if no link had this code.
    async fn delete_by_code(&self, short_code: &str) -> Result<bool, AppError>;

    /// Replaces the preview metadata of a link.
    ///
    /// Returns `Ok(None)` if no link has this id.
    async fn update_preview(&self, id: i64, preview: LinkPreview)
    -> Result<Option<Link>, AppError>;

    /// Reports whether the backend is reachable.
    async fn health_check(&self) -> bool;
}
