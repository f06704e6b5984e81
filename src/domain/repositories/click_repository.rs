//! Repository trait for click events and their summaries.

use crate::domain::entities::{Click, ClickSummary, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for click events and pre-aggregated summaries.
///
/// Both the primary backend and the in-memory fallback implement this trait;
/// [`crate::application::services::ClickService`] and
/// [`crate::application::services::StatsService`] treat them uniformly.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryClickRepository`] - in-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Stores a click and increments the summary for its short code.
    ///
    /// The event insert and the summary increment are applied atomically, and
    /// concurrent calls for the same code never lose an increment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the backend fails.
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Returns the summary for one short code, if any click was recorded.
    async fn get_summary(&self, short_code: &str) -> Result<Option<ClickSummary>, AppError>;

    /// Returns every stored summary.
    async fn list_summaries(&self) -> Result<Vec<ClickSummary>, AppError>;

    /// Returns up to `limit` events for one short code, newest first.
    async fn list_events(&self, short_code: &str, limit: i64) -> Result<Vec<Click>, AppError>;

    /// Returns all events with `from <= clicked_at < to`; open bounds are unrestricted.
    async fn events_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Click>, AppError>;

    /// Removes every event and the summary for one short code.
    ///
    /// Returns the number of events removed.
    async fn delete_all_for_link(&self, short_code: &str) -> Result<u64, AppError>;

    /// Counts all stored events.
    async fn count_events(&self) -> Result<i64, AppError>;

    /// Reports whether the backend is reachable.
    async fn health_check(&self) -> bool;
}
