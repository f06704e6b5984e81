//! Click recording with primary/fallback storage.

use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::entities::{Click, ClickSummary, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Service for recording and reading click data across two backends.
///
/// Writes go to the primary backend first and fall back to the injected
/// fallback backend when the primary fails. Reads merge both backends so no
/// recorded click is hidden after an outage.
pub struct ClickService {
    primary: Arc<dyn ClickRepository>,
    fallback: Arc<dyn ClickRepository>,
}

impl ClickService {
    /// Creates a new click service.
    ///
    /// `fallback` should be a process-wide in-memory store constructed once at
    /// startup.
    pub fn new(primary: Arc<dyn ClickRepository>, fallback: Arc<dyn ClickRepository>) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &Arc<dyn ClickRepository> {
        &self.primary
    }

    pub fn fallback(&self) -> &Arc<dyn ClickRepository> {
        &self.fallback
    }

    /// Records a click. Never fails for the caller.
    ///
    /// On primary failure the click is written to the fallback with a
    /// warning. If both backends fail the error is logged and the unpersisted
    /// click (id 0) is returned.
    pub async fn record(&self, new_click: NewClick) -> Click {
        match self.primary.record(new_click.clone()).await {
            Ok(click) => {
                metrics::counter!("clicks_recorded_total", "store" => "primary").increment(1);
                return click;
            }
            Err(e) => {
                warn!(
                    short_code = %new_click.short_code,
                    error = %e,
                    "Primary click store failed, writing to fallback"
                );
            }
        }

        match self.fallback.record(new_click.clone()).await {
            Ok(click) => {
                metrics::counter!("clicks_recorded_total", "store" => "fallback").increment(1);
                click
            }
            Err(e) => {
                error!(
                    short_code = %new_click.short_code,
                    error = %e,
                    "Fallback click store failed, click not persisted"
                );
                metrics::counter!("clicks_recorded_total", "store" => "none").increment(1);
                Click::from_new(0, new_click)
            }
        }
    }

    /// Returns the summary for one code merged over both backends.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] only if both backends fail.
    pub async fn get_summary(&self, short_code: &str) -> Result<Option<ClickSummary>, AppError> {
        let (primary, fallback) = tokio::join!(
            self.primary.get_summary(short_code),
            self.fallback.get_summary(short_code)
        );

        let primary = match primary {
            Ok(summary) => summary,
            Err(e) => {
                warn!(short_code, error = %e, "Primary click store unavailable for summary");
                fallback.as_ref().map_err(|_| e)?;
                None
            }
        };
        let fallback = fallback.unwrap_or_else(|e| {
            warn!(short_code, error = %e, "Fallback click store unavailable for summary");
            None
        });

        Ok(match (primary, fallback) {
            (Some(mut p), Some(f)) => {
                p.merge(&f);
                Some(p)
            }
            (p, f) => p.or(f),
        })
    }

    /// Returns up to `limit` events for one code, newest first, merged over
    /// both backends.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] only if both backends fail.
    pub async fn list_events(&self, short_code: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        let (primary, fallback) = tokio::join!(
            self.primary.list_events(short_code, limit),
            self.fallback.list_events(short_code, limit)
        );

        let mut events = match (primary, fallback) {
            (Err(e), Err(_)) => return Err(e),
            (Ok(p), Ok(f)) => p.into_iter().chain(f).collect::<Vec<_>>(),
            (Ok(p), Err(e)) => {
                warn!(short_code, error = %e, "Fallback click store unavailable for events");
                p
            }
            (Err(e), Ok(f)) => {
                warn!(short_code, error = %e, "Primary click store unavailable for events");
                f
            }
        };

        events.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));
        events.truncate(limit.max(0) as usize);

        Ok(events)
    }

    /// Removes every click for one code from both backends.
    ///
    /// The fallback is always cleared, even when the primary fails.
    ///
    /// # Errors
    ///
    /// Returns the primary backend's error if it failed.
    pub async fn delete_all_for_link(&self, short_code: &str) -> Result<u64, AppError> {
        let fallback_removed = match self.fallback.delete_all_for_link(short_code).await {
            Ok(n) => n,
            Err(e) => {
                warn!(short_code, error = %e, "Failed to clear fallback clicks");
                0
            }
        };

        let primary_removed = self.primary.delete_all_for_link(short_code).await?;

        Ok(primary_removed + fallback_removed)
    }
}
