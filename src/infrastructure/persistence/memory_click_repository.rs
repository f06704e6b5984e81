//! In-process click store.
//!
//! Serves as the injected fallback behind the primary backend, as the
//! primary store for `STORAGE_BACKEND=memory`, and in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::entities::{Click, ClickSummary, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    next_id: i64,
    events: Vec<Click>,
    summaries: HashMap<String, ClickSummary>,
}

/// Click repository backed by a mutex-guarded map.
///
/// The event append and the summary increment happen under one lock, so
/// concurrent writers for the same code never lose an update.
#[derive(Default)]
pub struct MemoryClickRepository {
    inner: Mutex<Inner>,
}

impl MemoryClickRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::internal("Click store lock poisoned", json!({})))
    }
}

#[async_trait]
impl ClickRepository for MemoryClickRepository {
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut inner = self.lock()?;

        inner.next_id += 1;
        let click = Click::from_new(inner.next_id, new_click);

        inner
            .summaries
            .entry(click.short_code.clone())
            .or_insert_with(|| ClickSummary::empty(&click.short_code, &click.destination_url))
            .apply(&click);
        inner.events.push(click.clone());

        Ok(click)
    }

    async fn get_summary(&self, short_code: &str) -> Result<Option<ClickSummary>, AppError> {
        Ok(self.lock()?.summaries.get(short_code).cloned())
    }

    async fn list_summaries(&self) -> Result<Vec<ClickSummary>, AppError> {
        Ok(self.lock()?.summaries.values().cloned().collect())
    }

    async fn list_events(&self, short_code: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        let inner = self.lock()?;

        let mut events: Vec<Click> = inner
            .events
            .iter()
            .filter(|c| c.short_code == short_code)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at).then(b.id.cmp(&a.id)));
        events.truncate(limit.max(0) as usize);

        Ok(events)
    }

    async fn events_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Click>, AppError> {
        let inner = self.lock()?;

        Ok(inner
            .events
            .iter()
            .filter(|c| from.is_none_or(|from| c.clicked_at >= from))
            .filter(|c| to.is_none_or(|to| c.clicked_at < to))
            .cloned()
            .collect())
    }

    async fn delete_all_for_link(&self, short_code: &str) -> Result<u64, AppError> {
        let mut inner = self.lock()?;

        let before = inner.events.len();
        inner.events.retain(|c| c.short_code != short_code);
        inner.summaries.remove(short_code);

        Ok((before - inner.events.len()) as u64)
    }

    async fn count_events(&self) -> Result<i64, AppError> {
        Ok(self.lock()?.events.len() as i64)
    }

    async fn health_check(&self) -> bool {
        self.inner.lock().is_ok()
    }
}
