//! In-process link store for `STORAGE_BACKEND=memory` and tests.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::entities::{Link, LinkPreview, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    next_id: i64,
    by_code: HashMap<String, Link>,
}

/// Link repository backed by a lock-guarded map keyed by short code.
#[derive(Default)]
pub struct MemoryLinkRepository {
    inner: RwLock<Inner>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, AppError> {
        self.inner
            .read()
            .map_err(|_| AppError::internal("Link store lock poisoned", json!({})))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, AppError> {
        self.inner
            .write()
            .map_err(|_| AppError::internal("Link store lock poisoned", json!({})))
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut inner = self.write()?;

        if inner.by_code.contains_key(&new_link.short_code) {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "short_code": new_link.short_code }),
            ));
        }

        inner.next_id += 1;
        let link = Link {
            id: inner.next_id,
            short_code: new_link.short_code,
            destination: new_link.destination,
            name: new_link.name,
            platform: new_link.platform,
            preview: new_link.preview,
            created_at: Utc::now(),
        };
        inner.by_code.insert(link.short_code.clone(), link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.read()?.by_code.get(short_code).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.read()?.by_code.values().find(|l| l.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        let mut links: Vec<Link> = self.read()?.by_code.values().cloned().collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn delete_by_code(&self, short_code: &str) -> Result<bool, AppError> {
        Ok(self.write()?.by_code.remove(short_code).is_some())
    }

    async fn update_preview(
        &self,
        id: i64,
        preview: LinkPreview,
    ) -> Result<Option<Link>, AppError> {
        let mut inner = self.write()?;

        Ok(inner.by_code.values_mut().find(|l| l.id == id).map(|link| {
            link.preview = preview;
            link.clone()
        }))
    }

    async fn health_check(&self) -> bool {
        self.inner.read().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_link(code: &str) -> NewLink {
        NewLink {
            short_code: code.to_string(),
            destination: "https://example.com/".to_string(),
            name: "Example".to_string(),
            platform: "other".to_string(),
            preview: LinkPreview::default(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = MemoryLinkRepository::new();

        let link = repo.insert(new_link("abc")).await.unwrap();

        let by_code = repo.find_by_code("abc").await.unwrap().unwrap();
        let by_id = repo.find_by_id(link.id).await.unwrap().unwrap();
        assert_eq!(by_code.id, link.id);
        assert_eq!(by_id.short_code, "abc");
        assert!(repo.find_by_code("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict_and_keeps_original() {
        let repo = MemoryLinkRepository::new();
        repo.insert(new_link("abc")).await.unwrap();

        let mut dup = new_link("abc");
        dup.destination = "https://other.com/".to_string();
        let err = repo.insert(dup).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        let stored = repo.find_by_code("abc").await.unwrap().unwrap();
        assert_eq!(stored.destination, "https://example.com/");
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let repo = MemoryLinkRepository::new();
        repo.insert(new_link("first")).await.unwrap();
        repo.insert(new_link("second")).await.unwrap();

        let links = repo.list_all().await.unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].short_code, "second");
    }

    #[tokio::test]
    async fn test_delete_and_update_preview() {
        let repo = MemoryLinkRepository::new();
        let link = repo.insert(new_link("abc")).await.unwrap();

        let preview = LinkPreview {
            title: "New".to_string(),
            ..Default::default()
        };
        let updated = repo.update_preview(link.id, preview).await.unwrap().unwrap();
        assert_eq!(updated.preview.title, "New");
        assert!(repo.update_preview(999, LinkPreview::default()).await.unwrap().is_none());

        assert!(repo.delete_by_code("abc").await.unwrap());
        assert!(!repo.delete_by_code("abc").await.unwrap());
    }
}
