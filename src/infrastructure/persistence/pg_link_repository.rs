//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, LinkPreview, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, short_code, destination, name, platform, \
     og_title, og_description, og_image, og_price, created_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    destination: String,
    name: String,
    platform: String,
    og_title: String,
    og_description: String,
    og_image: String,
    og_price: String,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            short_code: r.short_code,
            destination: r.destination,
            name: r.name,
            platform: r.platform,
            preview: LinkPreview {
                title: r.og_title,
                description: r.og_description,
                image: r.og_image,
                price: r.og_price,
            },
            created_at: r.created_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uniqueness of `short_code` is enforced by the table constraint; a
/// collision surfaces as [`AppError::Conflict`] and never overwrites.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            INSERT INTO links
                (short_code, destination, name, platform,
                 og_title, og_description, og_image, og_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.short_code)
            .bind(&new_link.destination)
            .bind(&new_link.name)
            .bind(&new_link.platform)
            .bind(&new_link.preview.title)
            .bind(&new_link.preview.description)
            .bind(&new_link.preview.image)
            .bind(&new_link.preview.price)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE short_code = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(short_code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links ORDER BY created_at DESC, id DESC");

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn delete_by_code(&self, short_code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE short_code = $1")
            .bind(short_code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_preview(
        &self,
        id: i64,
        preview: LinkPreview,
    ) -> Result<Option<Link>, AppError> {
        let sql = format!(
            r#"
            UPDATE links
            SET og_title = $2, og_description = $3, og_image = $4, og_price = $5
            WHERE id = $1
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .bind(&preview.title)
            .bind(&preview.description)
            .bind(&preview.image)
            .bind(&preview.price)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
