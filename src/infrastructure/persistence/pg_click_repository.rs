//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{Click, ClickSummary, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

const EVENT_COLUMNS: &str =
    "id, short_code, destination_url, clicked_at, day, ip, user_agent, referrer, country";

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    short_code: String,
    destination_url: String,
    clicked_at: DateTime<Utc>,
    day: NaiveDate,
    ip: Option<String>,
    user_agent: Option<String>,
    referrer: Option<String>,
    country: String,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            short_code: r.short_code,
            destination_url: r.destination_url,
            clicked_at: r.clicked_at,
            day: r.day,
            ip: r.ip,
            user_agent: r.user_agent,
            referrer: r.referrer,
            country: r.country,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    short_code: String,
    target_url: String,
    total_clicks: i64,
    last_click_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct DailyRow {
    short_code: String,
    day: NaiveDate,
    clicks: i64,
}

#[derive(sqlx::FromRow)]
struct CountryRow {
    short_code: String,
    country: String,
    clicks: i64,
}

/// PostgreSQL repository for click events and their summaries.
///
/// `record` inserts the event and bumps the summary, daily and country
/// counters in a single transaction. Counters use `ON CONFLICT DO UPDATE`
/// increments, so concurrent writers never lose an update.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Loads summaries, optionally restricted to one short code.
    async fn load_summaries(&self, short_code: Option<&str>) -> Result<Vec<ClickSummary>, AppError> {
        let summaries = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT short_code, target_url, total_clicks, last_click_at
            FROM click_summaries
            WHERE ($1::text IS NULL OR short_code = $1)
            "#,
        )
        .bind(short_code)
        .fetch_all(self.pool.as_ref())
        .await?;

        if summaries.is_empty() {
            return Ok(Vec::new());
        }

        let daily = sqlx::query_as::<_, DailyRow>(
            r#"
            SELECT short_code, day, clicks
            FROM click_daily
            WHERE ($1::text IS NULL OR short_code = $1)
            "#,
        )
        .bind(short_code)
        .fetch_all(self.pool.as_ref())
        .await?;

        let countries = sqlx::query_as::<_, CountryRow>(
            r#"
            SELECT short_code, country, clicks
            FROM click_countries
            WHERE ($1::text IS NULL OR short_code = $1)
            "#,
        )
        .bind(short_code)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut by_code: HashMap<String, ClickSummary> = summaries
            .into_iter()
            .map(|r| {
                let mut summary = ClickSummary::empty(&r.short_code, r.target_url);
                summary.total_clicks = r.total_clicks;
                summary.last_click_at = r.last_click_at;
                (r.short_code, summary)
            })
            .collect();

        for row in daily {
            if let Some(summary) = by_code.get_mut(&row.short_code) {
                summary.daily_clicks.insert(row.day, row.clicks);
            }
        }
        for row in countries {
            if let Some(summary) = by_code.get_mut(&row.short_code) {
                summary.country_clicks.insert(row.country, row.clicks);
            }
        }

        Ok(by_code.into_values().collect())
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO click_events
                (short_code, destination_url, clicked_at, day, ip, user_agent, referrer, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let click: Click = sqlx::query_as::<_, ClickRow>(&sql)
            .bind(&new_click.short_code)
            .bind(&new_click.destination_url)
            .bind(new_click.clicked_at)
            .bind(new_click.clicked_at.date_naive())
            .bind(&new_click.ip)
            .bind(&new_click.user_agent)
            .bind(&new_click.referrer)
            .bind(&new_click.country)
            .fetch_one(&mut *tx)
            .await?
            .into();

        sqlx::query(
            r#"
            INSERT INTO click_summaries (short_code, target_url, total_clicks, last_click_at)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (short_code) DO UPDATE SET
                total_clicks = click_summaries.total_clicks + 1,
                target_url = CASE
                    WHEN click_summaries.last_click_at IS NULL
                      OR EXCLUDED.last_click_at >= click_summaries.last_click_at
                    THEN EXCLUDED.target_url
                    ELSE click_summaries.target_url
                END,
                last_click_at = GREATEST(click_summaries.last_click_at, EXCLUDED.last_click_at)
            "#,
        )
        .bind(&click.short_code)
        .bind(&click.destination_url)
        .bind(click.clicked_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO click_daily (short_code, day, clicks)
            VALUES ($1, $2, 1)
            ON CONFLICT (short_code, day) DO UPDATE SET clicks = click_daily.clicks + 1
            "#,
        )
        .bind(&click.short_code)
        .bind(click.day)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO click_countries (short_code, country, clicks)
            VALUES ($1, $2, 1)
            ON CONFLICT (short_code, country) DO UPDATE SET clicks = click_countries.clicks + 1
            "#,
        )
        .bind(&click.short_code)
        .bind(&click.country)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(click)
    }

    async fn get_summary(&self, short_code: &str) -> Result<Option<ClickSummary>, AppError> {
        Ok(self.load_summaries(Some(short_code)).await?.into_iter().next())
    }

    async fn list_summaries(&self) -> Result<Vec<ClickSummary>, AppError> {
        self.load_summaries(None).await
    }

    async fn list_events(&self, short_code: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM click_events
            WHERE short_code = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2
            "#
        );

        let rows = sqlx::query_as::<_, ClickRow>(&sql)
            .bind(short_code)
            .bind(limit.max(0))
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn events_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Click>, AppError> {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM click_events
            WHERE ($1::timestamptz IS NULL OR clicked_at >= $1)
              AND ($2::timestamptz IS NULL OR clicked_at < $2)
            "#
        );

        let rows = sqlx::query_as::<_, ClickRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn delete_all_for_link(&self, short_code: &str) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM click_events WHERE short_code = $1")
            .bind(short_code)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for table in ["click_summaries", "click_daily", "click_countries"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE short_code = $1"))
                .bind(short_code)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(removed)
    }

    async fn count_events(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM click_events")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
