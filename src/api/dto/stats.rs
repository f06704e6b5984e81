//! DTOs for the click statistics endpoint.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use super::clicks::ClickInfo;
use crate::application::services::stats_service::{
    LinkStatsRow, MAX_RECENT_CLICKS, StatsFilter, StatsMeta, StatsReport, StatsSource,
};
use crate::error::AppError;

/// Query parameters for `GET /api/click-stats`.
///
/// Dates accept `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its UTC day).
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    #[serde(default)]
    pub date_from: Option<String>,

    #[serde(default)]
    pub date_to: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub recent: Option<usize>,
}

impl StatsQuery {
    /// Converts the raw query into a service filter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for unparsable dates or a `recent`
    /// value above [`MAX_RECENT_CLICKS`].
    pub fn into_filter(self) -> Result<StatsFilter, AppError> {
        let recent = self.recent.unwrap_or(0);
        if recent > MAX_RECENT_CLICKS {
            return Err(AppError::bad_request(
                format!("recent must be between 0 and {MAX_RECENT_CLICKS}"),
                json!({ "recent": recent }),
            ));
        }

        Ok(StatsFilter {
            date_from: parse_date_param("dateFrom", self.date_from.as_deref())?,
            date_to: parse_date_param("dateTo", self.date_to.as_deref())?,
            recent,
        })
    }
}

fn parse_date_param(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(day));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| Some(ts.with_timezone(&Utc).date_naive()))
        .map_err(|_| {
            AppError::bad_request(
                format!("{field} must be YYYY-MM-DD or an RFC 3339 timestamp"),
                json!({ "field": field, "value": raw }),
            )
        })
}

/// One row of the stats response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRow {
    pub short_code: String,
    pub target_url: String,
    pub name: String,
    pub total_clicks: i64,
    pub last_click_at: Option<DateTime<Utc>>,
    pub daily_click_data: BTreeMap<String, i64>,
    pub country_data: BTreeMap<String, i64>,
    pub avg_clicks_per_day: f64,
    pub source: StatsSource,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_clicks: Option<Vec<ClickInfo>>,
}

impl From<LinkStatsRow> for StatRow {
    fn from(row: LinkStatsRow) -> Self {
        let avg_clicks_per_day = row.summary.avg_clicks_per_day();
        Self {
            short_code: row.short_code,
            target_url: row.target_url,
            name: row.name,
            total_clicks: row.summary.total_clicks,
            last_click_at: row.summary.last_click_at,
            daily_click_data: row
                .summary
                .daily_clicks
                .into_iter()
                .map(|(day, n)| (day.format("%Y-%m-%d").to_string(), n))
                .collect(),
            country_data: row.summary.country_clicks,
            avg_clicks_per_day,
            source: row.source,
            recent_clicks: row
                .recent_clicks
                .map(|clicks| clicks.into_iter().map(ClickInfo::from).collect()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsMetaResponse {
    pub total_links: usize,
    pub total_clicks: i64,
    pub primary_available: bool,
    pub link_store_available: bool,
    pub fallback_clicks: i64,
    pub degraded: bool,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub generated_at: DateTime<Utc>,
}

impl From<StatsMeta> for StatsMetaResponse {
    fn from(m: StatsMeta) -> Self {
        Self {
            total_links: m.total_links,
            total_clicks: m.total_clicks,
            primary_available: m.primary_available,
            link_store_available: m.link_store_available,
            fallback_clicks: m.fallback_clicks,
            degraded: m.degraded,
            date_from: m.date_from,
            date_to: m.date_to,
            generated_at: m.generated_at,
        }
    }
}

/// Response of `GET /api/click-stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: Vec<StatRow>,
    pub meta: StatsMetaResponse,
}

impl From<StatsReport> for StatsResponse {
    fn from(report: StatsReport) -> Self {
        Self {
            stats: report.stats.into_iter().map(StatRow::from).collect(),
            meta: report.meta.into(),
        }
    }
}
