//! DTOs for click event data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::entities::Click;
use crate::error::AppError;

/// Default number of events returned by the clicks endpoint.
pub const DEFAULT_CLICKS_LIMIT: i64 = 100;

/// Upper bound for the `limit` query parameter.
pub const MAX_CLICKS_LIMIT: i64 = 1000;

/// Query parameters for `GET /api/links/{id}/clicks`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ClicksQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ClicksQuery {
    /// Resolves the effective limit.
    ///
    /// Defaults to [`DEFAULT_CLICKS_LIMIT`] and is capped at [`MAX_CLICKS_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `limit` is below 1.
    pub fn resolve_limit(&self) -> Result<i64, AppError> {
        match self.limit {
            None => Ok(DEFAULT_CLICKS_LIMIT),
            Some(limit) if limit < 1 => Err(AppError::bad_request(
                "limit must be at least 1",
                json!({ "limit": limit }),
            )),
            Some(limit) => Ok(limit.min(MAX_CLICKS_LIMIT)),
        }
    }
}

/// Individual click event information.
///
/// Optional fields are omitted from JSON when `None` for cleaner responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInfo {
    pub id: i64,
    pub short_code: String,
    pub destination_url: String,
    pub timestamp: DateTime<Utc>,
    pub day: NaiveDate,
    pub country: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl From<Click> for ClickInfo {
    fn from(c: Click) -> Self {
        Self {
            id: c.id,
            short_code: c.short_code,
            destination_url: c.destination_url,
            timestamp: c.clicked_at,
            day: c.day,
            country: c.country,
            user_agent: c.user_agent,
            referrer: c.referrer,
            ip: c.ip,
        }
    }
}
