//! Click entity representing a single human visit through a tracking link.

use chrono::{DateTime, NaiveDate, Utc};

/// Country recorded when no edge header supplied one.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// A recorded click event.
///
/// Immutable once stored. `day` is the UTC calendar date of `clicked_at`,
/// kept alongside it so daily aggregation does not need to re-derive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Click {
    pub id: i64,
    pub short_code: String,
    pub destination_url: String,
    pub clicked_at: DateTime<Utc>,
    pub day: NaiveDate,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: String,
}

impl Click {
    /// Materializes a stored click from its input and the id the store assigned.
    pub fn from_new(id: i64, new_click: NewClick) -> Self {
        Self {
            id,
            day: new_click.clicked_at.date_naive(),
            short_code: new_click.short_code,
            destination_url: new_click.destination_url,
            clicked_at: new_click.clicked_at,
            ip: new_click.ip,
            user_agent: new_click.user_agent,
            referrer: new_click.referrer,
            country: new_click.country,
        }
    }
}

/// Input data for recording a click.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub short_code: String,
    pub destination_url: String,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: String,
}

impl NewClick {
    /// Creates a click stamped with the current time and an unknown country.
    pub fn new(short_code: impl Into<String>, destination_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            destination_url: destination_url.into(),
            clicked_at: Utc::now(),
            ip: None,
            user_agent: None,
            referrer: None,
            country: UNKNOWN_COUNTRY.to_string(),
        }
    }

    /// Sets the country, mapping blank values to [`UNKNOWN_COUNTRY`].
    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string());
        self
    }
}
