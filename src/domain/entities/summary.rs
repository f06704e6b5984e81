//! Pre-aggregated click counters for a single link.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

use super::click::Click;

/// Aggregated click counters keyed by short code.
///
/// Invariant: `total_clicks` equals the number of applied clicks, and both
/// `daily_clicks` and `country_clicks` sum to `total_clicks`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickSummary {
    pub short_code: String,
    pub target_url: String,
    pub total_clicks: i64,
    pub last_click_at: Option<DateTime<Utc>>,
    pub daily_clicks: BTreeMap<NaiveDate, i64>,
    pub country_clicks: BTreeMap<String, i64>,
}

impl ClickSummary {
    /// An empty summary with zero clicks.
    pub fn empty(short_code: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            target_url: target_url.into(),
            total_clicks: 0,
            last_click_at: None,
            daily_clicks: BTreeMap::new(),
            country_clicks: BTreeMap::new(),
        }
    }

    /// Builds a summary by grouping raw events.
    ///
    /// Returns `None` when `clicks` is empty.
    pub fn from_clicks<'a>(clicks: impl IntoIterator<Item = &'a Click>) -> Option<Self> {
        let mut iter = clicks.into_iter();
        let first = iter.next()?;

        let mut summary = Self::empty(&first.short_code, &first.destination_url);
        summary.apply(first);
        for click in iter {
            summary.apply(click);
        }
        Some(summary)
    }

    /// Counts one click.
    ///
    /// `last_click_at` only moves forward, so out-of-order arrivals keep the
    /// newest timestamp.
    pub fn apply(&mut self, click: &Click) {
        self.total_clicks += 1;
        *self.daily_clicks.entry(click.day).or_insert(0) += 1;
        *self.country_clicks.entry(click.country.clone()).or_insert(0) += 1;

        if self.last_click_at.is_none_or(|last| click.clicked_at >= last) {
            self.last_click_at = Some(click.clicked_at);
            if !click.destination_url.is_empty() {
                self.target_url = click.destination_url.clone();
            }
        }
    }

    /// Adds another summary's counters into this one.
    pub fn merge(&mut self, other: &ClickSummary) {
        self.total_clicks += other.total_clicks;
        for (day, count) in &other.daily_clicks {
            *self.daily_clicks.entry(*day).or_insert(0) += count;
        }
        for (country, count) in &other.country_clicks {
            *self.country_clicks.entry(country.clone()).or_insert(0) += count;
        }

        match (self.last_click_at, other.last_click_at) {
            (None, Some(_)) => {
                self.last_click_at = other.last_click_at;
                self.target_url = other.target_url.clone();
            }
            (Some(mine), Some(theirs)) if theirs > mine => {
                self.last_click_at = Some(theirs);
                self.target_url = other.target_url.clone();
            }
            _ => {}
        }

        if self.target_url.is_empty() {
            self.target_url = other.target_url.clone();
        }
    }

    /// Number of distinct days with at least one click.
    pub fn active_days(&self) -> usize {
        self.daily_clicks.values().filter(|c| **c > 0).count()
    }

    /// Average clicks per active day.
    ///
    /// With a single active day this is the total itself; with no clicks it is 0.
    pub fn avg_clicks_per_day(&self) -> f64 {
        match self.active_days() {
            0 => 0.0,
            1 => self.total_clicks as f64,
            days => self.total_clicks as f64 / days as f64,
        }
    }

    /// Clicks on a single UTC day.
    pub fn clicks_on(&self, day: NaiveDate) -> i64 {
        self.daily_clicks.get(&day).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewClick;
    use chrono::{Duration, TimeZone};

    fn click_at(id: i64, at: DateTime<Utc>, country: &str) -> Click {
        let mut new_click = NewClick::new("abc", "https://example.com");
        new_click.clicked_at = at;
        new_click.country = country.to_string();
        Click::from_new(id, new_click)
    }

    #[test]
    fn test_from_clicks_empty_is_none() {
        let clicks: Vec<Click> = vec![];
        assert!(ClickSummary::from_clicks(&clicks).is_none());
    }

    #[test]
    fn test_from_clicks_groups_by_day_and_country() {
        let day1 = Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap();
        let day2 = day1 + Duration::days(1);
        let clicks = vec![
            click_at(1, day1, "US"),
            click_at(2, day1, "DE"),
            click_at(3, day2, "US"),
        ];

        let summary = ClickSummary::from_clicks(&clicks).unwrap();

        assert_eq!(summary.total_clicks, 3);
        assert_eq!(summary.clicks_on(day1.date_naive()), 2);
        assert_eq!(summary.clicks_on(day2.date_naive()), 1);
        assert_eq!(summary.country_clicks["US"], 2);
        assert_eq!(summary.country_clicks["DE"], 1);
        assert_eq!(summary.daily_clicks.values().sum::<i64>(), 3);
        assert_eq!(summary.country_clicks.values().sum::<i64>(), 3);
        assert_eq!(summary.last_click_at, Some(day2));
    }

    #[test]
    fn test_last_click_never_moves_backward() {
        let newer = Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 0).unwrap();
        let older = newer - Duration::hours(5);

        let mut summary = ClickSummary::empty("abc", "https://example.com");
        summary.apply(&click_at(1, newer, "US"));
        summary.apply(&click_at(2, older, "US"));

        assert_eq!(summary.last_click_at, Some(newer));
        assert_eq!(summary.total_clicks, 2);
    }

    #[test]
    fn test_merge_adds_counters() {
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let mut a = ClickSummary::from_clicks(&[click_at(1, at, "US")]).unwrap();
        let b = ClickSummary::from_clicks(&[
            click_at(2, at + Duration::days(2), "FR"),
            click_at(3, at, "US"),
        ])
        .unwrap();

        a.merge(&b);

        assert_eq!(a.total_clicks, 3);
        assert_eq!(a.country_clicks["US"], 2);
        assert_eq!(a.country_clicks["FR"], 1);
        assert_eq!(a.last_click_at, Some(at + Duration::days(2)));
        assert_eq!(a.active_days(), 2);
    }

    #[test]
    fn test_avg_clicks_per_day() {
        let at = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();

        assert_eq!(ClickSummary::empty("x", "").avg_clicks_per_day(), 0.0);

        let single_day =
            ClickSummary::from_clicks(&[click_at(1, at, "US"), click_at(2, at, "US")]).unwrap();
        assert_eq!(single_day.avg_clicks_per_day(), 2.0);

        let three_over_two = ClickSummary::from_clicks(&[
            click_at(1, at, "US"),
            click_at(2, at, "US"),
            click_at(3, at + Duration::days(3), "US"),
        ])
        .unwrap();
        assert_eq!(three_over_two.avg_clicks_per_day(), 1.5);
    }
}
