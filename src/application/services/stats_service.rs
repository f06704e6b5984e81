//! Click aggregation across the link store and both click backends.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::application::services::ClickService;
use crate::domain::entities::{Click, ClickSummary, Link};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;

/// Number of trailing days in [`LinkAnalytics::daily_clicks`].
pub const ANALYTICS_DAYS: usize = 9;

/// Maximum recent events attached to one stats row.
pub const MAX_RECENT_CLICKS: usize = 50;

/// Filter for [`StatsService::get_stats`].
///
/// Both dates are whole UTC days and inclusive.
#[derive(Debug, Clone, Default)]
pub struct StatsFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub recent: usize,
}

impl StatsFilter {
    pub fn is_date_filtered(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    /// Half-open timestamp range `[from, to)` covering the filter's days.
    fn time_range(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let start_of = |d: NaiveDate| d.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
        (
            self.date_from.and_then(start_of),
            self.date_to
                .and_then(|d| d.checked_add_days(Days::new(1)))
                .and_then(start_of),
        )
    }
}

/// Which click backend contributed to a stats row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsSource {
    Primary,
    Fallback,
    Merged,
    None,
}

/// Aggregated statistics for one short code.
#[derive(Debug, Clone)]
pub struct LinkStatsRow {
    pub short_code: String,
    pub target_url: String,
    pub name: String,
    pub summary: ClickSummary,
    pub source: StatsSource,
    pub recent_clicks: Option<Vec<Click>>,
}

/// Report-level metadata.
#[derive(Debug, Clone)]
pub struct StatsMeta {
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

#[derive(Debug, Clone)]
pub struct StatsReport {
    pub stats: Vec<LinkStatsRow>,
    pub meta: StatsMeta,
}

/// Per-link counters shown in the links listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkAnalytics {
    pub clicks: i64,
    /// Trailing daily counts, oldest first, ending today (UTC).
    pub daily_clicks: [i64; ANALYTICS_DAYS],
}

type SummaryMap = HashMap<String, ClickSummary>;

/// Service deriving per-link statistics.
///
/// Each click backend is read independently (pre-aggregated summaries when
/// unfiltered, grouped raw events when a date filter is present) and the
/// results are merged per short code.
pub struct StatsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<ClickService>,
}

impl StatsService {
    pub fn new(links: Arc<dyn LinkRepository>, clicks: Arc<ClickService>) -> Self {
        Self { links, clicks }
    }

    /// Builds the stats report.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `date_from` is after `date_to`.
    ///
    /// Returns [`AppError::Storage`] if the primary click backend fails and
    /// the fallback holds no data.
    pub async fn get_stats(&self, filter: StatsFilter) -> Result<StatsReport, AppError> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to)
            && from > to
        {
            return Err(AppError::bad_request(
                "dateFrom must not be after dateTo",
                json!({ "dateFrom": from, "dateTo": to }),
            ));
        }

        let (links, link_store_available) = match self.links.list_all().await {
            Ok(links) => (links, true),
            Err(e) => {
                warn!(error = %e, "Link store unavailable for stats");
                (Vec::new(), false)
            }
        };
        let known: Vec<&str> = links.iter().map(|l| l.short_code.as_str()).collect();

        let (primary, fallback) = tokio::join!(
            collect_backend(self.clicks.primary().as_ref(), &filter, &known),
            collect_backend(self.clicks.fallback().as_ref(), &filter, &known),
        );

        let fallback = fallback.unwrap_or_else(|e| {
            warn!(error = %e, "Fallback click store unavailable for stats");
            SummaryMap::new()
        });

        let (primary, primary_available) = match primary {
            Ok(map) => (map, true),
            Err(e) if fallback.is_empty() => {
                return Err(AppError::storage(
                    "Click store unavailable",
                    json!({ "reason": e.to_string(), "fallbackClicks": 0 }),
                ));
            }
            Err(e) => {
                warn!(error = %e, "Primary click store unavailable, reporting fallback data only");
                (SummaryMap::new(), false)
            }
        };

        let links_by_code: HashMap<&str, &Link> =
            links.iter().map(|l| (l.short_code.as_str(), l)).collect();

        // Clicks for codes without a link (deleted, or recorded by a redirect
        // racing the delete) are only reported when the link store is down.
        let codes: BTreeSet<&str> = if link_store_available {
            links_by_code.keys().copied().collect()
        } else {
            primary
                .keys()
                .chain(fallback.keys())
                .map(String::as_str)
                .collect()
        };

        let fallback_clicks: i64 = codes
            .iter()
            .filter_map(|code| fallback.get(*code))
            .map(|s| s.total_clicks)
            .sum();

        let mut stats = Vec::with_capacity(codes.len());
        for code in codes {
            let link = links_by_code.get(code).copied();
            let from_primary = primary.get(code).filter(|s| s.total_clicks > 0);
            let from_fallback = fallback.get(code).filter(|s| s.total_clicks > 0);

            let source = match (from_primary, from_fallback) {
                (Some(_), Some(_)) => StatsSource::Merged,
                (Some(_), None) => StatsSource::Primary,
                (None, Some(_)) => StatsSource::Fallback,
                (None, None) => StatsSource::None,
            };

            let target_url = link
                .map(|l| l.destination.clone())
                .or_else(|| from_primary.or(from_fallback).map(|s| s.target_url.clone()))
                .unwrap_or_default();

            let mut summary = ClickSummary::empty(code, &target_url);
            for part in [from_primary, from_fallback].into_iter().flatten() {
                summary.merge(part);
            }
            summary.target_url = target_url.clone();

            stats.push(LinkStatsRow {
                short_code: code.to_string(),
                target_url,
                name: link.map(|l| l.name.clone()).unwrap_or_default(),
                summary,
                source,
                recent_clicks: None,
            });
        }

        stats.sort_by(|a, b| {
            b.summary
                .total_clicks
                .cmp(&a.summary.total_clicks)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });

        let recent = filter.recent.min(MAX_RECENT_CLICKS);
        if recent > 0 {
            for row in stats.iter_mut() {
                let events = self
                    .clicks
                    .list_events(&row.short_code, recent as i64)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(short_code = %row.short_code, error = %e, "Recent clicks unavailable");
                        Vec::new()
                    });
                row.recent_clicks = Some(events);
            }
        }

        let meta = StatsMeta {
            total_links: links.len(),
            total_clicks: stats.iter().map(|r| r.summary.total_clicks).sum(),
            primary_available,
            link_store_available,
            fallback_clicks,
            degraded: !primary_available || !link_store_available,
            date_from: filter.date_from,
            date_to: filter.date_to,
            generated_at: Utc::now(),
        };

        Ok(StatsReport { stats, meta })
    }

    /// Computes click counters for each link in a listing.
    ///
    /// Never fails: a click store outage degrades the counters to zeros.
    pub async fn link_analytics(&self, links: &[Link]) -> HashMap<String, LinkAnalytics> {
        let known: Vec<&str> = links.iter().map(|l| l.short_code.as_str()).collect();
        let filter = StatsFilter::default();

        let (primary, fallback) = tokio::join!(
            collect_backend(self.clicks.primary().as_ref(), &filter, &known),
            collect_backend(self.clicks.fallback().as_ref(), &filter, &known),
        );

        let mut merged = SummaryMap::new();
        for (label, result) in [("primary", primary), ("fallback", fallback)] {
            match result {
                Ok(summaries) => merge_into(&mut merged, summaries.into_values()),
                Err(e) => warn!(store = label, error = %e, "Click store unavailable for link analytics"),
            }
        }

        let today = Utc::now().date_naive();

        links
            .iter()
            .map(|link| {
                let analytics = merged
                    .get(&link.short_code)
                    .map(|s| analytics_for(s, today))
                    .unwrap_or_default();
                (link.short_code.clone(), analytics)
            })
            .collect()
    }
}

/// Reads one backend as a map of per-code summaries.
///
/// Unfiltered reads use the stored summaries. A `known` code without a
/// summary is rebuilt from its raw events, so clicks whose summary update
/// never landed are still counted.
async fn collect_backend(
    repo: &dyn ClickRepository,
    filter: &StatsFilter,
    known: &[&str],
) -> Result<SummaryMap, AppError> {
    let mut map = SummaryMap::new();

    if !filter.is_date_filtered() {
        merge_into(&mut map, repo.list_summaries().await?);

        let missing: Vec<&str> = known
            .iter()
            .copied()
            .filter(|code| !map.contains_key(*code))
            .collect();

        for code in missing {
            let events = repo.list_events(code, i64::MAX).await?;
            if let Some(summary) = ClickSummary::from_clicks(&events) {
                map.insert(summary.short_code.clone(), summary);
            }
        }
        return Ok(map);
    }

    let (from, to) = filter.time_range();
    for click in &repo.events_between(from, to).await? {
        map.entry(click.short_code.clone())
            .or_insert_with(|| ClickSummary::empty(&click.short_code, &click.destination_url))
            .apply(click);
    }
    Ok(map)
}

fn merge_into(map: &mut SummaryMap, summaries: impl IntoIterator<Item = ClickSummary>) {
    for summary in summaries {
        match map.get_mut(&summary.short_code) {
            Some(existing) => existing.merge(&summary),
            None => {
                map.insert(summary.short_code.clone(), summary);
            }
        }
    }
}

fn analytics_for(summary: &ClickSummary, today: NaiveDate) -> LinkAnalytics {
    let mut daily_clicks = [0i64; ANALYTICS_DAYS];
    for (i, slot) in daily_clicks.iter_mut().enumerate() {
        let days_back = (ANALYTICS_DAYS - 1 - i) as u64;
        if let Some(day) = today.checked_sub_days(Days::new(days_back)) {
            *slot = summary.clicks_on(day);
        }
    }

    LinkAnalytics {
        clicks: summary.total_clicks,
        daily_clicks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{LinkPreview, NewClick, NewLink};
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use crate::infrastructure::persistence::{MemoryClickRepository, MemoryLinkRepository};
    use chrono::{Duration, TimeZone};

    struct Fixture {
        links: Arc<MemoryLinkRepository>,
        primary: Arc<MemoryClickRepository>,
        fallback: Arc<MemoryClickRepository>,
        service: StatsService,
    }

    fn fixture() -> Fixture {
        let links = Arc::new(MemoryLinkRepository::new());
        let primary = Arc::new(MemoryClickRepository::new());
        let fallback = Arc::new(MemoryClickRepository::new());
        let clicks = Arc::new(ClickService::new(primary.clone(), fallback.clone()));
        let service = StatsService::new(links.clone(), clicks);
        Fixture {
            links,
            primary,
            fallback,
            service,
        }
    }

    fn failing_primary() -> MockClickRepository {
        let mut mock = MockClickRepository::new();
        mock.expect_list_summaries()
            .returning(|| Err(AppError::storage("down", json!({}))));
        mock.expect_events_between()
            .returning(|_, _| Err(AppError::storage("down", json!({}))));
        mock
    }

    async fn add_link(repo: &MemoryLinkRepository, code: &str) {
        repo.insert(NewLink {
            short_code: code.to_string(),
            destination: format!("https://example.com/{code}"),
            name: format!("Link {code}"),
            platform: "other".to_string(),
            preview: LinkPreview::default(),
        })
        .await
        .unwrap();
    }

    fn click_at(code: &str, at: DateTime<Utc>) -> NewClick {
        let mut c = NewClick::new(code, format!("https://example.com/{code}"));
        c.clicked_at = at;
        c
    }

    #[tokio::test]
    async fn test_never_clicked_link_gets_zero_row() {
        let f = fixture();
        add_link(&f.links, "quiet").await;

        let report = f.service.get_stats(StatsFilter::default()).await.unwrap();

        assert_eq!(report.stats.len(), 1);
        let row = &report.stats[0];
        assert_eq!(row.short_code, "quiet");
        assert_eq!(row.summary.total_clicks, 0);
        assert_eq!(row.source, StatsSource::None);
        assert_eq!(row.summary.avg_clicks_per_day(), 0.0);
        assert!(!report.meta.degraded);
    }

    #[tokio::test]
    async fn test_rows_sorted_and_sources_marked() {
        let f = fixture();
        add_link(&f.links, "aaa").await;
        add_link(&f.links, "bbb").await;
        add_link(&f.links, "ccc").await;

        f.primary.record(NewClick::new("bbb", "https://example.com/bbb")).await.unwrap();
        f.primary.record(NewClick::new("bbb", "https://example.com/bbb")).await.unwrap();
        f.fallback.record(NewClick::new("bbb", "https://example.com/bbb")).await.unwrap();
        f.fallback.record(NewClick::new("aaa", "https://example.com/aaa")).await.unwrap();
        f.primary.record(NewClick::new("ccc", "https://example.com/ccc")).await.unwrap();

        let report = f.service.get_stats(StatsFilter::default()).await.unwrap();

        let order: Vec<_> = report.stats.iter().map(|r| r.short_code.as_str()).collect();
        assert_eq!(order, ["bbb", "aaa", "ccc"]);
        assert_eq!(report.stats[0].summary.total_clicks, 3);
        assert_eq!(report.stats[0].source, StatsSource::Merged);
        assert_eq!(report.stats[1].source, StatsSource::Fallback);
        assert_eq!(report.stats[2].source, StatsSource::Primary);
        assert_eq!(report.meta.total_clicks, 5);
        assert_eq!(report.meta.fallback_clicks, 2);
        assert_eq!(report.meta.total_links, 3);
    }

    #[tokio::test]
    async fn test_clicks_without_link_are_dropped() {
        let f = fixture();
        add_link(&f.links, "kept").await;
        f.primary.record(NewClick::new("gone", "https://old.example.com")).await.unwrap();
        f.fallback.record(NewClick::new("gone", "https://old.example.com")).await.unwrap();

        let report = f.service.get_stats(StatsFilter::default()).await.unwrap();

        let codes: Vec<_> = report.stats.iter().map(|r| r.short_code.as_str()).collect();
        assert_eq!(codes, ["kept"]);
        assert_eq!(report.meta.total_clicks, 0);
        assert_eq!(report.meta.fallback_clicks, 0);
    }

    #[tokio::test]
    async fn test_link_store_outage_reports_click_data_only() {
        let mut links = MockLinkRepository::new();
        links
            .expect_list_all()
            .returning(|| Err(AppError::storage("down", json!({}))));

        let primary = Arc::new(MemoryClickRepository::new());
        primary.record(NewClick::new("abc", "https://a.com")).await.unwrap();
        let clicks = Arc::new(ClickService::new(
            primary,
            Arc::new(MemoryClickRepository::new()),
        ));
        let service = StatsService::new(Arc::new(links), clicks);

        let report = service.get_stats(StatsFilter::default()).await.unwrap();

        assert!(report.meta.degraded);
        assert!(!report.meta.link_store_available);
        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.stats[0].target_url, "https://a.com");
        assert_eq!(report.stats[0].name, "");
    }

    #[tokio::test]
    async fn test_events_without_summary_are_grouped() {
        let f = fixture();
        add_link(&f.links, "abc").await;

        let day = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let events = vec![
            Click::from_new(1, click_at("abc", day)),
            Click::from_new(2, click_at("abc", day + Duration::days(1))),
        ];

        let mut primary = MockClickRepository::new();
        primary.expect_list_summaries().returning(|| Ok(Vec::new()));
        primary
            .expect_list_events()
            .returning(move |_, _| Ok(events.clone()));

        let clicks = Arc::new(ClickService::new(Arc::new(primary), f.fallback.clone()));
        let service = StatsService::new(f.links.clone(), clicks);

        let report = service.get_stats(StatsFilter::default()).await.unwrap();

        let row = &report.stats[0];
        assert_eq!(row.summary.total_clicks, 2);
        assert_eq!(row.summary.daily_clicks.len(), 2);
        assert_eq!(row.source, StatsSource::Primary);
        assert_eq!(row.summary.last_click_at, Some(day + Duration::days(1)));

        let listing = f.links.list_all().await.unwrap();
        assert_eq!(service.link_analytics(&listing).await["abc"].clicks, 2);
    }

    #[tokio::test]
    async fn test_date_filter_counts_whole_days_inclusive() {
        let f = fixture();
        add_link(&f.links, "abc").await;

        let day1 = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        f.primary.record(click_at("abc", day1 - Duration::seconds(1))).await.unwrap();
        f.primary.record(click_at("abc", day1)).await.unwrap();
        f.primary.record(click_at("abc", day1 + Duration::hours(47))).await.unwrap();
        f.primary.record(click_at("abc", day1 + Duration::days(2))).await.unwrap();

        let filter = StatsFilter {
            date_from: Some(day1.date_naive()),
            date_to: Some((day1 + Duration::days(1)).date_naive()),
            recent: 0,
        };
        let report = f.service.get_stats(filter).await.unwrap();

        let row = &report.stats[0];
        assert_eq!(row.summary.total_clicks, 2);
        assert_eq!(row.summary.daily_clicks.values().sum::<i64>(), 2);
        assert_eq!(report.meta.date_from, Some(day1.date_naive()));
    }

    #[tokio::test]
    async fn test_inverted_date_range_rejected() {
        let f = fixture();
        let filter = StatsFilter {
            date_from: NaiveDate::from_ymd_opt(2026, 5, 2),
            date_to: NaiveDate::from_ymd_opt(2026, 5, 1),
            recent: 0,
        };

        let err = f.service.get_stats(filter).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_recent_clicks_attached() {
        let f = fixture();
        add_link(&f.links, "abc").await;
        for _ in 0..4 {
            f.primary.record(NewClick::new("abc", "https://example.com/abc")).await.unwrap();
        }

        let filter = StatsFilter {
            recent: 2,
            ..Default::default()
        };
        let report = f.service.get_stats(filter).await.unwrap();

        assert_eq!(report.stats[0].recent_clicks.as_ref().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_primary_failure_with_fallback_data_is_degraded() {
        let links = Arc::new(MemoryLinkRepository::new());
        add_link(&links, "abc").await;
        let fallback = Arc::new(MemoryClickRepository::new());
        fallback.record(NewClick::new("abc", "https://a.com")).await.unwrap();

        let clicks = Arc::new(ClickService::new(Arc::new(failing_primary()), fallback));
        let service = StatsService::new(links, clicks);

        let report = service.get_stats(StatsFilter::default()).await.unwrap();

        assert!(report.meta.degraded);
        assert!(!report.meta.primary_available);
        assert_eq!(report.stats[0].source, StatsSource::Fallback);
        assert_eq!(report.stats[0].summary.total_clicks, 1);
    }

    #[tokio::test]
    async fn test_primary_failure_without_fallback_data_is_storage_error() {
        let links = Arc::new(MemoryLinkRepository::new());
        let clicks = Arc::new(ClickService::new(
            Arc::new(failing_primary()),
            Arc::new(MemoryClickRepository::new()),
        ));
        let service = StatsService::new(links, clicks);

        let err = service.get_stats(StatsFilter::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_link_analytics_trailing_days() {
        let f = fixture();
        add_link(&f.links, "abc").await;
        add_link(&f.links, "zero").await;

        let now = Utc::now();
        f.primary.record(click_at("abc", now)).await.unwrap();
        f.fallback.record(click_at("abc", now)).await.unwrap();
        f.primary.record(click_at("abc", now - Duration::days(8))).await.unwrap();
        f.primary.record(click_at("abc", now - Duration::days(20))).await.unwrap();

        let links = f.links.list_all().await.unwrap();
        let analytics = f.service.link_analytics(&links).await;

        let abc = analytics["abc"];
        assert_eq!(abc.clicks, 4);
        assert_eq!(abc.daily_clicks[ANALYTICS_DAYS - 1], 2);
        assert_eq!(abc.daily_clicks[0], 1);
        assert_eq!(abc.daily_clicks.iter().sum::<i64>(), 3);
        assert_eq!(analytics["zero"], LinkAnalytics::default());
    }

    #[tokio::test]
    async fn test_link_analytics_degrades_to_zeros() {
        let links = Arc::new(MemoryLinkRepository::new());
        add_link(&links, "abc").await;

        let mut broken_fallback = MockClickRepository::new();
        broken_fallback
            .expect_list_summaries()
            .returning(|| Err(AppError::storage("down", json!({}))));

        let clicks = Arc::new(ClickService::new(
            Arc::new(failing_primary()),
            Arc::new(broken_fallback),
        ));
        let service = StatsService::new(links.clone(), clicks);

        let listing = links.list_all().await.unwrap();
        let analytics = service.link_analytics(&listing).await;

        assert_eq!(analytics["abc"], LinkAnalytics::default());
    }
}
