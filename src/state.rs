//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::api::dto::link::tracking_url;
use crate::application::services::{AuthService, ClickService, LinkService, StatsService};
use crate::domain::crawler::CrawlerDetector;
use crate::utils::client_info::ClientInfoConfig;

/// Cheaply cloneable handle to every service a request may need.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub click_service: Arc<ClickService>,
    pub stats_service: Arc<StatsService>,
    pub auth_service: Arc<AuthService>,
    pub crawler_detector: Arc<dyn CrawlerDetector>,
    pub client_info: Arc<ClientInfoConfig>,
    /// Base for tracking URLs, without trailing slash.
    pub public_base_url: Arc<str>,
}

impl AppState {
    pub fn tracking_url(&self, short_code: &str) -> String {
        tracking_url(&self.public_base_url, short_code)
    }
}
