#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use linkpulse::application::services::{AuthService, ClickService, LinkService, StatsService};
use linkpulse::domain::crawler::SignatureCrawlerDetector;
use linkpulse::domain::entities::{Click, ClickSummary, LinkPreview, NewClick};
use linkpulse::domain::repositories::ClickRepository;
use linkpulse::error::AppError;
use linkpulse::infrastructure::persistence::{MemoryClickRepository, MemoryLinkRepository};
use linkpulse::infrastructure::preview::{PreviewError, PreviewFetcher, PreviewResult};
use linkpulse::routes::router;
use linkpulse::state::AppState;
use linkpulse::utils::client_info::ClientInfoConfig;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower::Layer;

pub const BASE_URL: &str = "https://lp.test";
pub const HUMAN_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0";
pub const CRAWLER_UA: &str = "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";

/// Inserts a fixed peer address so `ConnectInfo` extractors work without a socket.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// A click backend that is always down.
pub struct FailingClickRepository;

fn down() -> AppError {
    AppError::storage("click store down", json!({}))
}

#[async_trait]
impl ClickRepository for FailingClickRepository {
    async fn record(&self, _new_click: NewClick) -> Result<Click, AppError> {
        Err(down())
    }

    async fn get_summary(&self, _short_code: &str) -> Result<Option<ClickSummary>, AppError> {
        Err(down())
    }

    async fn list_summaries(&self) -> Result<Vec<ClickSummary>, AppError> {
        Err(down())
    }

    async fn list_events(&self, _short_code: &str, _limit: i64) -> Result<Vec<Click>, AppError> {
        Err(down())
    }

    async fn events_between(
        &self,
        _from: Option<DateTime<Utc>>,
        _to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Click>, AppError> {
        Err(down())
    }

    async fn delete_all_for_link(&self, _short_code: &str) -> Result<u64, AppError> {
        Err(down())
    }

    async fn count_events(&self) -> Result<i64, AppError> {
        Err(down())
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Preview fetcher whose answer can be swapped during a test.
///
/// `None` behaves like an unreachable destination.
#[derive(Default)]
pub struct StubPreviewFetcher {
    preview: Mutex<Option<LinkPreview>>,
}

impl StubPreviewFetcher {
    pub fn returning(preview: LinkPreview) -> Self {
        Self {
            preview: Mutex::new(Some(preview)),
        }
    }

    pub fn set(&self, preview: Option<LinkPreview>) {
        *self.preview.lock().unwrap() = preview;
    }
}

#[async_trait]
impl PreviewFetcher for StubPreviewFetcher {
    async fn fetch(&self, _url: &str) -> PreviewResult<LinkPreview> {
        self.preview
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| PreviewError::Request("unreachable".to_string()))
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub links: Arc<MemoryLinkRepository>,
    pub fallback: Arc<MemoryClickRepository>,
    pub preview: Arc<StubPreviewFetcher>,
}

pub struct TestAppBuilder {
    primary: Arc<dyn ClickRepository>,
    auth: AuthService,
    preview: Arc<StubPreviewFetcher>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            primary: Arc::new(MemoryClickRepository::new()),
            auth: AuthService::disabled(),
            preview: Arc::new(StubPreviewFetcher::default()),
        }
    }

    pub fn primary(mut self, primary: Arc<dyn ClickRepository>) -> Self {
        self.primary = primary;
        self
    }

    pub fn auth(mut self, auth: AuthService) -> Self {
        self.auth = auth;
        self
    }

    pub fn preview(mut self, preview: LinkPreview) -> Self {
        self.preview = Arc::new(StubPreviewFetcher::returning(preview));
        self
    }

    pub fn build(self) -> TestApp {
        let links = Arc::new(MemoryLinkRepository::new());
        let fallback = Arc::new(MemoryClickRepository::new());

        let click_service = Arc::new(ClickService::new(self.primary, fallback.clone()));
        let link_service = Arc::new(LinkService::new(
            links.clone(),
            click_service.clone(),
            self.preview.clone(),
        ));
        let stats_service = Arc::new(StatsService::new(links.clone(), click_service.clone()));

        let state = AppState {
            link_service,
            click_service,
            stats_service,
            auth_service: Arc::new(self.auth),
            crawler_detector: Arc::new(SignatureCrawlerDetector::default()),
            client_info: Arc::new(ClientInfoConfig::default()),
            public_base_url: Arc::from(BASE_URL),
        };

        let app = router(state.clone(), false).layer(MockConnectInfoLayer);
        let server = TestServer::new(app).unwrap();

        TestApp {
            server,
            state,
            links,
            fallback,
            preview: self.preview,
        }
    }
}

pub fn test_app() -> TestApp {
    TestAppBuilder::new().build()
}

impl TestApp {
    /// Creates a link through the API and returns its JSON body.
    pub async fn create_link(&self, destination: &str) -> serde_json::Value {
        let response = self
            .server
            .post("/api/links")
            .json(&json!({ "destination": destination }))
            .await;
        assert_eq!(response.status_code(), axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()
    }

    /// Performs one human visit of `/r/{code}`.
    pub async fn visit(&self, code: &str) -> axum_test::TestResponse {
        self.server
            .get(&format!("/r/{code}"))
            .add_header("User-Agent", HUMAN_UA)
            .await
    }
}
