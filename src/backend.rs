use crate::content::ContentIndex;
use crate::page::ApiError;
use axum::{
    extract::{Path as RoutePath, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    ops::RangeInclusive,
    path::PathBuf,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
use tokio::sync::RwLock;
use tower_http::services::{ServeDir, ServeFile};
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_STATIC_DIR: &str = "dist";
const DEFAULT_CONTENT_CACHE_MAX_AGE_SECONDS: u64 = 300;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const CONTENT_CACHE_MAX_AGE_SECONDS_RANGE: RangeInclusive<u64> = 0..=86_400;
const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(format!("unknown log level `{other}`")),
        }
    }
}

#[derive(Clone, Debug)]
struct SiteConfig {
    port: u16,
    content_dir: PathBuf,
    static_dir: PathBuf,
    content_cache_max_age_seconds: u64,
    site_base_url: Option<Url>,
    content_reload_token: Option<String>,
    log_level: LogLevel,
}

impl SiteConfig {
    /// Unset, blank and unparsable variables fall back to their defaults.
    fn from_env() -> Self {
        Self {
            port: setting("PORT").unwrap_or(DEFAULT_PORT),
            content_dir: setting("CONTENT_DIR").unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR)),
            static_dir: setting("STATIC_DIR").unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            content_cache_max_age_seconds: within(
                setting("CONTENT_CACHE_MAX_AGE_SECONDS"),
                CONTENT_CACHE_MAX_AGE_SECONDS_RANGE,
                DEFAULT_CONTENT_CACHE_MAX_AGE_SECONDS,
            ),
            site_base_url: setting::<Url>("SITE_BASE_URL").filter(is_http_url),
            content_reload_token: setting("CONTENT_RELOAD_TOKEN"),
            log_level: setting("LOG_LEVEL").unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }

    fn content_cache_control(&self) -> HeaderValue {
        if self.content_cache_max_age_seconds == 0 {
            return cache_control("no-cache");
        }
        cache_control(&format!(
            "public, max-age={}",
            self.content_cache_max_age_seconds
        ))
    }

    /// Requires a configured token and an identical, non-empty bearer token.
    fn accepts_reload_token(&self, headers: &HeaderMap) -> bool {
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match (self.content_reload_token.as_deref(), provided) {
            (Some(expected), Some(provided)) => !provided.is_empty() && provided == expected,
            _ => false,
        }
    }

    fn logs(&self, level: LogLevel) -> bool {
        level >= self.log_level
    }

    fn log(&self, line: LogLine) {
        if self.logs(line.level) {
            println!("{}", line.to_json(unix_time().as_secs()));
        }
    }
}

fn setting<T: FromStr>(name: &str) -> Option<T> {
    parse_setting(std::env::var(name).ok().as_deref())
}

fn parse_setting<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
}

fn within<T: PartialOrd>(value: Option<T>, range: RangeInclusive<T>, default: T) -> T {
    value.filter(|value| range.contains(value)).unwrap_or(default)
}

fn is_http_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn unix_time() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Correlates a request with its log lines and its response.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RequestId(String);

impl RequestId {
    /// Reuses a non-empty `x-request-id` sent by the caller, otherwise mints
    /// `req-<unix ms>-<counter>`.
    fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|raw| raw.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.to_string()))
            .unwrap_or_else(Self::generate)
    }

    fn generate() -> Self {
        let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("req-{}-{counter}", unix_time().as_millis()))
    }

    fn as_str(&self) -> &str {
        &self.0
    }

    fn respond(
        &self,
        status: StatusCode,
        mut headers: HeaderMap,
        payload: impl IntoResponse,
    ) -> axum::response::Response {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
        (status, headers, payload).into_response()
    }
}

/// One structured log event, printed as a single JSON object per line.
struct LogLine {
    level: LogLevel,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl LogLine {
    fn new(level: LogLevel, event: &str) -> Self {
        Self {
            level,
            fields: serde_json::Map::new(),
        }
        .field("event", event)
    }

    fn info(event: &str) -> Self {
        Self::new(LogLevel::Info, event)
    }

    fn field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    fn request(self, request_id: &RequestId) -> Self {
        self.field("request_id", request_id.as_str())
    }

    fn elapsed(self, started_at: Instant) -> Self {
        self.field("duration_ms", serde_json::json!(started_at.elapsed().as_millis()))
    }

    fn to_json(&self, ts: u64) -> serde_json::Value {
        let mut payload = self.fields.clone();
        payload.insert("ts".to_string(), ts.into());
        payload.insert("level".to_string(), self.level.as_str().into());
        serde_json::Value::Object(payload)
    }
}

#[derive(Clone)]
pub struct AppState {
    content: Arc<RwLock<ContentIndex>>,
    config: SiteConfig,
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = SiteConfig::from_env();
    let content = ContentIndex::load(&config.content_dir)?;

    config.log(
        LogLine::info("content_loaded")
            .field("content_dir", config.content_dir.display().to_string())
            .field("pages", content.len())
            .field("sections", content.sections().collect::<Vec<_>>()),
    );

    let bind_address = format!("0.0.0.0:{}", config.port);
    let state = AppState {
        content: Arc::new(RwLock::new(content)),
        config,
    };

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    state
        .config
        .log(LogLine::info("server_listening").field("address", bind_address.as_str()));
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let static_service = ServeDir::new(&static_dir)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/menu/{section}", get(get_menu))
        .route("/api/page/{*path}", get(get_page))
        .route("/internal/reload-content", post(reload_content_endpoint))
        .fallback_service(static_service)
        .with_state(state)
}

async fn get_menu(
    State(state): State<AppState>,
    RoutePath(section): RoutePath<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> axum::response::Response {
    let request_started_at = Instant::now();
    let request_id = RequestId::from_headers(&headers);
    let content = state.content.read().await;

    let Some(menu) = content.menu(&section) else {
        log_request_complete(&state.config, &request_id, &method, &uri, StatusCode::NOT_FOUND, request_started_at);
        return json_response(
            StatusCode::NOT_FOUND,
            ApiError::new(format!("unknown section `{section}`")),
            cache_control("no-store"),
            &request_id,
        );
    };

    log_request_complete(&state.config, &request_id, &method, &uri, StatusCode::OK, request_started_at);
    json_response(
        StatusCode::OK,
        menu.clone(),
        state.config.content_cache_control(),
        &request_id,
    )
}

async fn get_page(
    State(state): State<AppState>,
    RoutePath(path): RoutePath<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> axum::response::Response {
    let request_started_at = Instant::now();
    let request_id = RequestId::from_headers(&headers);
    let content = state.content.read().await;

    let Some(payload) = content.page_payload(&path, state.config.site_base_url.as_ref()) else {
        log_request_complete(&state.config, &request_id, &method, &uri, StatusCode::NOT_FOUND, request_started_at);
        return json_response(
            StatusCode::NOT_FOUND,
            ApiError::new("page not found"),
            cache_control("no-store"),
            &request_id,
        );
    };

    log_request_complete(&state.config, &request_id, &method, &uri, StatusCode::OK, request_started_at);
    json_response(
        StatusCode::OK,
        payload,
        state.config.content_cache_control(),
        &request_id,
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReloadSummary {
    ok: bool,
    pages: usize,
    sections: Vec<String>,
}

async fn reload_content_endpoint(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> axum::response::Response {
    let request_started_at = Instant::now();
    let request_id = RequestId::from_headers(&headers);

    state.config.log(
        LogLine::info("reload_request_start")
            .request(&request_id)
            .field("method", method.as_str())
            .field("path", uri.path()),
    );

    if state.config.content_reload_token.is_none() {
        log_reload_failed(&state.config, &request_id, "config_missing", "reload token is not configured", request_started_at);
        return json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiError::new("reload token is not configured"),
            cache_control("no-store"),
            &request_id,
        );
    }

    if !state.config.accepts_reload_token(&headers) {
        log_reload_failed(&state.config, &request_id, "auth_failed", "unauthorized", request_started_at);
        return json_response(
            StatusCode::UNAUTHORIZED,
            ApiError::new("unauthorized"),
            cache_control("no-store"),
            &request_id,
        );
    }

    let loaded = match ContentIndex::load(&state.config.content_dir) {
        Ok(loaded) => loaded,
        Err(error) => {
            let message = error.to_string();
            log_reload_failed(&state.config, &request_id, "content_invalid", &message, request_started_at);
            return json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new(message),
                cache_control("no-store"),
                &request_id,
            );
        }
    };

    let summary = ReloadSummary {
        ok: true,
        pages: loaded.len(),
        sections: loaded.sections().map(ToString::to_string).collect(),
    };
    *state.content.write().await = loaded;

    state.config.log(
        LogLine::info("reload_request_complete")
            .request(&request_id)
            .field("status", StatusCode::OK.as_u16())
            .field("pages", summary.pages)
            .field("sections", summary.sections.clone())
            .elapsed(request_started_at),
    );

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::CACHE_CONTROL, cache_control("no-store"));
    response_headers.insert(header::VARY, HeaderValue::from_static("Authorization"));
    request_id.respond(StatusCode::OK, response_headers, Json(summary))
}

/// Successful content reads are debug noise; misses are worth an info line.
fn log_request_complete(
    config: &SiteConfig,
    request_id: &RequestId,
    method: &Method,
    uri: &Uri,
    status: StatusCode,
    started_at: Instant,
) {
    let level = if status.is_success() {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    config.log(
        LogLine::new(level, "content_request_complete")
            .request(request_id)
            .field("method", method.as_str())
            .field("path", uri.path())
            .field("status", status.as_u16())
            .elapsed(started_at),
    );
}

fn log_reload_failed(
    config: &SiteConfig,
    request_id: &RequestId,
    error_class: &str,
    message: &str,
    started_at: Instant,
) {
    config.log(
        LogLine::info("reload_request_failed")
            .request(request_id)
            .field("error_class", error_class)
            .field("message", message)
            .elapsed(started_at),
    );
}

fn json_response(
    status: StatusCode,
    payload: impl Serialize,
    cache_control: HeaderValue,
    request_id: &RequestId,
) -> axum::response::Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, cache_control);
    headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
    request_id.respond(status, headers, Json(payload))
}

fn cache_control(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}
