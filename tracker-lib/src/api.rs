use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::types::{AnalysisResult, HistoryRecord, Scale, TrendSet, Upload};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Multipart field name the service reads the recording from.
const UPLOAD_FIELD: &str = "filepath";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root URL of the analysis service, e.g. `http://localhost:8000`.
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE.to_string() }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    /// Use `url` if it is set and non-blank, otherwise the default.
    pub fn from_optional(url: Option<&str>) -> Self {
        match url.map(str::trim) {
            Some(u) if !u.is_empty() => Self::new(u),
            _ => Self::default(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Operations of the analysis/history service the front ends depend on.
///
/// Implemented over HTTP by [`AnalysisClient`]; tests substitute an
/// in-memory fake.
#[allow(async_fn_in_trait)]
pub trait AnalysisService {
    /// Submit a recording of `scale` for grading. The service also stores
    /// the session. Takes the upload by value so its bytes can become the
    /// request body as is.
    async fn analyze(&self, upload: Upload, scale: Scale) -> Result<AnalysisResult, ApiError>;

    /// All stored sessions in insertion order.
    async fn list_history(&self) -> Result<Vec<HistoryRecord>, ApiError>;

    /// Regression of every metric across all sessions.
    async fn get_trends(&self) -> Result<TrendSet, ApiError>;

    /// Delete every stored session. Succeeds on an empty history.
    async fn clear_history(&self) -> Result<(), ApiError>;
}

/// HTTP client for the analysis service.
#[derive(Clone, Debug)]
pub struct AnalysisClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AnalysisClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fetch one stored session by id.
    pub async fn get_session(&self, id: u64) -> Result<HistoryRecord, ApiError> {
        let url = self.config.endpoint(&format!("id/{id}"));
        let resp = self.http.get(&url).send().await?;
        let record: Option<HistoryRecord> = read_json(resp).await?;
        record.ok_or_else(|| ApiError::NotFound(format!("session {id}")))
    }

    /// Stored sessions for a single scale, insertion order.
    pub async fn list_history_for_scale(&self, scale: Scale) -> Result<Vec<HistoryRecord>, ApiError> {
        let url = self.config.endpoint(&format!("scales/{}", encode_segment(scale.name())));
        let resp = self.http.get(&url).send().await?;
        read_json(resp).await
    }

    /// Trends computed over sessions of a single scale.
    pub async fn get_trends_for_scale(&self, scale: Scale) -> Result<TrendSet, ApiError> {
        let url = self.config.endpoint(&format!("trends/{}", encode_segment(scale.name())));
        let resp = self.http.get(&url).send().await?;
        read_json(resp).await
    }
}

impl AnalysisService for AnalysisClient {
    async fn analyze(&self, upload: Upload, scale: Scale) -> Result<AnalysisResult, ApiError> {
        log::info!("Uploading {} ({} bytes) as {scale}", upload.name, upload.bytes.len());
        let part = reqwest::multipart::Part::bytes(upload.bytes).file_name(upload.name);
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let resp = self
            .http
            .post(self.config.endpoint("analyze"))
            .query(&[("scale", scale.name())])
            .multipart(form)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn list_history(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        let resp = self.http.get(self.config.endpoint("scales")).send().await?;
        read_json(resp).await
    }

    async fn get_trends(&self) -> Result<TrendSet, ApiError> {
        let resp = self.http.get(self.config.endpoint("trends/all")).send().await?;
        read_json(resp).await
    }

    async fn clear_history(&self) -> Result<(), ApiError> {
        let resp = self.http.delete(self.config.endpoint("delete")).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::rejected(status.as_u16(), &body))
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    parse_body(status, &body)
}

/// Turn a status and body into either the decoded value or an [`ApiError`].
pub fn parse_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::rejected(status, body));
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Percent-encode a path segment. Scale names only need a handful of escapes.
fn encode_segment(s: &str) -> String {
    s.replace('%', "%25")
        .replace(' ', "%20")
        .replace('#', "%23")
        .replace('/', "%2F")
        .replace('?', "%3F")
        .replace('&', "%26")
}
