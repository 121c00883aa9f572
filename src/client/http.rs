//! HTTP implementation of [`LotteryApi`]
//!
//! Thin `reqwest` wrapper. Every request is tagged with an `x-request-id`
//! header so service logs can be matched with ours.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::error::{ClientError, ClientResult};
use super::LotteryApi;
use crate::types::{
    Entry, EntryId, EntryPage, EntryPatch, LimitId, NewEntry, NewLimit, NumberSummary,
    PriceLimit, Round, RoundId, RoundSummary,
};

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the service (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl HttpClientConfig {
    /// Create config for a base URL with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// NumberX REST API client
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    api_base: String,
}

#[derive(Serialize)]
struct CreateRoundBody {
    draw_date: NaiveDate,
}

#[derive(Serialize)]
struct UpdateRoundBody<'a> {
    status: &'a str,
}

#[derive(Serialize)]
struct UpdateLimitBody {
    limit_amount: f64,
}

impl HttpClient {
    /// Create a new client with the given configuration
    pub fn new(config: HttpClientConfig) -> ClientResult<Self> {
        let base = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_base: format!("{}/api", base),
        })
    }

    /// Root all request paths are appended to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Send a request and fail on any non-success status
    async fn execute(&self, request: RequestBuilder, op: &'static str) -> ClientResult<Response> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, op, "Sending request");

        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                let err = ClientError::from_reqwest(e);
                tracing::warn!(request_id = %request_id, op, error = %err, "Request failed");
                err
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ClientError::from_status(status.as_u16(), &body);
        tracing::warn!(
            request_id = %request_id,
            op,
            status = status.as_u16(),
            error = %err,
            "Request rejected"
        );
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        op: &'static str,
    ) -> ClientResult<T> {
        let response = self.execute(request, op).await?;
        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(format!("{}: {}", op, e)))
    }

    async fn send_empty(&self, request: RequestBuilder, op: &'static str) -> ClientResult<()> {
        self.execute(request, op).await.map(|_| ())
    }
}

#[async_trait]
impl LotteryApi for HttpClient {
    async fn list_rounds(&self) -> ClientResult<Vec<Round>> {
        self.fetch(self.client.get(self.url("/rounds/")), "list_rounds")
            .await
    }

    async fn get_round(&self, id: RoundId) -> ClientResult<Round> {
        self.fetch(self.client.get(self.url(&format!("/rounds/{}", id))), "get_round")
            .await
    }

    async fn create_round(&self, draw_date: NaiveDate) -> ClientResult<Round> {
        let request = self
            .client
            .post(self.url("/rounds/"))
            .json(&CreateRoundBody { draw_date });
        self.fetch(request, "create_round").await
    }

    async fn update_round_status(&self, id: RoundId, status: &str) -> ClientResult<Round> {
        let request = self
            .client
            .put(self.url(&format!("/rounds/{}", id)))
            .json(&UpdateRoundBody { status });
        self.fetch(request, "update_round_status").await
    }

    async fn delete_round(&self, id: RoundId) -> ClientResult<()> {
        let request = self.client.delete(self.url(&format!("/rounds/{}", id)));
        self.send_empty(request, "delete_round").await
    }

    async fn round_summary(&self, id: RoundId) -> ClientResult<RoundSummary> {
        let request = self.client.get(self.url(&format!("/rounds/{}/summary", id)));
        self.fetch(request, "round_summary").await
    }

    async fn list_entries(
        &self,
        round_id: RoundId,
        limit: u64,
        offset: u64,
    ) -> ClientResult<EntryPage> {
        let request = self
            .client
            .get(self.url(&format!("/entries/round/{}", round_id)))
            .query(&[("limit", limit), ("offset", offset)]);
        self.fetch(request, "list_entries").await
    }

    async fn get_entry(&self, id: EntryId) -> ClientResult<Entry> {
        let request = self.client.get(self.url(&format!("/entries/{}", id)));
        self.fetch(request, "get_entry").await
    }

    async fn create_entry(&self, entry: &NewEntry) -> ClientResult<Entry> {
        let request = self.client.post(self.url("/entries/")).json(entry);
        self.fetch(request, "create_entry").await
    }

    async fn update_entry(&self, id: EntryId, patch: &EntryPatch) -> ClientResult<Entry> {
        let request = self
            .client
            .put(self.url(&format!("/entries/{}", id)))
            .json(patch);
        self.fetch(request, "update_entry").await
    }

    async fn delete_entry(&self, id: EntryId) -> ClientResult<()> {
        let request = self.client.delete(self.url(&format!("/entries/{}", id)));
        self.send_empty(request, "delete_entry").await
    }

    async fn number_summary(&self, round_id: RoundId) -> ClientResult<Vec<NumberSummary>> {
        let request = self
            .client
            .get(self.url(&format!("/entries/round/{}/summary", round_id)));
        self.fetch(request, "number_summary").await
    }

    async fn list_limits(&self, round_id: RoundId) -> ClientResult<Vec<PriceLimit>> {
        let request = self
            .client
            .get(self.url(&format!("/limits/round/{}", round_id)));
        self.fetch(request, "list_limits").await
    }

    async fn create_limit(&self, limit: &NewLimit) -> ClientResult<PriceLimit> {
        let request = self.client.post(self.url("/limits/")).json(limit);
        self.fetch(request, "create_limit").await
    }

    async fn update_limit(&self, id: LimitId, limit_amount: f64) -> ClientResult<PriceLimit> {
        let request = self
            .client
            .put(self.url(&format!("/limits/{}", id)))
            .json(&UpdateLimitBody { limit_amount });
        self.fetch(request, "update_limit").await
    }

    async fn delete_limit(&self, id: LimitId) -> ClientResult<()> {
        let request = self.client.delete(self.url(&format!("/limits/{}", id)));
        self.send_empty(request, "delete_limit").await
    }
}
