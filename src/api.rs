//! Hotel listing REST API client
//!
//! Handles all HTTP communication with the listing server.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::RuntimeContext;
use crate::hotel::Hotel;

/// Hotel listing REST API client
pub struct HotelClient {
    client: Client,
    base_url: String,
}

impl HotelClient {
    /// Create a new listing client from runtime context
    pub fn new(ctx: &RuntimeContext) -> Result<Self> {
        Self::with_base_url(ctx.server_url()?, ctx.timeout(), ctx.insecure())
    }

    pub fn with_base_url(base_url: &str, timeout: u64, insecure: bool) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent(format!("staysift/{}", env!("CARGO_PKG_VERSION")));

        if insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().context("building HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request to the API
    async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}/api{}", self.base_url, path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("request to {url}"))?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.status_to_error(status, &url, &error_text));
        }

        response
            .json()
            .await
            .with_context(|| format!("parsing response from {url}"))
    }

    fn status_to_error(&self, status: StatusCode, url: &str, body: &str) -> anyhow::Error {
        let hint = match status {
            StatusCode::UNAUTHORIZED => "This endpoint requires a logged-in session on the server",
            StatusCode::FORBIDDEN => "The server refused access to the listing",
            StatusCode::NOT_FOUND => {
                "The server has no hotels yet (the listing must be scraped first) or the URL is wrong"
            }
            StatusCode::SERVICE_UNAVAILABLE => "The listing server may be starting up or restarting",
            StatusCode::BAD_REQUEST => "Invalid request parameters",
            _ => "",
        };

        let detail = error_message(body).unwrap_or_else(|| body.trim().to_string());
        let msg = if detail.is_empty() {
            format!("HTTP {status} from {url}")
        } else {
            format!("HTTP {status} from {url}: {detail}")
        };

        if hint.is_empty() {
            anyhow!(msg)
        } else {
            anyhow!("{msg}\nHint: {hint}")
        }
    }

    // --- API Methods ---

    /// Get the full hotel listing
    pub async fn get_hotels(&self) -> Result<Vec<Hotel>> {
        let payload = self.get("/hotels").await?;
        parse_listing(payload).context("reading hotel listing")
    }

    /// Get the server's recommendations for the current session
    pub async fn get_recommendations(&self) -> Result<Vec<Hotel>> {
        let payload = self.get("/recomendaciones").await?;
        parse_listing(payload).context("reading recommendations")
    }
}

/// Decode a listing payload, which must be a JSON array of hotel records
pub fn parse_listing(payload: Value) -> Result<Vec<Hotel>> {
    if let Some(message) = payload.get("error").and_then(Value::as_str) {
        bail!("server reported an error: {message}");
    }
    if !payload.is_array() {
        bail!("expected a JSON array of hotels, got {}", json_kind(&payload));
    }

    serde_json::from_value(payload).context("decoding hotel records")
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
