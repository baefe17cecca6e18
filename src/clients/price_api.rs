//! Token spot price lookup against a CoinGecko-style `simple/price` endpoint.

use reqwest::{
    header::{HeaderValue, ACCEPT},
    Client,
};
use serde_json::Value;
use tracing::debug;

use crate::errors::pipeline_error::PipelineError;

#[derive(Debug)]
pub struct PriceApiClient {
    base_url: String,
    token_id: String,
    client: Client,
}

impl PriceApiClient {
    pub fn new(base_url: impl Into<String>, token_id: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            token_id: token_id.into(),
            client,
        }
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// Fetches the token's USD price. A body without a numeric USD field
    /// yields 0; only transport failures and non-JSON bodies are errors.
    pub async fn fetch_usd_price(&self) -> Result<f64, PipelineError> {
        debug!(token_id = %self.token_id, "fetching token price");

        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&[("ids", self.token_id.as_str()), ("vs_currencies", "usd")])
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(usd_price_from_body(&body, &self.token_id))
    }
}

/// Extracts `{ "<token-id>": { "usd": <number> } }`, 0 when absent.
pub fn usd_price_from_body(body: &Value, token_id: &str) -> f64 {
    body.get(token_id)
        .and_then(|quote| quote.get("usd"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}
