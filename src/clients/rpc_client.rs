//! Minimal JSON-RPC 2.0 client for the chain endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::pipeline_error::PipelineError;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug)]
pub struct RpcClient {
    endpoint: String,
    client: Client,
    id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
            id: AtomicU64::new(1),
        }
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, PipelineError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.id.fetch_add(1, Ordering::SeqCst),
        };
        debug!(target: "rpc_client", method, id = request.id, "calling JSON-RPC method");

        let response: JsonRpcResponse = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(PipelineError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response.result.ok_or_else(|| {
            PipelineError::MalformedResponse("no result in JSON-RPC response".to_string())
        })?;

        serde_json::from_value(result).map_err(|err| PipelineError::MalformedResponse(err.to_string()))
    }

    /// Current gas price in wei.
    pub async fn gas_price(&self) -> Result<f64, PipelineError> {
        let quantity: String = self.call("eth_gasPrice", Value::Array(Vec::new())).await?;
        parse_hex_quantity(&quantity)
    }
}

/// Parses a `0x`-prefixed big-endian hex quantity of any width.
///
/// Values wider than 128 bits lose precision past the f64 mantissa.
pub fn parse_hex_quantity(quantity: &str) -> Result<f64, PipelineError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .ok_or_else(|| PipelineError::MalformedResponse(format!("not a hex quantity: {quantity:?}")))?;

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PipelineError::MalformedResponse(format!(
            "not a hex quantity: {quantity:?}"
        )));
    }

    if let Ok(value) = u128::from_str_radix(digits, 16) {
        return Ok(value as f64);
    }

    Ok(digits.chars().fold(0.0, |acc, c| {
        acc * 16.0 + c.to_digit(16).unwrap_or(0) as f64
    }))
}
