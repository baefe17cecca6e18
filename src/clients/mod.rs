pub mod price_api;
pub mod rpc_client;

use std::time::Duration;

/// Shared HTTP client for upstream calls. The timeout is the only bound on an
/// in-flight request; nothing else cancels it.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}
