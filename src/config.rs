use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_price_api_base_url")]
    pub price_api_base_url: String,
    #[serde(default = "default_token_id")]
    pub token_id: String,
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    #[serde(default = "default_price_cache_ttl_secs")]
    pub price_cache_ttl_secs: u64,
    /// Enables the staleness watchdog when set.
    #[serde(default)]
    pub watchdog_interval_secs: Option<u64>,
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Gas used by the reference transfer the popup prices in USD.
    #[serde(default = "default_transfer_gas_limit")]
    pub transfer_gas_limit: u64,
    #[serde(default = "default_display_timezone")]
    pub display_timezone: Tz,
    #[serde(default = "default_app_server_port")]
    pub app_server_port: u16,
}

fn default_rpc_url() -> String {
    "https://rpc.hyperliquid.xyz/evm".to_string()
}

fn default_price_api_base_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price".to_string()
}

fn default_token_id() -> String {
    "hyperliquid".to_string()
}

fn default_token_symbol() -> String {
    "HYPE".to_string()
}

fn default_storage_path() -> String {
    "gas_data.json".to_string()
}

fn default_update_interval_secs() -> u64 {
    30
}

fn default_price_cache_ttl_secs() -> u64 {
    60
}

fn default_stale_after_secs() -> u64 {
    90
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_transfer_gas_limit() -> u64 {
    46_000
}

fn default_display_timezone() -> Tz {
    Tz::UTC
}

fn default_app_server_port() -> u16 {
    8080
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            price_api_base_url: default_price_api_base_url(),
            token_id: default_token_id(),
            token_symbol: default_token_symbol(),
            storage_path: default_storage_path(),
            update_interval_secs: default_update_interval_secs(),
            price_cache_ttl_secs: default_price_cache_ttl_secs(),
            watchdog_interval_secs: None,
            stale_after_secs: default_stale_after_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            transfer_gas_limit: default_transfer_gas_limit(),
            display_timezone: default_display_timezone(),
            app_server_port: default_app_server_port(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        let config = envy::from_env::<AppConfig>()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), envy::Error> {
        if self.rpc_url.trim().is_empty() {
            return Err(envy::Error::Custom("RPC_URL cannot be empty.".to_string()));
        }

        if self.price_api_base_url.trim().is_empty() {
            return Err(envy::Error::Custom(
                "PRICE_API_BASE_URL cannot be empty.".to_string(),
            ));
        }

        if self.token_id.trim().is_empty() {
            return Err(envy::Error::Custom("TOKEN_ID cannot be empty.".to_string()));
        }

        if self.update_interval_secs == 0 {
            return Err(envy::Error::Custom(
                "UPDATE_INTERVAL_SECS must be greater than zero.".to_string(),
            ));
        }

        if self.watchdog_interval_secs == Some(0) {
            return Err(envy::Error::Custom(
                "WATCHDOG_INTERVAL_SECS must be greater than zero.".to_string(),
            ));
        }

        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn price_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.price_cache_ttl_secs)
    }

    pub fn watchdog_interval(&self) -> Option<Duration> {
        self.watchdog_interval_secs.map(Duration::from_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
