//! Display client rendering.
//!
//! Turns the persisted `GasState` (if any) into the strings a popup shows:
//! per-tier fee rates, the USD cost of a reference transfer, the token price
//! and a status line.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{
    background::gas_state::{GasState, GWEI},
    config::AppConfig,
    utils::to_fixed::to_fixed,
};

pub const NO_DATA_STATUS: &str = "No data available";
pub const DATA_LOADED_STATUS: &str = "Data loaded";
pub const PLACEHOLDER: &str = "--";

const PRODUCT_NAME: &str = "HyperEVM Real-Time Gas";

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    pub token_symbol: String,
    pub transfer_gas_limit: u64,
    pub timezone: Tz,
}

impl From<&AppConfig> for DisplaySettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            token_symbol: config.token_symbol.clone(),
            transfer_gas_limit: config.transfer_gas_limit,
            timezone: config.display_timezone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierView {
    pub gas: String,
    pub cost: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTiersView {
    pub normal: TierView,
    pub fast: TierView,
    pub instant: TierView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupView {
    pub status: String,
    pub tiers: Option<FeeTiersView>,
    pub token_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutView {
    pub version: String,
    pub copyright: String,
}

pub fn render(state: Option<&GasState>, settings: &DisplaySettings) -> PopupView {
    let Some(state) = state else {
        return PopupView {
            status: NO_DATA_STATUS.to_string(),
            tiers: None,
            token_price: format_token_price(0.0, &settings.token_symbol),
        };
    };

    let tier = |gwei: f64| TierView {
        gas: format!("{} gwei", format_gas_price(gwei)),
        cost: calculate_cost(gwei, state.token_price_usd, settings.transfer_gas_limit),
    };

    PopupView {
        status: format_status(state.last_update, settings.timezone),
        tiers: Some(FeeTiersView {
            normal: tier(state.normal),
            fast: tier(state.fast),
            instant: tier(state.instant),
        }),
        token_price: format_token_price(state.token_price_usd, &settings.token_symbol),
    }
}

pub fn format_gas_price(price: f64) -> String {
    if price < 1.0 {
        to_fixed(price, 3)
    } else if price < 10.0 {
        to_fixed(price, 2)
    } else {
        to_fixed(price, 1)
    }
}

/// USD cost of spending `gas_limit` gas at `gas_price_gwei`.
pub fn calculate_cost(gas_price_gwei: f64, token_price_usd: f64, gas_limit: u64) -> String {
    if token_price_usd <= 0.0 || !token_price_usd.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let cost_in_token = gas_price_gwei * gas_limit as f64 / GWEI;
    let cost_in_usd = cost_in_token * token_price_usd;

    if cost_in_usd < 0.01 {
        "<$0.01".to_string()
    } else {
        format!("${}", to_fixed(cost_in_usd, 2))
    }
}

pub fn format_token_price(token_price_usd: f64, symbol: &str) -> String {
    if token_price_usd > 0.0 {
        format!("{symbol}: ${}", to_fixed(token_price_usd, 2))
    } else {
        format!("{symbol}: ${PLACEHOLDER}")
    }
}

pub fn format_status(last_update: Option<DateTime<Utc>>, timezone: Tz) -> String {
    match last_update {
        Some(last_update) => format!(
            "Updated at {}",
            last_update.with_timezone(&timezone).format("%H:%M:%S")
        ),
        None => DATA_LOADED_STATUS.to_string(),
    }
}

pub fn about(now: DateTime<Utc>) -> AboutView {
    AboutView {
        version: format!("v{}", env!("CARGO_PKG_VERSION")),
        copyright: format!("© {} {PRODUCT_NAME}", now.year()),
    }
}
