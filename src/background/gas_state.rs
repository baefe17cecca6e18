use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::iso_timestamp_serde;

/// Storage key the snapshot is persisted under.
pub const GAS_STATE_KEY: &str = "gasData";

/// Wei per gwei.
pub const GWEI: f64 = 1_000_000_000.0;

/// Floor applied to the rounded base price.
pub const MIN_GAS_PRICE_GWEI: f64 = 0.01;

pub const FAST_MULTIPLIER: f64 = 1.25;
pub const INSTANT_MULTIPLIER: f64 = 1.5;

/// The latest known fee snapshot, in gwei.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasState {
    pub normal: f64,
    pub fast: f64,
    pub instant: f64,
    #[serde(default, alias = "hypePrice")]
    pub token_price_usd: f64,
    #[serde(with = "iso_timestamp_serde", default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl GasState {
    /// Builds the three fee tiers from an already floored base price.
    pub fn derive(base_price: f64, token_price_usd: f64, now: DateTime<Utc>) -> Self {
        Self {
            normal: round2(base_price),
            fast: round2(base_price * FAST_MULTIPLIER),
            instant: round2(base_price * INSTANT_MULTIPLIER),
            token_price_usd,
            last_update: Some(now),
        }
    }

    /// Snapshot older than `max_age` (or never fetched).
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: std::time::Duration) -> bool {
        match self.last_update {
            Some(last_update) => (now - last_update)
                .to_std()
                .map(|age| age > max_age)
                .unwrap_or(false),
            None => true,
        }
    }
}

/// Rounds to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn wei_to_gwei(wei: f64) -> f64 {
    wei / GWEI
}

/// Converts a raw wei gas price into the floored display base price.
pub fn base_price_from_wei(wei: f64) -> f64 {
    let rounded = round2(wei_to_gwei(wei));
    rounded.max(MIN_GAS_PRICE_GWEI)
}
