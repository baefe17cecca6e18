use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info};

use crate::clients::price_api::PriceApiClient;

pub const PRICE_CACHE_TTL: Duration = Duration::from_secs(60);

/// Memoized token price. Lives in memory only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceCache {
    pub price: f64,
    pub fetched_at: Option<Instant>,
}

impl PriceCache {
    /// The cached price when it was fetched less than `ttl` before `now`.
    pub fn fresh_price(&self, now: Instant, ttl: Duration) -> Option<f64> {
        let fetched_at = self.fetched_at?;
        (now.saturating_duration_since(fetched_at) < ttl).then_some(self.price)
    }

    pub fn record(&mut self, price: f64, now: Instant) {
        self.price = price;
        self.fetched_at = Some(now);
    }

    /// Stale-but-available price, 0 if nothing was ever fetched.
    pub fn fallback(&self) -> f64 {
        self.price
    }
}

/// Cached token price lookup. Never fails: upstream errors degrade to the
/// last known price.
#[derive(Debug)]
pub struct TokenPriceLookup {
    client: PriceApiClient,
    cache: PriceCache,
    ttl: Duration,
}

impl TokenPriceLookup {
    pub fn new(client: PriceApiClient, ttl: Duration) -> Self {
        Self {
            client,
            cache: PriceCache::default(),
            ttl,
        }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    pub async fn get_token_price(&mut self) -> f64 {
        self.get_token_price_at(Instant::now()).await
    }

    pub async fn get_token_price_at(&mut self, now: Instant) -> f64 {
        if let Some(price) = self.cache.fresh_price(now, self.ttl) {
            return price;
        }

        match self.client.fetch_usd_price().await {
            Ok(price) => {
                self.cache.record(price, now);
                info!(token_id = %self.client.token_id(), price, "Fetched fresh token price");
                price
            }
            Err(e) => {
                error!(
                    token_id = %self.client.token_id(),
                    error = %e,
                    "Failed to fetch token price, using cached value"
                );
                self.cache.fallback()
            }
        }
    }
}
