//! The fetch, derive, persist, badge pipeline.
//!
//! `UpdatePipeline` is the single owner of the in-memory `GasState` and the
//! token price cache. Once spawned it runs as a task that serves commands
//! one at a time, so callers only ever see it through a `PipelineHandle`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, instrument, warn};

use crate::{
    background::{
        badge::Badge,
        gas_state::{base_price_from_wei, GasState},
        price_cache::{PriceCache, TokenPriceLookup},
    },
    clients::{http_client, price_api::PriceApiClient, rpc_client::RpcClient},
    config::AppConfig,
    errors::pipeline_error::PipelineError,
    storage::gas_store::GasStore,
};

/// Trigger name used for refreshes requested by a display client.
pub const ON_DEMAND_TRIGGER: &str = "fetchGasPrice";

const COMMAND_CHANNEL_CAPACITY: usize = 32;

pub struct UpdatePipeline {
    rpc: RpcClient,
    prices: TokenPriceLookup,
    store: GasStore,
    badge: Badge,
    state: GasState,
}

impl UpdatePipeline {
    pub fn new(rpc: RpcClient, prices: TokenPriceLookup, store: GasStore, badge: Badge) -> Self {
        Self {
            rpc,
            prices,
            store,
            badge,
            state: GasState::default(),
        }
    }

    pub fn from_config(
        config: &AppConfig,
        store: GasStore,
        badge: Badge,
    ) -> Result<Self, PipelineError> {
        let client = http_client(config.request_timeout())?;
        let rpc = RpcClient::new(config.rpc_url.clone(), client.clone());
        let prices = TokenPriceLookup::new(
            PriceApiClient::new(
                config.price_api_base_url.clone(),
                config.token_id.clone(),
                client,
            ),
            config.price_cache_ttl(),
        );

        Ok(Self::new(rpc, prices, store, badge))
    }

    pub fn state(&self) -> &GasState {
        &self.state
    }

    pub fn price_cache(&self) -> &PriceCache {
        self.prices.cache()
    }

    /// Restores the last persisted snapshot, then runs the pipeline once.
    pub async fn initialize(&mut self) {
        match self.store.load_gas_state().await {
            Ok(Some(state)) => {
                info!(normal = state.normal, last_update = ?state.last_update, "Restored gas state");
                self.badge.render(state.normal);
                self.state = state;
            }
            Ok(None) => info!("No persisted gas state found"),
            Err(e) => error!(error = %e, "Failed to read persisted gas state"),
        }

        // Failures are already logged by the run itself.
        let _ = self.refresh_gas_state().await;
    }

    /// Runs one fetch, derive, persist, badge sequence.
    ///
    /// On any upstream failure the previous snapshot stays in place and
    /// nothing is written.
    #[instrument(skip(self))]
    pub async fn refresh_gas_state(&mut self) -> Result<GasState, PipelineError> {
        let wei = match self.rpc.gas_price().await {
            Ok(wei) => wei,
            Err(e) => {
                error!(error = %e, "Failed to fetch gas price");
                return Err(e);
            }
        };

        let base_price = base_price_from_wei(wei);
        let token_price_usd = self.prices.get_token_price().await;

        let next = GasState::derive(base_price, token_price_usd, Utc::now());
        self.state = next.clone();

        if let Err(e) = self.store.save_gas_state(&next).await {
            error!(error = %e, "Failed to persist gas state");
            return Err(e.into());
        }

        self.badge.render(next.normal);

        info!(
            normal = next.normal,
            fast = next.fast,
            instant = next.instant,
            token_price_usd = next.token_price_usd,
            "Gas data updated"
        );

        Ok(next)
    }

    /// Moves the pipeline onto its own task.
    pub fn spawn(self) -> PipelineHandle {
        let (sender, receiver) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        tokio::spawn(self.run(receiver));
        PipelineHandle::new(sender)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<PipelineCommand>) {
        while let Some(command) = commands.recv().await {
            match command {
                PipelineCommand::Refresh { trigger, respond_to } => {
                    info!(trigger, "Running update pipeline");
                    let result = self.refresh_gas_state().await;
                    if respond_to.send(result).is_err() {
                        warn!(trigger, "Refresh requester went away before completion");
                    }
                }
                PipelineCommand::Snapshot { respond_to } => {
                    let _ = respond_to.send(self.state.clone());
                }
            }
        }

        info!("Update pipeline stopped");
    }
}

pub(crate) enum PipelineCommand {
    Refresh {
        trigger: &'static str,
        respond_to: oneshot::Sender<Result<GasState, PipelineError>>,
    },
    Snapshot {
        respond_to: oneshot::Sender<GasState>,
    },
}

/// Reply to an on-demand refresh. Carries no snapshot; clients re-read storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl RefreshResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Clone)]
pub struct PipelineHandle {
    sender: mpsc::Sender<PipelineCommand>,
}

impl PipelineHandle {
    pub(crate) fn new(sender: mpsc::Sender<PipelineCommand>) -> Self {
        Self { sender }
    }

    /// Runs the pipeline to completion on behalf of `trigger`.
    pub async fn refresh(&self, trigger: &'static str) -> Result<GasState, PipelineError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PipelineCommand::Refresh {
                trigger,
                respond_to,
            })
            .await
            .map_err(|_| PipelineError::PipelineClosed)?;

        response.await.map_err(|_| PipelineError::PipelineClosed)?
    }

    pub async fn refresh_now(&self) -> RefreshResponse {
        match self.refresh(ON_DEMAND_TRIGGER).await {
            Ok(_) => RefreshResponse::ok(),
            Err(e) => RefreshResponse::failed(e.to_string()),
        }
    }

    /// Whether the pipeline task is still accepting commands. Does not queue
    /// behind an in-flight run.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    /// The pipeline's in-memory state, which may be ahead of storage.
    pub async fn snapshot(&self) -> Result<GasState, PipelineError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(PipelineCommand::Snapshot { respond_to })
            .await
            .map_err(|_| PipelineError::PipelineClosed)?;

        response.await.map_err(|_| PipelineError::PipelineClosed)
    }
}
