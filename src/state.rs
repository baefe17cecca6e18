use crate::background::{badge::Badge, update_pipeline::PipelineHandle};
use crate::config::AppConfig;
use crate::display::popup_view::DisplaySettings;
use crate::storage::gas_store::GasStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: GasStore,
    pub pipeline: PipelineHandle,
    pub badge: Badge,
    pub display: DisplaySettings,
}

impl AppState {
    pub fn new(config: AppConfig, store: GasStore, pipeline: PipelineHandle, badge: Badge) -> Self {
        let display = DisplaySettings::from(&config);
        Self {
            config,
            store,
            pipeline,
            badge,
            display,
        }
    }
}
