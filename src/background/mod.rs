pub mod badge;
pub mod gas_state;
pub mod price_cache;
pub mod scheduler;
pub mod update_pipeline;
