use std::time::Duration;

use chrono::Utc;
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};
use tracing::{error, info, warn};

use crate::{
    background::update_pipeline::PipelineHandle, config::AppConfig,
    errors::pipeline_error::PipelineError,
};

pub const UPDATE_ALARM: &str = "gasUpdate";
pub const WATCHDOG_ALARM: &str = "gasUpdateWatchdog";

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub update_interval: Duration,
    pub watchdog_interval: Option<Duration>,
    pub stale_after: Duration,
}

impl From<&AppConfig> for SchedulerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            update_interval: config.update_interval(),
            watchdog_interval: config.watchdog_interval(),
            stale_after: config.stale_after(),
        }
    }
}

/// Arms the periodic update trigger and, if configured, the staleness
/// watchdog. The first tick fires one full period from now since startup
/// already ran the pipeline once.
pub fn start(handle: PipelineHandle, config: SchedulerConfig) -> JoinHandle<()> {
    info!(
        update_interval = ?config.update_interval,
        watchdog_interval = ?config.watchdog_interval,
        "Starting periodic updates"
    );
    tokio::spawn(run(handle, config))
}

async fn run(handle: PipelineHandle, config: SchedulerConfig) {
    let start = Instant::now();
    let mut updates = interval_at(start + config.update_interval, config.update_interval);
    updates.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut watchdog = config.watchdog_interval.map(|period| {
        let mut watchdog = interval_at(start + period, period);
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Skip);
        watchdog
    });

    loop {
        let alarm = tokio::select! {
            _ = updates.tick() => UPDATE_ALARM,
            _ = tick(&mut watchdog) => WATCHDOG_ALARM,
        };

        let result = match alarm {
            WATCHDOG_ALARM => match handle.snapshot().await {
                Ok(state) if state.is_stale(Utc::now(), config.stale_after) => {
                    warn!(last_update = ?state.last_update, "Gas data is stale, watchdog updating");
                    updates.reset();
                    handle.refresh(WATCHDOG_ALARM).await.map(|_| ())
                }
                Ok(_) => Ok(()),
                Err(e) => Err(e),
            },
            _ => handle.refresh(UPDATE_ALARM).await.map(|_| ()),
        };

        match result {
            Err(PipelineError::PipelineClosed) => {
                info!("Update pipeline closed, stopping periodic updates");
                break;
            }
            // The next tick gets a fresh attempt.
            Err(e) => error!(alarm, error = %e, "Scheduled update failed"),
            Ok(()) => {}
        }
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
