//! Inactivity sweeper: forfeits matches whose challenger stopped acting.
//!
//! Every `sweep_interval` the worker asks the [`BattleService`] to forfeit all
//! open matches idle for longer than `inactivity_timeout`. The service takes
//! each match's lock and re-checks the version, so a sweep never races a
//! round being submitted.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::sync::oneshot;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::service::BattleService;

pub struct SweepWorker {
    service: BattleService,
    inactivity_timeout: TimeDelta,
    sweep_interval: Duration,
    shutdown_rx: oneshot::Receiver<()>,
}

impl SweepWorker {
    pub fn new(
        service: BattleService,
        inactivity_timeout: Duration,
        sweep_interval: Duration,
        shutdown_rx: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            service,
            inactivity_timeout: TimeDelta::from_std(inactivity_timeout)
                .unwrap_or(TimeDelta::MAX),
            // tokio intervals reject a zero period.
            sweep_interval: sweep_interval.max(Duration::from_millis(1)),
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        info!(
            "SweepWorker started (timeout: {}s, interval: {:?})",
            self.inactivity_timeout.num_seconds(),
            self.sweep_interval
        );

        let mut ticker = time::interval(self.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut self.shutdown_rx => {
                    info!("SweepWorker shutting down");
                    break;
                }
                _ = ticker.tick() => self.sweep_once().await,
            }
        }
    }

    async fn sweep_once(&self) {
        let Some(cutoff) = Utc::now().checked_sub_signed(self.inactivity_timeout) else {
            return;
        };

        match self.service.forfeit_idle_since(cutoff).await {
            Ok(forfeited) if forfeited.is_empty() => debug!("Sweep found no idle matches"),
            Ok(forfeited) => info!(count = forfeited.len(), "Forfeited idle matches"),
            Err(err) => error!(error = %err, "Inactivity sweep failed"),
        }
    }
}
