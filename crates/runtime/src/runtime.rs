//! High-level runtime orchestrator.
//!
//! The runtime owns the background sweep worker, wires storage, the creature
//! roster and the opponent policy into a [`BattleService`], and exposes a
//! builder-based API for the server binary and tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use arena_core::{BattleConfig, OpponentPolicy, WeightedOpponentPolicy};

use crate::api::RuntimeError;
use crate::events::{Event, EventBus, Topic};
use crate::oracle::CreatureOracle;
use crate::repository::{ArenaRepository, InMemoryArenaStore};
use crate::service::BattleService;
use crate::workers::SweepWorker;

/// Runtime configuration shared across the service and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Open matches idle longer than this are forfeited by the challenger.
    pub inactivity_timeout: Duration,
    pub sweep_interval: Duration,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            inactivity_timeout: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(30),
            event_buffer_size: 100,
        }
    }
}

/// Running arena: the battle service plus its background sweep worker.
///
/// [`BattleService`] is cloneable and can be handed to request handlers.
pub struct ArenaRuntime {
    service: BattleService,
    shutdown_tx: Option<oneshot::Sender<()>>,
    sweep_handle: JoinHandle<()>,
}

impl ArenaRuntime {
    /// Create a new runtime builder
    pub fn builder() -> ArenaRuntimeBuilder {
        ArenaRuntimeBuilder::new()
    }

    pub fn service(&self) -> BattleService {
        self.service.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.service.events().subscribe(topic)
    }

    /// Stop the sweep worker and wait for it to exit.
    pub async fn shutdown(mut self) -> Result<(), RuntimeError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The worker may already be gone; nothing left to signal then.
            let _ = tx.send(());
        }
        self.sweep_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`ArenaRuntime`] with flexible configuration.
pub struct ArenaRuntimeBuilder {
    config: RuntimeConfig,
    store: Option<Arc<dyn ArenaRepository>>,
    roster: Option<Arc<dyn CreatureOracle>>,
    policy: Option<Arc<dyn OpponentPolicy>>,
}

impl ArenaRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            store: None,
            roster: None,
            policy: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required creature roster
    pub fn roster(mut self, roster: Arc<dyn CreatureOracle>) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Set storage (defaults to a fresh [`InMemoryArenaStore`])
    pub fn store(mut self, store: Arc<dyn ArenaRepository>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set opponent policy (defaults to [`WeightedOpponentPolicy`])
    pub fn policy(mut self, policy: Arc<dyn OpponentPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Build the runtime and spawn the sweep worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<ArenaRuntime, RuntimeError> {
        let roster = self.roster.ok_or(RuntimeError::MissingRoster)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryArenaStore::new()) as Arc<dyn ArenaRepository>);
        let policy = self.policy.unwrap_or_else(|| {
            Arc::new(WeightedOpponentPolicy::new(self.config.battle.clone())) as Arc<dyn OpponentPolicy>
        });

        let events = EventBus::with_capacity(self.config.event_buffer_size);
        let service = BattleService::new(store, roster, policy, self.config.battle, events);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = SweepWorker::new(
            service.clone(),
            self.config.inactivity_timeout,
            self.config.sweep_interval,
            shutdown_rx,
        );
        let sweep_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(ArenaRuntime {
            service,
            shutdown_tx: Some(shutdown_tx),
            sweep_handle,
        })
    }
}
