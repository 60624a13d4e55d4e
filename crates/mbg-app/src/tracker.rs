//! Live run tracking
//!
//! Each distribution run gets its own tokio task that owns a
//! `SimulationEngine` and advances it from two intervals (position and
//! status). Snapshots are published through a `watch` channel; readers only
//! ever see whole snapshots. Cancelling a run stops the engine, ends the task
//! and drops the sender, so subscribers observe no further updates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mbg_domain::model::TelemetrySnapshot;
use mbg_domain::service::{RandomSource, SimulationConfig, SimulationEngine};
use mbg_types::{Error, Result, SimulationError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-run behaviour of the driving task
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// End the task once the vehicle has arrived. Otherwise status ticks keep
    /// reporting cargo temperature until the run is cancelled.
    pub stop_on_arrival: bool,
}

struct RunHandle {
    snapshots: watch::Receiver<TelemetrySnapshot>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Registry of active runs keyed by run id
#[derive(Default)]
pub struct FleetTracker {
    runs: HashMap<String, RunHandle>,
}

impl FleetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run with a generated id. Must be called inside a tokio runtime.
    pub fn start_run<R>(
        &mut self,
        config: SimulationConfig,
        rng: R,
        options: RunOptions,
    ) -> Result<String>
    where
        R: RandomSource + Send + 'static,
    {
        self.start_run_with_id(Uuid::new_v4().to_string(), config, rng, options)
    }

    pub fn start_run_with_id<R>(
        &mut self,
        run_id: String,
        config: SimulationConfig,
        rng: R,
        options: RunOptions,
    ) -> Result<String>
    where
        R: RandomSource + Send + 'static,
    {
        if self.runs.contains_key(&run_id) {
            return Err(Error::InvalidInput(format!("run {} is already active", run_id)));
        }

        let engine = SimulationEngine::new(run_id.clone(), config, rng, Utc::now())?;
        let (tx, rx) = watch::channel(engine.snapshot());
        let cancel = CancellationToken::new();
        let task = tokio::spawn(drive(engine, tx, cancel.clone(), options));

        info!(run_id = %run_id, stop_on_arrival = options.stop_on_arrival, "run started");
        self.runs.insert(
            run_id.clone(),
            RunHandle {
                snapshots: rx,
                cancel,
                task,
            },
        );
        Ok(run_id)
    }

    fn handle(&self, run_id: &str) -> Result<&RunHandle> {
        self.runs
            .get(run_id)
            .ok_or_else(|| Error::RunNotFound(run_id.to_string()))
    }

    /// Receiver for the run's snapshots
    pub fn subscribe(&self, run_id: &str) -> Result<watch::Receiver<TelemetrySnapshot>> {
        Ok(self.handle(run_id)?.snapshots.clone())
    }

    /// Latest published snapshot
    pub fn latest(&self, run_id: &str) -> Result<TelemetrySnapshot> {
        Ok(self.handle(run_id)?.snapshots.borrow().clone())
    }

    /// Whether the run's task has ended (arrived with `stop_on_arrival`)
    pub fn is_finished(&self, run_id: &str) -> Result<bool> {
        Ok(self.handle(run_id)?.task.is_finished())
    }

    /// Run ids currently registered, sorted
    pub fn active_runs(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.runs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Cancel a run and wait for its task to end; returns the last snapshot
    pub async fn cancel(&mut self, run_id: &str) -> Result<TelemetrySnapshot> {
        let handle = self
            .runs
            .remove(run_id)
            .ok_or_else(|| Error::RunNotFound(run_id.to_string()))?;

        handle.cancel.cancel();
        if let Err(e) = handle.task.await {
            warn!(run_id = %run_id, error = %e, "run task did not shut down cleanly");
        }
        let last = handle.snapshots.borrow().clone();
        info!(run_id = %run_id, state = %last.state, "run cancelled");
        Ok(last)
    }

    /// Cancel every run
    pub async fn cancel_all(&mut self) {
        for run_id in self.active_runs() {
            // Ids come from the map itself, so the lookup cannot miss.
            let _ = self.cancel(&run_id).await;
        }
    }
}

impl Drop for FleetTracker {
    fn drop(&mut self) {
        for handle in self.runs.values() {
            handle.cancel.cancel();
        }
    }
}

async fn drive<R: RandomSource>(
    mut engine: SimulationEngine<R>,
    tx: watch::Sender<TelemetrySnapshot>,
    cancel: CancellationToken,
    options: RunOptions,
) {
    let position_period = engine.config().position_period();
    let status_period = engine.config().status_period();

    // Timestamps follow tokio's clock so paused-time tests stay consistent.
    let started = Instant::now();
    let origin = Utc::now();
    let now = || -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        origin + elapsed
    };

    let mut position = interval_at(started + position_period, position_period);
    position.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut status = interval_at(started + status_period, status_period);
    status.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if options.stop_on_arrival && engine.snapshot().is_arrived() {
        debug!(run_id = %engine.run_id(), "run created at destination; nothing to drive");
        engine.stop();
        return;
    }

    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = position.tick() => engine.tick_position(now()),
            _ = status.tick() => engine.tick_status(now()),
        };

        match result {
            Ok(snapshot) => {
                let arrived = snapshot.is_arrived();
                tx.send_if_modified(|current| {
                    if *current == snapshot {
                        false
                    } else {
                        *current = snapshot;
                        true
                    }
                });
                if arrived && options.stop_on_arrival {
                    info!(run_id = %engine.run_id(), "run completed");
                    break;
                }
            }
            Err(SimulationError::EngineAlreadyStopped) => break,
            Err(e) => {
                // Keep the last good snapshot published and carry on.
                warn!(run_id = %engine.run_id(), error = %e, "tick rejected");
            }
        }
    }

    engine.stop();
}
