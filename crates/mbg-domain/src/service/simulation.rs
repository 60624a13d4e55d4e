//! Fleet telemetry simulation engine
//!
//! Moves a vehicle toward a fixed destination by closing a fixed fraction of
//! the remaining distance on every position tick, and perturbs ETA and cargo
//! temperature on every status tick. The engine has two states: `EnRoute`
//! and the terminal `Arrived`.
//!
//! Time and randomness are injected: every tick carries its own `now`, and
//! the engine is generic over [`RandomSource`].

use chrono::{DateTime, Utc};
use mbg_types::SimulationError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::{
    distance_meters, interpolate, FleetTelemetry, GeoPoint, RunState, TelemetrySnapshot,
};
use crate::service::random::RandomSource;
use crate::service::temperature::TemperatureThresholds;
use crate::service::tick::{Tick, TickKind};

/// SDIT Al Uswah, Gebang Putih, Surabaya
pub const DEMO_DESTINATION: GeoPoint = GeoPoint {
    latitude: -7.28325,
    longitude: 112.79361,
};

/// Demo start point, 0.005° south-west of the destination (near Sukolilo)
pub const DEMO_START: GeoPoint = GeoPoint {
    latitude: -7.28825,
    longitude: 112.78861,
};

/// Parameters of one simulated run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub start_point: GeoPoint,
    pub destination: GeoPoint,
    pub initial_eta_minutes: u32,
    pub initial_temperature_c: f64,
    /// Position tick period
    pub position_tick_ms: i64,
    /// ETA/temperature tick period
    pub status_tick_ms: i64,
    /// Fraction of the remaining distance closed per position tick, in (0, 1]
    pub convergence_rate: f64,
    /// Chance that a status tick takes a minute off the ETA
    pub eta_decrement_probability: f64,
    /// Temperature moves by a uniform sample in [-jitter, +jitter] per status tick
    pub temperature_jitter_c: f64,
    /// Distance under which the vehicle counts as arrived
    pub arrival_epsilon_meters: f64,
    pub safe_temp_range_c: (f64, f64),
    pub warning_threshold_c: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_point: DEMO_START,
            destination: DEMO_DESTINATION,
            initial_eta_minutes: 12,
            initial_temperature_c: 68.5,
            position_tick_ms: 2000,
            status_tick_ms: 5000,
            convergence_rate: 0.05,
            eta_decrement_probability: 0.2,
            temperature_jitter_c: 0.1,
            arrival_epsilon_meters: 15.0,
            safe_temp_range_c: (60.0, 75.0),
            warning_threshold_c: 70.0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.start_point.validate()?;
        self.destination.validate()?;

        let invalid = |msg: String| Err(SimulationError::InvalidConfiguration(msg));

        if !(self.convergence_rate > 0.0 && self.convergence_rate <= 1.0) {
            return invalid(format!(
                "convergence_rate must be in (0, 1], got {}",
                self.convergence_rate
            ));
        }
        if self.position_tick_ms <= 0 {
            return invalid(format!(
                "position_tick_ms must be positive, got {}",
                self.position_tick_ms
            ));
        }
        if self.status_tick_ms <= 0 {
            return invalid(format!(
                "status_tick_ms must be positive, got {}",
                self.status_tick_ms
            ));
        }
        if !(self.arrival_epsilon_meters > 0.0) {
            return invalid(format!(
                "arrival_epsilon_meters must be positive, got {}",
                self.arrival_epsilon_meters
            ));
        }
        if !(0.0..=1.0).contains(&self.eta_decrement_probability) {
            return invalid(format!(
                "eta_decrement_probability must be in [0, 1], got {}",
                self.eta_decrement_probability
            ));
        }
        if !(self.temperature_jitter_c >= 0.0) {
            return invalid(format!(
                "temperature_jitter_c must not be negative, got {}",
                self.temperature_jitter_c
            ));
        }
        let (low, high) = self.safe_temp_range_c;
        if !(low <= self.warning_threshold_c && self.warning_threshold_c <= high) {
            return invalid(format!(
                "warning_threshold_c {} must lie inside the safe range [{}, {}]",
                self.warning_threshold_c, low, high
            ));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> TemperatureThresholds {
        TemperatureThresholds::from_band(self.safe_temp_range_c, self.warning_threshold_c)
    }

    /// Position tick period; only meaningful after `validate`
    pub fn position_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.position_tick_ms.max(1) as u64)
    }

    /// Status tick period; only meaningful after `validate`
    pub fn status_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.status_tick_ms.max(1) as u64)
    }
}

/// Simulation state for a single run
#[derive(Debug)]
pub struct SimulationEngine<R> {
    run_id: String,
    config: SimulationConfig,
    thresholds: TemperatureThresholds,
    telemetry: FleetTelemetry,
    state: RunState,
    stopped: bool,
    rng: R,
}

impl<R: RandomSource> SimulationEngine<R> {
    pub fn new(
        run_id: impl Into<String>,
        config: SimulationConfig,
        rng: R,
        now: DateTime<Utc>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let telemetry = FleetTelemetry::new(
            config.start_point,
            config.destination,
            config.initial_eta_minutes,
            config.initial_temperature_c,
            now,
        )?;

        let mut engine = Self {
            run_id: run_id.into(),
            thresholds: config.thresholds(),
            config,
            telemetry,
            state: RunState::EnRoute,
            stopped: false,
            rng,
        };
        engine.check_arrival(now);
        debug!(run_id = %engine.run_id, state = %engine.state, "simulation engine created");
        Ok(engine)
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn telemetry(&self) -> &FleetTelemetry {
        &self.telemetry
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn distance_to_destination(&self) -> f64 {
        distance_meters(self.telemetry.position, self.telemetry.destination)
    }

    /// Current state as an immutable snapshot
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            run_id: self.run_id.clone(),
            position: self.telemetry.position,
            destination: self.telemetry.destination,
            eta_minutes: self.telemetry.eta_minutes,
            cargo_temperature_c: self.telemetry.cargo_temperature_c,
            temperature_classification: self
                .thresholds
                .classify(self.telemetry.cargo_temperature_c),
            state: self.state,
            last_updated_at: self.telemetry.last_updated_at,
        }
    }

    /// Close `convergence_rate` of the remaining distance
    ///
    /// Once arrived, returns the current snapshot unchanged.
    pub fn tick_position(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<TelemetrySnapshot, SimulationError> {
        self.ensure_running()?;
        if self.state == RunState::Arrived {
            return Ok(self.snapshot());
        }

        let next = interpolate(
            self.telemetry.position,
            self.telemetry.destination,
            self.config.convergence_rate,
        );
        self.telemetry = self.telemetry.with_updated_position(next, now)?;
        self.check_arrival(now);
        Ok(self.snapshot())
    }

    /// Perturb ETA (while en route) and cargo temperature (always)
    pub fn tick_status(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<TelemetrySnapshot, SimulationError> {
        self.ensure_running()?;

        let mut eta = self.telemetry.eta_minutes;
        if self.state == RunState::EnRoute
            && self.rng.next_unit() < self.config.eta_decrement_probability
        {
            // Floored at 1: only arrival takes the ETA to 0.
            eta = eta.saturating_sub(1).max(1);
        }

        let jitter = self.config.temperature_jitter_c;
        let temperature = self.telemetry.cargo_temperature_c + self.rng.uniform(-jitter, jitter);

        self.telemetry = self.telemetry.with_status(eta, temperature, now);
        self.check_arrival(now);
        Ok(self.snapshot())
    }

    pub fn apply(&mut self, tick: Tick) -> Result<TelemetrySnapshot, SimulationError> {
        match tick.kind {
            TickKind::Position => self.tick_position(tick.at),
            TickKind::Status => self.tick_status(tick.at),
        }
    }

    /// Cancel the run. Later ticks fail with `EngineAlreadyStopped`.
    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            info!(run_id = %self.run_id, state = %self.state, "simulation engine stopped");
        }
    }

    fn ensure_running(&self) -> Result<(), SimulationError> {
        if self.stopped {
            warn!(run_id = %self.run_id, "tick requested after engine stop; ignored");
            return Err(SimulationError::EngineAlreadyStopped);
        }
        Ok(())
    }

    fn check_arrival(&mut self, now: DateTime<Utc>) {
        if self.state == RunState::Arrived {
            return;
        }
        let distance = self.distance_to_destination();
        if distance < self.config.arrival_epsilon_meters || self.telemetry.eta_minutes == 0 {
            self.state = RunState::Arrived;
            self.telemetry = self
                .telemetry
                .with_status(0, self.telemetry.cargo_temperature_c, now);
            info!(
                run_id = %self.run_id,
                distance_m = distance,
                position = %self.telemetry.position,
                "vehicle arrived at destination"
            );
        }
    }
}
