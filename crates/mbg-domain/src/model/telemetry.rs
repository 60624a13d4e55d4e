//! Live telemetry for one vehicle on a distribution run

use chrono::{DateTime, Utc};
use mbg_types::SimulationError;
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// Run lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    EnRoute,
    Arrived,
}

impl RunState {
    pub fn label(&self) -> &'static str {
        match self {
            RunState::EnRoute => "EN_ROUTE",
            RunState::Arrived => "ARRIVED",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Cargo temperature classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureClass {
    Safe,
    Warning,
    Critical,
}

impl TemperatureClass {
    pub fn label(&self) -> &'static str {
        match self {
            TemperatureClass::Safe => "Safe",
            TemperatureClass::Warning => "Warning",
            TemperatureClass::Critical => "Critical",
        }
    }

    pub fn is_alert(&self) -> bool {
        !matches!(self, TemperatureClass::Safe)
    }
}

impl std::fmt::Display for TemperatureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Vehicle state owned by the simulation engine
///
/// Values are replaced wholesale on every tick; the `with_*` methods return
/// a new record and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetTelemetry {
    pub position: GeoPoint,
    pub destination: GeoPoint,
    pub eta_minutes: u32,
    pub cargo_temperature_c: f64,
    pub last_updated_at: DateTime<Utc>,
}

impl FleetTelemetry {
    pub fn new(
        position: GeoPoint,
        destination: GeoPoint,
        eta_minutes: u32,
        cargo_temperature_c: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, SimulationError> {
        position.validate()?;
        destination.validate()?;
        Ok(Self {
            position,
            destination,
            eta_minutes,
            cargo_temperature_c,
            last_updated_at: now,
        })
    }

    /// New record with the position moved and the timestamp refreshed
    pub fn with_updated_position(
        &self,
        new_position: GeoPoint,
        now: DateTime<Utc>,
    ) -> Result<Self, SimulationError> {
        new_position.validate()?;
        Ok(Self {
            position: new_position,
            last_updated_at: now,
            ..self.clone()
        })
    }

    /// New record with ETA and temperature replaced and the timestamp refreshed
    pub fn with_status(
        &self,
        eta_minutes: u32,
        cargo_temperature_c: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            eta_minutes,
            cargo_temperature_c,
            last_updated_at: now,
            ..self.clone()
        }
    }
}

/// Immutable view of a run, published after every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub run_id: String,
    pub position: GeoPoint,
    pub destination: GeoPoint,
    pub eta_minutes: u32,
    pub cargo_temperature_c: f64,
    pub temperature_classification: TemperatureClass,
    pub state: RunState,
    pub last_updated_at: DateTime<Utc>,
}

impl TelemetrySnapshot {
    pub fn is_arrived(&self) -> bool {
        self.state == RunState::Arrived
    }
}
