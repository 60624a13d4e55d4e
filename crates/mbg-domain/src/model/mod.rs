//! Domain model types

pub mod geo;
pub mod telemetry;

pub use geo::{distance_meters, interpolate, GeoPoint};
pub use telemetry::{FleetTelemetry, RunState, TelemetrySnapshot, TemperatureClass};
