//! Domain services

pub mod random;
pub mod simulation;
pub mod temperature;
pub mod tick;

pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use simulation::{SimulationConfig, SimulationEngine};
pub use temperature::{classify_temperature, temperature_alert, TemperatureThresholds};
pub use tick::{LogicalSchedule, ScriptedTicks, Tick, TickKind, TickSource};
