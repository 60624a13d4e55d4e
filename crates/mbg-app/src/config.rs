//! Configuration management for mbg-tracker
//!
//! Config stored at: ~/.config/mbg-tracker/config.json
//! Scenario files (TOML) carry a `SimulationSettings` table.

use std::path::{Path, PathBuf};

use mbg_domain::model::GeoPoint;
use mbg_domain::service::SimulationConfig;
use mbg_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "mbg-tracker";

/// Simulation parameters as stored in config and scenario files
///
/// Flat lat/lng fields keep the TOML readable; `simulation_config` turns
/// them into a `SimulationConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Label used for alerts raised by the run (e.g., "Armada #042")
    pub fleet_label: String,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub destination_latitude: f64,
    pub destination_longitude: f64,
    pub initial_eta_minutes: u32,
    pub initial_temperature_c: f64,
    pub position_tick_ms: i64,
    pub status_tick_ms: i64,
    pub convergence_rate: f64,
    pub eta_decrement_probability: f64,
    pub temperature_jitter_c: f64,
    pub arrival_epsilon_meters: f64,
    pub safe_temp_low_c: f64,
    pub safe_temp_high_c: f64,
    pub warning_threshold_c: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            fleet_label: "Armada #042".to_string(),
            start_latitude: sim.start_point.latitude,
            start_longitude: sim.start_point.longitude,
            destination_latitude: sim.destination.latitude,
            destination_longitude: sim.destination.longitude,
            initial_eta_minutes: sim.initial_eta_minutes,
            initial_temperature_c: sim.initial_temperature_c,
            position_tick_ms: sim.position_tick_ms,
            status_tick_ms: sim.status_tick_ms,
            convergence_rate: sim.convergence_rate,
            eta_decrement_probability: sim.eta_decrement_probability,
            temperature_jitter_c: sim.temperature_jitter_c,
            arrival_epsilon_meters: sim.arrival_epsilon_meters,
            safe_temp_low_c: sim.safe_temp_range_c.0,
            safe_temp_high_c: sim.safe_temp_range_c.1,
            warning_threshold_c: sim.warning_threshold_c,
        }
    }
}

impl SimulationSettings {
    /// Engine configuration; coordinates are validated when the engine is built
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            start_point: GeoPoint {
                latitude: self.start_latitude,
                longitude: self.start_longitude,
            },
            destination: GeoPoint {
                latitude: self.destination_latitude,
                longitude: self.destination_longitude,
            },
            initial_eta_minutes: self.initial_eta_minutes,
            initial_temperature_c: self.initial_temperature_c,
            position_tick_ms: self.position_tick_ms,
            status_tick_ms: self.status_tick_ms,
            convergence_rate: self.convergence_rate,
            eta_decrement_probability: self.eta_decrement_probability,
            temperature_jitter_c: self.temperature_jitter_c,
            arrival_epsilon_meters: self.arrival_epsilon_meters,
            safe_temp_range_c: (self.safe_temp_low_c, self.safe_temp_high_c),
            warning_threshold_c: self.warning_threshold_c,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Data directory override (alerts.json, dashboard.json)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// tracing filter directive used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub simulation: SimulationSettings,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: default_output_format(),
            data_dir: None,
            log_filter: default_log_filter(),
            seed: None,
            simulation: SimulationSettings::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join(APP_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join(APP_DIR);
        Ok(data_dir)
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load simulation settings from a TOML scenario file
    ///
    /// Missing keys fall back to the demo run's values.
    pub fn load_scenario(path: &Path) -> Result<SimulationSettings> {
        let content = std::fs::read_to_string(path)?;
        let settings: SimulationSettings = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        Ok(settings)
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        self.simulation.simulation_config()
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sim = &self.simulation;
        writeln!(f, "MBG Tracker Configuration")?;
        writeln!(f, "=========================")?;
        writeln!(f)?;
        writeln!(f, "Output format:  {}", self.output_format)?;
        writeln!(
            f,
            "Data dir:       {}",
            self.data_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Log filter:     {}", self.log_filter)?;
        writeln!(
            f,
            "Seed:           {}",
            self.seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "(random)".to_string())
        )?;
        writeln!(f)?;
        writeln!(f, "Simulation")?;
        writeln!(f, "  Fleet:        {}", sim.fleet_label)?;
        writeln!(f, "  Start:        ({:.5}, {:.5})", sim.start_latitude, sim.start_longitude)?;
        writeln!(
            f,
            "  Destination:  ({:.5}, {:.5})",
            sim.destination_latitude, sim.destination_longitude
        )?;
        writeln!(f, "  Initial ETA:  {} min", sim.initial_eta_minutes)?;
        writeln!(f, "  Initial temp: {:.1} °C", sim.initial_temperature_c)?;
        writeln!(
            f,
            "  Ticks:        position {} ms, status {} ms",
            sim.position_tick_ms, sim.status_tick_ms
        )?;
        writeln!(f, "  Convergence:  {}", sim.convergence_rate)?;
        writeln!(
            f,
            "  Safe band:    {:.1}-{:.1} °C (warning from {:.1})",
            sim.safe_temp_low_c, sim.safe_temp_high_c, sim.warning_threshold_c
        )?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}
