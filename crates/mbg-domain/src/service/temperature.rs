//! Cargo temperature classification for hot-food transport

use chrono::{DateTime, Utc};
use mbg_types::{AlertRecord, Severity};
use serde::{Deserialize, Serialize};

use crate::model::TemperatureClass;

/// Fixed classification thresholds in °C
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureThresholds {
    /// Readings below this have left the safe band (food cooling down)
    pub safe_low_c: f64,
    /// Readings from here up to `critical_above_c` are a warning
    pub warning_from_c: f64,
    /// Readings above this are critical
    pub critical_above_c: f64,
}

impl Default for TemperatureThresholds {
    fn default() -> Self {
        Self {
            safe_low_c: 60.0,
            warning_from_c: 70.0,
            critical_above_c: 75.0,
        }
    }
}

impl TemperatureThresholds {
    /// Thresholds from a safe band `[low, high]` and a warning threshold
    pub fn from_band(safe_range_c: (f64, f64), warning_from_c: f64) -> Self {
        Self {
            safe_low_c: safe_range_c.0,
            warning_from_c,
            critical_above_c: safe_range_c.1,
        }
    }

    pub fn classify(&self, reading_c: f64) -> TemperatureClass {
        if reading_c < self.safe_low_c {
            TemperatureClass::Critical
        } else if reading_c < self.warning_from_c {
            TemperatureClass::Safe
        } else if reading_c <= self.critical_above_c {
            TemperatureClass::Warning
        } else {
            // Also reached by NaN
            TemperatureClass::Critical
        }
    }
}

/// Classify with the default thresholds
pub fn classify_temperature(reading_c: f64) -> TemperatureClass {
    TemperatureThresholds::default().classify(reading_c)
}

/// Dashboard alert for an out-of-band reading, if any
pub fn temperature_alert(
    location: &str,
    reading_c: f64,
    class: TemperatureClass,
    now: DateTime<Utc>,
) -> Option<AlertRecord> {
    let (severity, description) = match class {
        TemperatureClass::Safe => return None,
        TemperatureClass::Warning => (
            Severity::Warning,
            format!("Suhu cargo {:.1}°C mendekati batas aman.", reading_c),
        ),
        TemperatureClass::Critical => (
            Severity::Danger,
            format!("Suhu cargo {:.1}°C di luar rentang aman.", reading_c),
        ),
    };
    Some(AlertRecord::new(location, description, severity).raised_at(now))
}
