//! Temperature alert detection for tracked runs

use mbg_domain::model::{TelemetrySnapshot, TemperatureClass};
use mbg_domain::repository::AlertRepository;
use mbg_domain::service::temperature_alert;
use mbg_types::{AlertRecord, Result};
use tracing::info;

/// Raises an alert when a run's temperature class changes into Warning or Critical.
///
/// Staying in the same class raises nothing, so a long excursion produces
/// one alert, not one per tick.
#[derive(Debug, Clone)]
pub struct AlertMonitor {
    location: String,
    last: Option<TemperatureClass>,
}

impl AlertMonitor {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            last: None,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn observe(&mut self, snapshot: &TelemetrySnapshot) -> Option<AlertRecord> {
        let alert = self.pending(snapshot);
        self.last = Some(snapshot.temperature_classification);
        alert
    }

    /// Alert this snapshot would raise, without updating the monitor
    fn pending(&self, snapshot: &TelemetrySnapshot) -> Option<AlertRecord> {
        let class = snapshot.temperature_classification;
        if self.last == Some(class) {
            return None;
        }
        temperature_alert(
            &self.location,
            snapshot.cargo_temperature_c,
            class,
            snapshot.last_updated_at,
        )
    }

    /// Observe and save any alert raised. Returns whether one was saved.
    ///
    /// The class is only committed once the save succeeds, so a failed write
    /// is retried on the next snapshot.
    pub fn record(
        &mut self,
        snapshot: &TelemetrySnapshot,
        store: &dyn AlertRepository,
    ) -> Result<bool> {
        let Some(alert) = self.pending(snapshot) else {
            self.last = Some(snapshot.temperature_classification);
            return Ok(false);
        };

        store.save(&alert)?;
        self.last = Some(snapshot.temperature_classification);
        info!(
            run_id = %snapshot.run_id,
            location = %self.location,
            severity = %alert.severity,
            "temperature alert raised"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mbg_domain::model::{GeoPoint, RunState};
    use mbg_types::{Error, Severity};
    use std::cell::{Cell, RefCell};

    fn snapshot(temp: f64, class: TemperatureClass) -> TelemetrySnapshot {
        let point = GeoPoint::new(-7.28325, 112.79361).unwrap();
        TelemetrySnapshot {
            run_id: "run-1".to_string(),
            position: point,
            destination: point,
            eta_minutes: 4,
            cargo_temperature_c: temp,
            temperature_classification: class,
            state: RunState::EnRoute,
            last_updated_at: Utc.with_ymd_and_hms(2026, 3, 2, 7, 30, 0).unwrap(),
        }
    }

    #[derive(Default)]
    struct MemoryAlerts(RefCell<Vec<AlertRecord>>);

    impl AlertRepository for MemoryAlerts {
        fn save(&self, alert: &AlertRecord) -> std::result::Result<(), Error> {
            self.0.borrow_mut().push(alert.clone());
            Ok(())
        }
        fn find_recent(&self, limit: usize) -> std::result::Result<Vec<AlertRecord>, Error> {
            Ok(self.0.borrow().iter().rev().take(limit).cloned().collect())
        }
    }

    #[test]
    fn test_safe_readings_raise_nothing() {
        let mut monitor = AlertMonitor::new("Armada #042");
        assert!(monitor.observe(&snapshot(68.5, TemperatureClass::Safe)).is_none());
        assert!(monitor.observe(&snapshot(68.7, TemperatureClass::Safe)).is_none());
    }

    #[test]
    fn test_transition_raises_once() {
        let mut monitor = AlertMonitor::new("Armada #042");
        monitor.observe(&snapshot(69.9, TemperatureClass::Safe));

        let alert = monitor.observe(&snapshot(70.1, TemperatureClass::Warning)).unwrap();
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.location, "Armada #042");
        assert!(alert.raised_at.is_some());

        assert!(monitor.observe(&snapshot(70.3, TemperatureClass::Warning)).is_none());

        let critical = monitor.observe(&snapshot(75.2, TemperatureClass::Critical)).unwrap();
        assert_eq!(critical.severity, Severity::Danger);
    }

    #[test]
    fn test_first_reading_in_excursion_raises() {
        let mut monitor = AlertMonitor::new("SPPG Kediri #11");
        assert!(monitor.observe(&snapshot(58.0, TemperatureClass::Critical)).is_some());
    }

    #[test]
    fn test_record_saves_to_store() {
        let store = MemoryAlerts::default();
        let mut monitor = AlertMonitor::new("Armada #042");

        assert!(!monitor.record(&snapshot(68.5, TemperatureClass::Safe), &store).unwrap());
        assert!(monitor.record(&snapshot(72.0, TemperatureClass::Warning), &store).unwrap());
        // Back to safe and into warning again counts as a new excursion.
        assert!(!monitor.record(&snapshot(69.0, TemperatureClass::Safe), &store).unwrap());
        assert!(monitor.record(&snapshot(71.0, TemperatureClass::Warning), &store).unwrap());

        assert_eq!(store.find_recent(10).unwrap().len(), 2);
    }

    struct FlakyAlerts {
        failing: Cell<bool>,
        inner: MemoryAlerts,
    }

    impl AlertRepository for FlakyAlerts {
        fn save(&self, alert: &AlertRecord) -> std::result::Result<(), Error> {
            if self.failing.get() {
                return Err(Error::DataSource("disk full".to_string()));
            }
            self.inner.save(alert)
        }
        fn find_recent(&self, limit: usize) -> std::result::Result<Vec<AlertRecord>, Error> {
            self.inner.find_recent(limit)
        }
    }

    #[test]
    fn test_failed_save_is_retried() {
        let store = FlakyAlerts {
            failing: Cell::new(true),
            inner: MemoryAlerts::default(),
        };
        let mut monitor = AlertMonitor::new("Armada #042");
        monitor.record(&snapshot(68.5, TemperatureClass::Safe), &store).unwrap();

        assert!(monitor.record(&snapshot(76.0, TemperatureClass::Critical), &store).is_err());

        store.failing.set(false);
        assert!(monitor.record(&snapshot(76.1, TemperatureClass::Critical), &store).unwrap());
        // Saved once; the excursion does not repeat.
        assert!(!monitor.record(&snapshot(76.2, TemperatureClass::Critical), &store).unwrap());

        let saved = store.find_recent(10).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].severity, Severity::Danger);
    }
}
