//! File-based alert repository implementation

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use mbg_domain::repository::AlertRepository;
use mbg_types::{AlertRecord, Error, Result};

use super::newest_first;

/// File-based implementation of AlertRepository
///
/// Stores alerts in a JSON file on disk, in insertion order.
pub struct FileAlertRepository {
    store_path: PathBuf,
    alerts: RefCell<Vec<AlertRecord>>,
}

impl FileAlertRepository {
    /// Create or load an alert repository
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("alerts.json");

        let alerts = if store_path.exists() {
            let file = File::open(&store_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader)?
        } else {
            Vec::new()
        };

        Ok(Self {
            store_path,
            alerts: RefCell::new(alerts),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Save store to disk
    fn persist(&self) -> Result<()> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &*self.alerts.borrow())?;
        Ok(())
    }

    /// Append several alerts with a single write, returning how many were added
    pub fn add_all(&self, alerts: &[AlertRecord]) -> Result<usize> {
        if alerts.is_empty() {
            return Ok(0);
        }
        self.alerts.borrow_mut().extend_from_slice(alerts);
        self.persist()?;
        Ok(alerts.len())
    }

    pub fn count(&self) -> usize {
        self.alerts.borrow().len()
    }

    /// Remove every stored alert
    pub fn clear(&self) -> Result<()> {
        self.alerts.borrow_mut().clear();
        self.persist()
    }
}

impl AlertRepository for FileAlertRepository {
    fn save(&self, alert: &AlertRecord) -> std::result::Result<(), Error> {
        self.alerts.borrow_mut().push(alert.clone());
        self.persist()
    }

    fn find_recent(&self, limit: usize) -> std::result::Result<Vec<AlertRecord>, Error> {
        let alerts = self.alerts.borrow().clone();
        Ok(newest_first(alerts.into_iter(), limit))
    }
}
