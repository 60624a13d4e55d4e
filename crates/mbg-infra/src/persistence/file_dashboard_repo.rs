//! File-based dashboard repository implementation
//!
//! Reads a `dashboard.json` document shaped like the backend's row
//! collections. The file is read on every call, the way a backend query
//! would be issued per view.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mbg_domain::repository::DashboardRepository;
use mbg_types::{AlertRecord, Error, ProgramStat, Result, WorkflowStep};

use super::newest_first;

/// On-disk layout of `dashboard.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardDocument {
    #[serde(default)]
    pub program_stats: Vec<ProgramStat>,
    #[serde(default, alias = "operational_workflow")]
    pub workflow: Vec<WorkflowStep>,
    #[serde(default, alias = "food_safety_alerts")]
    pub alerts: Vec<AlertRecord>,
}

/// File-based implementation of DashboardRepository
pub struct FileDashboardRepository {
    path: PathBuf,
}

impl FileDashboardRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Repository over `<data_dir>/dashboard.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("dashboard.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<DashboardDocument> {
        if !self.path.exists() {
            return Err(Error::DataSource(format!(
                "dashboard data not found: {}",
                self.path.display()
            )));
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::DataSource(format!("{}: {}", self.path.display(), e)))
    }

    /// Write a document, creating parent directories as needed
    pub fn write(&self, document: &DashboardDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(document)?)?;
        Ok(())
    }
}

impl DashboardRepository for FileDashboardRepository {
    fn program_stats(&self) -> std::result::Result<Vec<ProgramStat>, Error> {
        Ok(self.load()?.program_stats)
    }

    fn workflow_steps(&self) -> std::result::Result<Vec<WorkflowStep>, Error> {
        Ok(self.load()?.workflow)
    }

    fn recent_alerts(&self, limit: usize) -> std::result::Result<Vec<AlertRecord>, Error> {
        Ok(newest_first(self.load()?.alerts.into_iter(), limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_data_source_error() {
        let dir = tempdir().unwrap();
        let repo = FileDashboardRepository::in_dir(dir.path());
        assert!(matches!(repo.program_stats(), Err(Error::DataSource(_))));
    }

    #[test]
    fn test_reads_backend_table_names() {
        let dir = tempdir().unwrap();
        let repo = FileDashboardRepository::in_dir(dir.path());
        fs::write(
            repo.path(),
            r#"{
                "program_stats": [
                    {"month_name": "Mei", "compliance_score": 93, "nutritious_score": 95}
                ],
                "operational_workflow": [
                    {"step_name": "QC Lab", "status": "Berjalan", "unit_count": "700 Unit",
                     "is_active": true}
                ],
                "food_safety_alerts": [
                    {"location": "SPPG Malang #02", "issue_description": "Genset mati.",
                     "severity": "danger", "raised_at": "2025-01-01T08:00:00Z"},
                    {"location": "SPPG Malang #03", "issue_description": "Air keruh.",
                     "severity": "warning", "raised_at": "2025-01-02T08:00:00Z"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(repo.program_stats().unwrap()[0].month_name, "Mei");
        assert!(repo.workflow_steps().unwrap()[0].is_active);
        let alerts = repo.recent_alerts(5).unwrap();
        assert_eq!(alerts[0].location, "SPPG Malang #03");
    }

    #[test]
    fn test_corrupt_file_is_data_source_error() {
        let dir = tempdir().unwrap();
        let repo = FileDashboardRepository::in_dir(dir.path());
        fs::write(repo.path(), "{ not json").unwrap();
        assert!(matches!(repo.workflow_steps(), Err(Error::DataSource(_))));
    }

    #[test]
    fn test_write_round_trip() {
        let dir = tempdir().unwrap();
        let repo = FileDashboardRepository::new(dir.path().join("nested").join("dashboard.json"));
        repo.write(&DashboardDocument {
            program_stats: crate::demo::demo_program_stats(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(repo.program_stats().unwrap().len(), 4);
        assert!(repo.workflow_steps().unwrap().is_empty());
    }
}
