//! Repository adapters for persistence layer

use std::path::PathBuf;

use mbg_infra::{FileAlertRepository, FileDashboardRepository};
use mbg_types::Result;

use crate::config::Config;

/// Open file-based alert repository
pub fn open_alert_repo(config: &Config) -> Result<FileAlertRepository> {
    FileAlertRepository::open(config.data_dir()?)
}

/// Open file-based alert repository at a custom directory
pub fn open_alert_repo_at(data_dir: PathBuf) -> Result<FileAlertRepository> {
    FileAlertRepository::open(data_dir)
}

/// Open dashboard data repository (dashboard.json in the data dir)
pub fn open_dashboard_repo(config: &Config) -> Result<FileDashboardRepository> {
    Ok(FileDashboardRepository::in_dir(&config.data_dir()?))
}
