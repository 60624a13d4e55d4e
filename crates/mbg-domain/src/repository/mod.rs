//! Repository trait definitions for dashboard data

use mbg_types::Error;
use mbg_types::{AlertRecord, ProgramStat, WorkflowStep};

/// Read API over the dashboard's row store
pub trait DashboardRepository {
    /// Monthly program scores, oldest first
    fn program_stats(&self) -> Result<Vec<ProgramStat>, Error>;

    /// Workflow stages in kitchen-to-school order
    fn workflow_steps(&self) -> Result<Vec<WorkflowStep>, Error>;

    /// Most recent food safety alerts, newest first
    fn recent_alerts(&self, limit: usize) -> Result<Vec<AlertRecord>, Error>;
}

/// Store for alerts raised while runs are tracked
pub trait AlertRepository {
    /// Save an alert
    fn save(&self, alert: &AlertRecord) -> Result<(), Error>;

    /// Most recent alerts, newest first
    fn find_recent(&self, limit: usize) -> Result<Vec<AlertRecord>, Error>;
}
