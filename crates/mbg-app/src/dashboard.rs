//! Dashboard data loading with demo-mode fallback
//!
//! Every collection is read independently. A failed or empty read is logged
//! and replaced with the built-in demo rows, so the dashboard always renders.

use mbg_domain::repository::{AlertRepository, DashboardRepository};
use mbg_infra::demo::{demo_alerts, demo_program_stats, demo_workflow_steps};
use mbg_types::{AlertRecord, Error, ProgramStat, WorkflowStep};
use serde::Serialize;
use tracing::{debug, warn};

/// Where a collection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Backend,
    Demo,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub stats: Vec<ProgramStat>,
    pub workflow: Vec<WorkflowStep>,
    pub alerts: Vec<AlertRecord>,
    pub stats_origin: DataOrigin,
    pub workflow_origin: DataOrigin,
    pub alerts_origin: DataOrigin,
}

impl DashboardData {
    /// True when every collection came from demo data
    pub fn is_demo(&self) -> bool {
        [self.stats_origin, self.workflow_origin, self.alerts_origin]
            .iter()
            .all(|o| *o == DataOrigin::Demo)
    }
}

fn or_demo<T>(
    collection: &str,
    read: Result<Vec<T>, Error>,
    demo: impl FnOnce() -> Vec<T>,
) -> (Vec<T>, DataOrigin) {
    match read {
        Ok(rows) if !rows.is_empty() => {
            debug!(collection, rows = rows.len(), "loaded dashboard rows");
            (rows, DataOrigin::Backend)
        }
        Ok(_) => {
            debug!(collection, "no rows from data source; using demo data");
            (demo(), DataOrigin::Demo)
        }
        Err(e) => {
            warn!(collection, error = %e, "data source read failed; falling back to demo data");
            (demo(), DataOrigin::Demo)
        }
    }
}

/// Load all dashboard collections
pub fn load_dashboard(repo: &dyn DashboardRepository, alert_limit: usize) -> DashboardData {
    let (stats, stats_origin) = or_demo("program_stats", repo.program_stats(), demo_program_stats);
    let (workflow, workflow_origin) =
        or_demo("workflow", repo.workflow_steps(), demo_workflow_steps);
    let (mut alerts, alerts_origin) =
        or_demo("alerts", repo.recent_alerts(alert_limit), demo_alerts);
    alerts.truncate(alert_limit);

    DashboardData {
        stats,
        workflow,
        alerts,
        stats_origin,
        workflow_origin,
        alerts_origin,
    }
}

/// Merge alerts raised by tracked runs ahead of the dashboard's own list
pub fn merge_tracked_alerts(
    data: &mut DashboardData,
    tracked: &dyn AlertRepository,
    alert_limit: usize,
) {
    match tracked.find_recent(alert_limit) {
        Ok(mut recent) => {
            recent.append(&mut data.alerts);
            recent.truncate(alert_limit);
            data.alerts = recent;
        }
        Err(e) => warn!(error = %e, "could not read tracked alerts"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbg_infra::DemoDashboardRepository;
    use mbg_types::Severity;
    use std::cell::RefCell;

    struct FailingRepo;

    impl DashboardRepository for FailingRepo {
        fn program_stats(&self) -> Result<Vec<ProgramStat>, Error> {
            Err(Error::DataSource("connection refused".to_string()))
        }
        fn workflow_steps(&self) -> Result<Vec<WorkflowStep>, Error> {
            Err(Error::DataSource("connection refused".to_string()))
        }
        fn recent_alerts(&self, _limit: usize) -> Result<Vec<AlertRecord>, Error> {
            Err(Error::DataSource("connection refused".to_string()))
        }
    }

    struct PartialRepo;

    impl DashboardRepository for PartialRepo {
        fn program_stats(&self) -> Result<Vec<ProgramStat>, Error> {
            Ok(vec![ProgramStat {
                month_name: "Mei".to_string(),
                compliance_score: 93.0,
                nutritious_score: 95.0,
            }])
        }
        fn workflow_steps(&self) -> Result<Vec<WorkflowStep>, Error> {
            Ok(Vec::new())
        }
        fn recent_alerts(&self, _limit: usize) -> Result<Vec<AlertRecord>, Error> {
            Err(Error::DataSource("timeout".to_string()))
        }
    }

    struct MemoryAlerts(RefCell<Vec<AlertRecord>>);

    impl AlertRepository for MemoryAlerts {
        fn save(&self, alert: &AlertRecord) -> Result<(), Error> {
            self.0.borrow_mut().push(alert.clone());
            Ok(())
        }
        fn find_recent(&self, limit: usize) -> Result<Vec<AlertRecord>, Error> {
            Ok(self.0.borrow().iter().rev().take(limit).cloned().collect())
        }
    }

    #[test]
    fn test_failing_source_falls_back_to_demo() {
        let data = load_dashboard(&FailingRepo, 5);
        assert!(data.is_demo());
        assert_eq!(data.stats.len(), 4);
        assert_eq!(data.workflow.len(), 4);
        assert_eq!(data.alerts.len(), 2);
    }

    #[test]
    fn test_fallback_is_per_collection() {
        let data = load_dashboard(&PartialRepo, 5);
        assert_eq!(data.stats_origin, DataOrigin::Backend);
        assert_eq!(data.stats[0].month_name, "Mei");
        assert_eq!(data.workflow_origin, DataOrigin::Demo);
        assert_eq!(data.alerts_origin, DataOrigin::Demo);
        assert!(!data.is_demo());
    }

    #[test]
    fn test_alert_limit_applies_to_demo_rows() {
        let data = load_dashboard(&DemoDashboardRepository, 1);
        assert_eq!(data.alerts.len(), 1);
    }

    #[test]
    fn test_tracked_alerts_come_first() {
        let mut data = load_dashboard(&DemoDashboardRepository, 3);
        let tracked = MemoryAlerts(RefCell::new(Vec::new()));
        tracked
            .save(&AlertRecord::new("Armada #042", "Suhu cargo 76.0°C", Severity::Danger))
            .unwrap();

        merge_tracked_alerts(&mut data, &tracked, 3);
        assert_eq!(data.alerts.len(), 3);
        assert_eq!(data.alerts[0].location, "Armada #042");
    }
}
