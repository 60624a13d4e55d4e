//! Built-in demo data, used when no data backend is configured

use mbg_domain::repository::DashboardRepository;
use mbg_types::{AlertRecord, Error, ProgramStat, Severity, WorkflowStep};

pub fn demo_program_stats() -> Vec<ProgramStat> {
    [("Jan", 85.0, 90.0), ("Feb", 88.0, 92.0), ("Mar", 92.0, 89.0), ("Apr", 90.0, 94.0)]
        .into_iter()
        .map(|(month, compliance, nutritious)| ProgramStat {
            month_name: month.to_string(),
            compliance_score: compliance,
            nutritious_score: nutritious,
        })
        .collect()
}

pub fn demo_workflow_steps() -> Vec<WorkflowStep> {
    [
        ("Pemasakan", "Aktif", "512 Unit", true),
        ("QC Lab", "Berjalan", "714 Unit", true),
        ("Packaging", "Pending", "128 Unit", false),
        ("Distribusi", "Siaga", "1.2k Armada", false),
    ]
    .into_iter()
    .map(|(name, status, units, active)| WorkflowStep {
        step_name: name.to_string(),
        status: status.to_string(),
        unit_count: units.to_string(),
        is_active: active,
    })
    .collect()
}

pub fn demo_alerts() -> Vec<AlertRecord> {
    vec![
        AlertRecord::new(
            "SPPG Kediri #11",
            "Suhu pendingin bahan baku di atas 10°C.",
            Severity::Danger,
        ),
        AlertRecord::new(
            "SPPG Surabaya #04",
            "Keterlambatan pasokan sayur segar > 1 jam.",
            Severity::Warning,
        ),
    ]
}

/// Dashboard repository serving the demo data
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoDashboardRepository;

impl DashboardRepository for DemoDashboardRepository {
    fn program_stats(&self) -> Result<Vec<ProgramStat>, Error> {
        Ok(demo_program_stats())
    }

    fn workflow_steps(&self) -> Result<Vec<WorkflowStep>, Error> {
        Ok(demo_workflow_steps())
    }

    fn recent_alerts(&self, limit: usize) -> Result<Vec<AlertRecord>, Error> {
        Ok(demo_alerts().into_iter().take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_workflow_order() {
        let steps = demo_workflow_steps();
        let names: Vec<_> = steps.iter().map(|s| s.step_name.as_str()).collect();
        assert_eq!(names, ["Pemasakan", "QC Lab", "Packaging", "Distribusi"]);
        assert_eq!(steps.iter().filter(|s| s.is_active).count(), 2);
    }

    #[test]
    fn test_demo_alerts_respect_limit() {
        let repo = DemoDashboardRepository;
        assert_eq!(repo.recent_alerts(1).unwrap().len(), 1);
        assert_eq!(repo.recent_alerts(10).unwrap().len(), 2);
    }
}
