//! Shared dashboard records and view selectors

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Alert severity as shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }

    /// Parse a severity tag, accepting the aliases used by field reports
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "warning" | "warn" => Some(Severity::Warning),
            "danger" | "critical" => Some(Severity::Danger),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Food safety alert raised at a kitchen, vehicle, or school
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Where the issue was observed (e.g., "SPPG Kediri #11")
    pub location: String,
    /// Human readable issue description
    #[serde(alias = "issue_description")]
    pub description: String,
    pub severity: Severity,
    /// When the alert was raised, if known
    #[serde(default)]
    pub raised_at: Option<DateTime<Utc>>,
}

impl AlertRecord {
    pub fn new(
        location: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            location: location.into(),
            description: description.into(),
            severity,
            raised_at: None,
        }
    }

    pub fn raised_at(mut self, at: DateTime<Utc>) -> Self {
        self.raised_at = Some(at);
        self
    }
}

/// Monthly program score row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramStat {
    pub month_name: String,
    pub compliance_score: f64,
    pub nutritious_score: f64,
}

/// One stage of the kitchen-to-school workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_name: String,
    pub status: String,
    pub unit_count: String,
    #[serde(default)]
    pub is_active: bool,
}

/// How command output is rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        })
    }
}

/// Dashboard view selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    #[default]
    Overview,
    Workflow,
    Distribution,
    Budget,
    Verification,
    Suppliers,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 6] = [
        DashboardTab::Overview,
        DashboardTab::Workflow,
        DashboardTab::Distribution,
        DashboardTab::Budget,
        DashboardTab::Verification,
        DashboardTab::Suppliers,
    ];

    /// Navigation label (Indonesian, as shown in the sidebar)
    pub fn label(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "Ringkasan",
            DashboardTab::Workflow => "Workflow",
            DashboardTab::Distribution => "Distribusi",
            DashboardTab::Budget => "Anggaran",
            DashboardTab::Verification => "Verifikasi",
            DashboardTab::Suppliers => "Supplier",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "overview",
            DashboardTab::Workflow => "workflow",
            DashboardTab::Distribution => "distribution",
            DashboardTab::Budget => "budget",
            DashboardTab::Verification => "verification",
            DashboardTab::Suppliers => "suppliers",
        }
    }
}

impl std::fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(serde_json::to_string(&OutputFormat::Table).unwrap(), "\"table\"");
    }

    #[test]
    fn test_severity_parse_aliases() {
        assert_eq!(Severity::parse("danger"), Some(Severity::Danger));
        assert_eq!(Severity::parse(" Critical "), Some(Severity::Danger));
        assert_eq!(Severity::parse("WARN"), Some(Severity::Warning));
        assert_eq!(Severity::parse("info"), None);
    }

    #[test]
    fn test_alert_accepts_issue_description_field() {
        let json =
            r#"{"location":"SPPG Surabaya #04","issue_description":"late","severity":"warning"}"#;
        let alert: AlertRecord = serde_json::from_str(json).unwrap();
        assert_eq!(alert.description, "late");
        assert_eq!(alert.severity, Severity::Warning);
        assert!(alert.raised_at.is_none());
    }

    #[test]
    fn test_tab_ids_are_unique() {
        let mut ids: Vec<_> = DashboardTab::ALL.iter().map(|t| t.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), DashboardTab::ALL.len());
    }
}
