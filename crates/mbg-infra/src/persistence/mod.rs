//! Persistence implementations
//!
//! This module provides file-based implementations of the repository traits.

mod file_alert_repo;
mod file_dashboard_repo;

pub use file_alert_repo::FileAlertRepository;
pub use file_dashboard_repo::{DashboardDocument, FileDashboardRepository};

use mbg_types::AlertRecord;

/// Newest first; alerts without a timestamp sort last, in reverse insertion order
pub(crate) fn newest_first(
    alerts: impl DoubleEndedIterator<Item = AlertRecord>,
    limit: usize,
) -> Vec<AlertRecord> {
    let mut alerts: Vec<_> = alerts.rev().collect();
    alerts.sort_by(|a, b| b.raised_at.cmp(&a.raised_at));
    alerts.truncate(limit);
    alerts
}
