//! Infrastructure layer
//!
//! Concrete implementations of the domain repository traits: file-backed
//! stores, built-in demo data, and CSV import.

pub mod alert_csv;
pub mod demo;
pub mod persistence;

pub use demo::DemoDashboardRepository;
pub use persistence::{FileAlertRepository, FileDashboardRepository};
