//! Domain layer: geo math, telemetry state, the fleet simulation engine,
//! and repository traits for dashboard data.

pub mod model;
pub mod repository;
pub mod service;

pub use model::*;
pub use repository::{AlertRepository, DashboardRepository};
