//! Application service layer - config, logging, run tracking, dashboard data

pub mod config;
pub mod dashboard;
pub mod logging;
pub mod monitor;
pub mod replay;
pub mod repository;
pub mod tracker;
