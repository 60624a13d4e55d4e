//! Core types for fleet tracking and the dashboard

mod error;
mod types;

pub use error::*;
pub use types::*;
