//! CLI definition using clap

use clap::{Parser, Subcommand};
use mbg_types::{DashboardTab, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mbg-tracker")]
#[command(version)]
#[command(about = "Fleet telemetry simulator for the MBG command-center dashboard")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a live simulated delivery and stream its telemetry
    Simulate {
        /// Seed for the random source. Uses config value if not specified.
        #[arg(long, short = 's')]
        seed: Option<u64>,

        /// Stop after this many seconds
        #[arg(long, short = 'd')]
        duration: Option<u64>,

        /// TOML scenario file overriding the configured route and parameters
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// End the run when the vehicle arrives
        #[arg(long)]
        stop_on_arrival: bool,

        /// Location name used for raised alerts (e.g., "SPPG Surabaya #04")
        #[arg(long, short = 'l')]
        location: Option<String>,
    },

    /// Replay a run deterministically in logical time
    Replay {
        /// Seed for the random source. Uses config value if not specified.
        #[arg(long, short = 's')]
        seed: Option<u64>,

        /// Maximum number of ticks to apply
        #[arg(long, short = 'n', default_value = "500")]
        ticks: usize,

        /// TOML scenario file overriding the configured route and parameters
        #[arg(long)]
        scenario: Option<PathBuf>,
    },

    /// Show a dashboard tab
    Dashboard {
        /// Tab to render
        #[arg(long, short = 't', value_enum, default_value_t = DashboardTab::Overview)]
        tab: DashboardTab,
    },

    /// List or import food safety alerts
    Alerts {
        /// Limit number of alerts shown
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,

        /// Import alerts from a CSV file (location, description, severity)
        #[arg(long)]
        import: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set default random seed
        #[arg(long, conflicts_with = "clear_seed")]
        set_seed: Option<u64>,

        /// Remove the default seed (runs become non-deterministic)
        #[arg(long)]
        clear_seed: bool,

        /// Set data directory for alerts and dashboard rows
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set default log filter (e.g., "info", "mbg_domain=debug")
        #[arg(long)]
        set_log_filter: Option<String>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}
