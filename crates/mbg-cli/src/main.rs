//! MBG Fleet Tracker - school meal distribution telemetry simulator
//!
//! Simulates a delivery vehicle's route and cargo temperature, records food
//! safety alerts and renders the command-center dashboard views.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
