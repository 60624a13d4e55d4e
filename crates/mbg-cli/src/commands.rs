//! Command handlers

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use mbg_app::config::{Config, SimulationSettings};
use mbg_app::dashboard::{load_dashboard, merge_tracked_alerts, DashboardData};
use mbg_app::logging;
use mbg_app::monitor::AlertMonitor;
use mbg_app::replay::replay;
use mbg_app::repository::{open_alert_repo, open_dashboard_repo};
use mbg_app::tracker::{FleetTracker, RunOptions};
use mbg_domain::model::TelemetrySnapshot;
use mbg_domain::repository::AlertRepository;
use mbg_domain::service::{
    LogicalSchedule, RandomSource, SeededRandom, SimulationConfig, SimulationEngine,
};
use mbg_infra::alert_csv::load_alerts_from_csv;
use mbg_infra::FileAlertRepository;
use mbg_types::{DashboardTab, Error, OutputFormat, Result};
use tracing::{debug, info, warn};

use crate::cli::{Cli, Commands};
use crate::output::{
    output_alerts, output_dashboard, output_replay, output_run_summary, output_snapshot,
};

/// Seed used by `replay` when neither the flag nor the config sets one
const DEFAULT_REPLAY_SEED: u64 = 42;

/// Logical time covered by the distribution tab preview
const DISTRIBUTION_PREVIEW_MS: u64 = 60_000;

/// Alerts shown on the dashboard
const DASHBOARD_ALERT_LIMIT: usize = 5;

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let config = Config::load()?;
    logging::init(cli.verbose, &config.log_filter);

    let output_format = cli.format.unwrap_or(config.output_format);

    match &cli.command {
        Commands::Simulate {
            seed,
            duration,
            scenario,
            stop_on_arrival,
            location,
        } => {
            let settings = scenario_or_config(&config, scenario.as_ref())?;
            let run = LiveRun {
                simulation: settings.simulation_config(),
                location: location.clone().unwrap_or_else(|| settings.fleet_label.clone()),
                // CLI seed wins over config seed
                seed: seed.or(config.seed),
                duration: duration.map(Duration::from_secs),
                stop_on_arrival: *stop_on_arrival,
            };
            cmd_simulate(&config, run, output_format)
        }

        Commands::Replay { seed, ticks, scenario } => {
            let settings = scenario_or_config(&config, scenario.as_ref())?;
            let seed = seed.or(config.seed).unwrap_or(DEFAULT_REPLAY_SEED);
            cmd_replay(settings.simulation_config(), seed, *ticks, output_format)
        }

        Commands::Dashboard { tab } => cmd_dashboard(&config, *tab, output_format),

        Commands::Alerts { limit, import } => {
            cmd_alerts(&config, *limit, import.clone(), output_format)
        }

        Commands::Config {
            show,
            set_output,
            set_seed,
            clear_seed,
            set_data_dir,
            set_log_filter,
            reset,
        } => cmd_config(ConfigChanges {
            show: *show,
            set_output: *set_output,
            set_seed: *set_seed,
            clear_seed: *clear_seed,
            set_data_dir: set_data_dir.clone(),
            set_log_filter: set_log_filter.clone(),
            reset: *reset,
        }),
    }
}

fn scenario_or_config(config: &Config, scenario: Option<&PathBuf>) -> Result<SimulationSettings> {
    match scenario {
        Some(path) => {
            debug!(path = %path.display(), "loading scenario");
            Config::load_scenario(path)
        }
        None => Ok(config.simulation.clone()),
    }
}

fn random_source(seed: Option<u64>) -> SeededRandom {
    match seed {
        Some(seed) => SeededRandom::from_seed(seed),
        None => SeededRandom::from_entropy(),
    }
}

struct LiveRun {
    simulation: SimulationConfig,
    location: String,
    seed: Option<u64>,
    duration: Option<Duration>,
    stop_on_arrival: bool,
}

fn cmd_simulate(config: &Config, run: LiveRun, output_format: OutputFormat) -> Result<()> {
    let alerts = open_alert_repo(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive_live_run(run, &alerts, output_format))
}

async fn drive_live_run(
    run: LiveRun,
    alerts: &FileAlertRepository,
    output_format: OutputFormat,
) -> Result<()> {
    let mut tracker = FleetTracker::new();
    let options = RunOptions {
        stop_on_arrival: run.stop_on_arrival,
    };
    let run_id = tracker.start_run(run.simulation, random_source(run.seed), options)?;
    let mut updates = tracker.subscribe(&run_id)?;
    let mut monitor = AlertMonitor::new(run.location);
    let mut raised = 0;

    let initial = updates.borrow_and_update().clone();
    raised += publish(&initial, &mut monitor, alerts, output_format)?;

    let deadline = async {
        match run.duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    debug!(run_id = %run_id, "run finished");
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                raised += publish(&snapshot, &mut monitor, alerts, output_format)?;
            }
            _ = &mut deadline => {
                info!(run_id = %run_id, "duration elapsed");
                break;
            }
            _ = &mut interrupted => {
                info!(run_id = %run_id, "interrupted");
                break;
            }
        }
    }

    let last = tracker.cancel(&run_id).await?;
    output_run_summary(output_format, &last, raised)
}

/// Render a snapshot and store any alert it raises; returns alerts saved
fn publish(
    snapshot: &TelemetrySnapshot,
    monitor: &mut AlertMonitor,
    alerts: &dyn AlertRepository,
    output_format: OutputFormat,
) -> Result<usize> {
    output_snapshot(output_format, snapshot)?;
    match monitor.record(snapshot, alerts) {
        Ok(saved) => Ok(usize::from(saved)),
        Err(e) => {
            // A full disk should not end the run.
            warn!(error = %e, "could not save alert");
            Ok(0)
        }
    }
}

fn replay_run<R: RandomSource>(
    simulation: SimulationConfig,
    rng: R,
    max_ticks: usize,
    horizon_ms: Option<u64>,
) -> Result<Vec<TelemetrySnapshot>> {
    let origin = Utc::now();
    let mut schedule = LogicalSchedule::new(
        origin,
        u64::try_from(simulation.position_tick_ms).unwrap_or(0),
        u64::try_from(simulation.status_tick_ms).unwrap_or(0),
    );
    if let Some(horizon) = horizon_ms {
        schedule = schedule.with_horizon(horizon);
    }
    // Validation rejects non-positive periods before any tick is drawn.
    let mut engine = SimulationEngine::new("replay", simulation, rng, origin)?;
    let snapshots = replay(&mut engine, &mut schedule, max_ticks)?;
    engine.stop();
    Ok(snapshots)
}

fn cmd_replay(
    simulation: SimulationConfig,
    seed: u64,
    ticks: usize,
    output_format: OutputFormat,
) -> Result<()> {
    if ticks == 0 {
        return Err(Error::InvalidInput("--ticks must be at least 1".to_string()));
    }
    let snapshots = replay_run(simulation, SeededRandom::from_seed(seed), ticks, None)?;
    output_replay(output_format, &snapshots)
}

fn dashboard_data(config: &Config) -> Result<DashboardData> {
    let repo = open_dashboard_repo(config)?;
    let mut data = load_dashboard(&repo, DASHBOARD_ALERT_LIMIT);
    match open_alert_repo(config) {
        Ok(tracked) => merge_tracked_alerts(&mut data, &tracked, DASHBOARD_ALERT_LIMIT),
        Err(e) => warn!(error = %e, "tracked alerts unavailable"),
    }
    Ok(data)
}

fn cmd_dashboard(config: &Config, tab: DashboardTab, output_format: OutputFormat) -> Result<()> {
    let data = dashboard_data(config)?;

    let tracking = match tab {
        DashboardTab::Distribution => distribution_preview(config),
        DashboardTab::Overview
        | DashboardTab::Workflow
        | DashboardTab::Budget
        | DashboardTab::Verification
        | DashboardTab::Suppliers => None,
    };

    output_dashboard(output_format, tab, &data, tracking.as_ref())
}

/// Vehicle shown on the distribution tab, one minute into a replayed run
///
/// A broken simulation config falls back to the demo route instead of
/// failing the whole dashboard.
fn distribution_preview(config: &Config) -> Option<TelemetrySnapshot> {
    let preview = |simulation: SimulationConfig| {
        replay_run(
            simulation,
            random_source(config.seed),
            usize::MAX,
            Some(DISTRIBUTION_PREVIEW_MS),
        )
        .map(|snapshots| snapshots.last().cloned())
    };

    match preview(config.simulation_config()) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "simulation config rejected; showing demo route");
            match preview(SimulationConfig::default()) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(error = %e, "demo route unavailable");
                    None
                }
            }
        }
    }
}

fn cmd_alerts(
    config: &Config,
    limit: usize,
    import: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let repo = open_alert_repo(config)?;

    if let Some(path) = import {
        let now = Utc::now();
        let mut imported = load_alerts_from_csv(&path).map_err(Error::DataSource)?;
        for alert in imported.iter_mut() {
            alert.raised_at.get_or_insert(now);
        }
        let added = repo.add_all(&imported)?;
        info!(path = %path.display(), added, "alerts imported");
        if output_format == OutputFormat::Table {
            println!("Imported {} alerts from {}", added, path.display());
        }
    }

    let recent = repo.find_recent(limit)?;
    output_alerts(output_format, &recent)
}

struct ConfigChanges {
    show: bool,
    set_output: Option<OutputFormat>,
    set_seed: Option<u64>,
    clear_seed: bool,
    set_data_dir: Option<PathBuf>,
    set_log_filter: Option<String>,
    reset: bool,
}

fn cmd_config(changes: ConfigChanges) -> Result<()> {
    if changes.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let modified = apply_config_changes(&mut config, &changes)?;

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if changes.show || !modified {
        println!("{}", config);
    }

    Ok(())
}

fn apply_config_changes(config: &mut Config, changes: &ConfigChanges) -> Result<bool> {
    let mut modified = false;

    if let Some(output_format) = changes.set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(seed) = changes.set_seed {
        config.seed = Some(seed);
        modified = true;
    }

    if changes.clear_seed {
        config.seed = None;
        modified = true;
    }

    if let Some(ref dir) = changes.set_data_dir {
        config.data_dir = Some(dir.clone());
        modified = true;
    }

    if let Some(ref filter) = changes.set_log_filter {
        if !logging::is_valid_directive(filter) {
            return Err(Error::InvalidInput(format!("invalid log filter: {:?}", filter)));
        }
        config.log_filter = filter.clone();
        modified = true;
    }

    Ok(modified)
}
