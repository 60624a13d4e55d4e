//! Output formatting module

use mbg_app::dashboard::{DashboardData, DataOrigin};
use mbg_domain::model::{distance_meters, TelemetrySnapshot};
use mbg_types::{AlertRecord, DashboardTab, OutputFormat, ProgramStat, Result, WorkflowStep};
use serde_json::json;

/// One line per live update; JSON output is newline-delimited
pub fn output_snapshot(output_format: OutputFormat, snapshot: &TelemetrySnapshot) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string(snapshot)?);
    } else {
        println!("{}", snapshot_row(snapshot));
    }
    Ok(())
}

fn snapshot_row(snapshot: &TelemetrySnapshot) -> String {
    format!(
        "{}  {:<9} {}  {:>6.0} m  ETA {:>2} min  {:>5.1}°C {}",
        snapshot.last_updated_at.format("%H:%M:%S"),
        snapshot.state.label(),
        snapshot.position,
        distance_meters(snapshot.position, snapshot.destination),
        snapshot.eta_minutes,
        snapshot.cargo_temperature_c,
        snapshot.temperature_classification.label(),
    )
}

pub fn output_replay(output_format: OutputFormat, snapshots: &[TelemetrySnapshot]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(snapshots)?);
        return Ok(());
    }

    println!("\nReplay");
    println!("======");
    for snapshot in snapshots {
        println!("{}", snapshot_row(snapshot));
    }
    if let Some(last) = snapshots.last() {
        println!("\n{} snapshots, final state: {}", snapshots.len(), last.state.label());
    } else {
        println!("No ticks applied");
    }
    Ok(())
}

/// Summary printed when a live run ends
pub fn output_run_summary(
    output_format: OutputFormat,
    last: &TelemetrySnapshot,
    alerts_raised: usize,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return Ok(());
    }
    println!("\nRun {}", last.run_id);
    println!("State:           {}", last.state.label());
    println!(
        "Distance left:   {:.0} m",
        distance_meters(last.position, last.destination)
    );
    println!("ETA:             {} min", last.eta_minutes);
    println!(
        "Cargo temp:      {:.1}°C ({})",
        last.cargo_temperature_c,
        last.temperature_classification.label()
    );
    println!("Alerts raised:   {}", alerts_raised);
    Ok(())
}

pub fn output_alerts(output_format: OutputFormat, alerts: &[AlertRecord]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(alerts)?);
        return Ok(());
    }
    if alerts.is_empty() {
        println!("No alerts recorded");
        return Ok(());
    }
    print_alert_table(alerts);
    Ok(())
}

fn print_alert_table(alerts: &[AlertRecord]) {
    println!("{:<20} {:<8} {:<17} Description", "Location", "Level", "Raised");
    println!("{}", "-".repeat(80));
    for alert in alerts {
        let raised = alert
            .raised_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:<8} {:<17} {}",
            alert.location,
            alert.severity.label(),
            raised,
            alert.description
        );
    }
}

fn origin_note(origin: DataOrigin) -> &'static str {
    match origin {
        DataOrigin::Backend => "",
        DataOrigin::Demo => " (demo)",
    }
}

fn print_stats(stats: &[ProgramStat], origin: DataOrigin) {
    println!("\nSkor Program{}", origin_note(origin));
    println!("{:<10} {:>10} {:>10}", "Bulan", "Kepatuhan", "Gizi");
    for stat in stats {
        println!(
            "{:<10} {:>10.1} {:>10.1}",
            stat.month_name, stat.compliance_score, stat.nutritious_score
        );
    }
}

fn print_workflow(steps: &[WorkflowStep], origin: DataOrigin) {
    println!("\nAlur Operasional{}", origin_note(origin));
    for step in steps {
        let marker = if step.is_active { ">" } else { " " };
        println!(
            "{} {:<12} {:<14} {}",
            marker, step.step_name, step.status, step.unit_count
        );
    }
}

/// Render one dashboard tab
///
/// `tracking` is the vehicle snapshot shown on the distribution tab.
pub fn output_dashboard(
    output_format: OutputFormat,
    tab: DashboardTab,
    data: &DashboardData,
    tracking: Option<&TelemetrySnapshot>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        let body = match tab {
            DashboardTab::Overview => json!({
                "stats": data.stats,
                "alerts": data.alerts,
                "statsOrigin": data.stats_origin,
                "alertsOrigin": data.alerts_origin,
            }),
            DashboardTab::Workflow => json!({
                "workflow": data.workflow,
                "workflowOrigin": data.workflow_origin,
            }),
            DashboardTab::Distribution => json!({ "tracking": tracking }),
            DashboardTab::Budget | DashboardTab::Verification | DashboardTab::Suppliers => {
                json!({ "status": "syncing" })
            }
        };
        let view = json!({ "tab": tab.id(), "label": tab.label(), "data": body });
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("\n{}", tab.label());
    println!("{}", "=".repeat(tab.label().chars().count()));

    match tab {
        DashboardTab::Overview => {
            print_stats(&data.stats, data.stats_origin);
            println!("\nPeringatan Keamanan Pangan{}", origin_note(data.alerts_origin));
            print_alert_table(&data.alerts);
        }
        DashboardTab::Workflow => print_workflow(&data.workflow, data.workflow_origin),
        DashboardTab::Distribution => match tracking {
            Some(snapshot) => {
                println!("Armada:          {}", snapshot.run_id);
                println!("Status:          {}", snapshot.state.label());
                println!("Posisi:          {}", snapshot.position);
                println!("Tujuan:          {}", snapshot.destination);
                println!(
                    "Jarak:           {:.0} m",
                    distance_meters(snapshot.position, snapshot.destination)
                );
                println!("ETA:             {} menit", snapshot.eta_minutes);
                println!(
                    "Suhu kargo:      {:.1}°C ({})",
                    snapshot.cargo_temperature_c,
                    snapshot.temperature_classification.label()
                );
            }
            None => println!("Tidak ada armada yang dilacak"),
        },
        DashboardTab::Budget | DashboardTab::Verification | DashboardTab::Suppliers => {
            println!("Modul {} sedang dalam sinkronisasi data...", tab.label());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mbg_domain::model::{GeoPoint, RunState, TemperatureClass};

    #[test]
    fn test_snapshot_row_shows_state_and_class() {
        let snapshot = TelemetrySnapshot {
            run_id: "run-1".to_string(),
            position: GeoPoint::new(-7.28825, 112.78861).unwrap(),
            destination: GeoPoint::new(-7.28325, 112.79361).unwrap(),
            eta_minutes: 12,
            cargo_temperature_c: 68.5,
            temperature_classification: TemperatureClass::Safe,
            state: RunState::EnRoute,
            last_updated_at: Utc.with_ymd_and_hms(2026, 3, 2, 7, 30, 5).unwrap(),
        };

        let row = snapshot_row(&snapshot);
        assert!(row.starts_with("07:30:05"));
        assert!(row.contains(RunState::EnRoute.label()));
        assert!(row.contains("68.5°C"));
        assert!(row.contains("ETA 12 min"));
    }
}
