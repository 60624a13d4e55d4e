//! Deterministic replay of a run against a tick source

use mbg_domain::model::{RunState, TelemetrySnapshot};
use mbg_domain::service::{RandomSource, SimulationEngine, TickKind, TickSource};
use mbg_types::Result;
use tracing::debug;

/// Drive `engine` from `source` for at most `max_ticks` ticks.
///
/// Returns one snapshot per tick that changed something. Position ticks after
/// arrival are skipped, and replay ends at the first status tick reported
/// after arrival.
pub fn replay<R: RandomSource>(
    engine: &mut SimulationEngine<R>,
    source: &mut dyn TickSource,
    max_ticks: usize,
) -> Result<Vec<TelemetrySnapshot>> {
    let mut snapshots = Vec::new();
    let mut consumed = 0;

    while consumed < max_ticks {
        let Some(tick) = source.next_tick() else {
            break;
        };
        consumed += 1;

        let was_arrived = engine.state() == RunState::Arrived;
        let snapshot = engine.apply(tick)?;

        if was_arrived {
            if tick.kind == TickKind::Status {
                snapshots.push(snapshot);
                break;
            }
            continue;
        }
        snapshots.push(snapshot);
    }

    debug!(
        run_id = %engine.run_id(),
        ticks = consumed,
        snapshots = snapshots.len(),
        state = %engine.state(),
        "replay finished"
    );
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mbg_domain::model::GeoPoint;
    use mbg_domain::service::{
        LogicalSchedule, ScriptedRandom, ScriptedTicks, SeededRandom, SimulationConfig, Tick,
    };
    use mbg_types::{Error, SimulationError};

    fn origin() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap()
    }

    fn engine(config: SimulationConfig) -> SimulationEngine<ScriptedRandom> {
        let rng = ScriptedRandom::constant(0.9);
        SimulationEngine::new("replay-run", config, rng, origin()).unwrap()
    }

    #[test]
    fn test_replay_reaches_arrival_and_stops() {
        let config = SimulationConfig::default();
        let mut engine = engine(config.clone());
        let mut schedule = LogicalSchedule::new(
            origin(),
            config.position_tick_ms as u64,
            config.status_tick_ms as u64,
        );

        let snapshots = replay(&mut engine, &mut schedule, 10_000).unwrap();

        let last = snapshots.last().unwrap();
        assert_eq!(last.state, RunState::Arrived);
        assert_eq!(last.eta_minutes, 0);
        assert!(snapshots.len() < 10_000);

        // The arrival itself plus one status tick after it.
        let arrived: Vec<_> = snapshots.iter().filter(|s| s.is_arrived()).collect();
        assert_eq!(arrived.len(), 2);
        let elapsed_ms = (last.last_updated_at - origin()).num_milliseconds();
        assert_eq!(elapsed_ms % config.status_tick_ms, 0);
    }

    #[test]
    fn test_replay_respects_tick_limit() {
        let config = SimulationConfig::default();
        let mut engine = engine(config);
        let mut schedule = LogicalSchedule::new(origin(), 2000, 5000);

        let snapshots = replay(&mut engine, &mut schedule, 3).unwrap();

        // Ticks at 2s and 4s are position, 5s is status.
        assert_eq!(snapshots.len(), 3);
        assert_eq!(engine.state(), RunState::EnRoute);
        assert!(snapshots[0].last_updated_at < snapshots[2].last_updated_at);
    }

    #[test]
    fn test_replay_is_deterministic_for_a_seed() {
        let config = SimulationConfig::default();
        let run = |seed| {
            let rng = SeededRandom::from_seed(seed);
            let mut engine =
                SimulationEngine::new("seeded", config.clone(), rng, origin()).unwrap();
            let mut schedule = LogicalSchedule::new(origin(), 2000, 5000).with_horizon(60_000);
            replay(&mut engine, &mut schedule, 1000).unwrap()
        };

        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_replay_from_destination_ends_on_first_status_tick() {
        let point = GeoPoint::new(-7.28325, 112.79361).unwrap();
        let config = SimulationConfig {
            start_point: point,
            destination: point,
            ..SimulationConfig::default()
        };
        let mut engine = engine(config);
        let mut ticks = ScriptedTicks::new([
            Tick::position(origin()),
            Tick::position(origin()),
            Tick::status(origin()),
            Tick::status(origin()),
        ]);

        let snapshots = replay(&mut engine, &mut ticks, 10).unwrap();

        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].is_arrived());
    }

    #[test]
    fn test_replay_on_stopped_engine_fails() {
        let mut engine = engine(SimulationConfig::default());
        engine.stop();
        let mut ticks = ScriptedTicks::new([Tick::position(origin())]);

        let err = replay(&mut engine, &mut ticks, 10).unwrap_err();
        assert!(matches!(err, Error::Simulation(SimulationError::EngineAlreadyStopped)));
    }

    #[test]
    fn test_replay_with_exhausted_source_is_empty() {
        let mut engine = engine(SimulationConfig::default());
        let mut ticks = ScriptedTicks::default();

        assert!(replay(&mut engine, &mut ticks, 10).unwrap().is_empty());
    }
}
