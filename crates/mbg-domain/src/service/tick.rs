//! Tick sources: the scheduler abstraction that drives a simulation engine.
//!
//! `LogicalSchedule` reproduces two independent fixed-period timers in
//! logical time, so an engine can be advanced deterministically without
//! waiting on real clocks.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Which half of the engine a tick advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickKind {
    /// Move the vehicle toward its destination
    Position,
    /// Update ETA and cargo temperature
    Status,
}

/// One scheduled advance at a point in (logical) time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub kind: TickKind,
    pub at: DateTime<Utc>,
}

impl Tick {
    pub fn position(at: DateTime<Utc>) -> Self {
        Self {
            kind: TickKind::Position,
            at,
        }
    }

    pub fn status(at: DateTime<Utc>) -> Self {
        Self {
            kind: TickKind::Status,
            at,
        }
    }
}

pub trait TickSource {
    /// Next tick, or `None` when the source is exhausted
    fn next_tick(&mut self) -> Option<Tick>;
}

/// Two fixed-period timers merged in time order
///
/// The first tick of each kind fires one full period after `origin`. On a
/// tie the position tick is emitted first.
#[derive(Debug, Clone)]
pub struct LogicalSchedule {
    origin: DateTime<Utc>,
    position_period_ms: u64,
    status_period_ms: u64,
    next_position_ms: u64,
    next_status_ms: u64,
    horizon_ms: Option<u64>,
}

impl LogicalSchedule {
    /// Periods must be non-zero; zero periods are treated as 1 ms.
    pub fn new(origin: DateTime<Utc>, position_period_ms: u64, status_period_ms: u64) -> Self {
        let position_period_ms = position_period_ms.max(1);
        let status_period_ms = status_period_ms.max(1);
        Self {
            origin,
            position_period_ms,
            status_period_ms,
            next_position_ms: position_period_ms,
            next_status_ms: status_period_ms,
            horizon_ms: None,
        }
    }

    /// Stop producing ticks after `horizon_ms` of logical time
    pub fn with_horizon(mut self, horizon_ms: u64) -> Self {
        self.horizon_ms = Some(horizon_ms);
        self
    }

    fn at(&self, offset_ms: u64) -> DateTime<Utc> {
        self.origin + Duration::milliseconds(offset_ms as i64)
    }
}

impl TickSource for LogicalSchedule {
    fn next_tick(&mut self) -> Option<Tick> {
        let (kind, offset) = if self.next_position_ms <= self.next_status_ms {
            (TickKind::Position, self.next_position_ms)
        } else {
            (TickKind::Status, self.next_status_ms)
        };

        if let Some(horizon) = self.horizon_ms {
            if offset > horizon {
                return None;
            }
        }

        match kind {
            TickKind::Position => self.next_position_ms += self.position_period_ms,
            TickKind::Status => self.next_status_ms += self.status_period_ms,
        }
        Some(Tick {
            kind,
            at: self.at(offset),
        })
    }
}

/// Replays a fixed list of ticks
#[derive(Debug, Clone, Default)]
pub struct ScriptedTicks {
    ticks: VecDeque<Tick>,
}

impl ScriptedTicks {
    pub fn new(ticks: impl IntoIterator<Item = Tick>) -> Self {
        Self {
            ticks: ticks.into_iter().collect(),
        }
    }
}

impl TickSource for ScriptedTicks {
    fn next_tick(&mut self) -> Option<Tick> {
        self.ticks.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn origin() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_default_periods_interleave() {
        let mut schedule = LogicalSchedule::new(origin(), 2000, 5000);
        let kinds: Vec<(TickKind, i64)> = (0..7)
            .map(|_| {
                let tick = schedule.next_tick().unwrap();
                (tick.kind, (tick.at - origin()).num_milliseconds())
            })
            .collect();

        assert_eq!(
            kinds,
            vec![
                (TickKind::Position, 2000),
                (TickKind::Position, 4000),
                (TickKind::Status, 5000),
                (TickKind::Position, 6000),
                (TickKind::Position, 8000),
                (TickKind::Position, 10000),
                (TickKind::Status, 10000),
            ]
        );
    }

    #[test]
    fn test_ticks_never_go_back_in_time() {
        let mut schedule = LogicalSchedule::new(origin(), 700, 1100);
        let mut last = origin();
        for _ in 0..200 {
            let tick = schedule.next_tick().unwrap();
            assert!(tick.at >= last);
            last = tick.at;
        }
    }

    #[test]
    fn test_horizon_ends_schedule() {
        let mut schedule = LogicalSchedule::new(origin(), 2000, 5000).with_horizon(5000);
        let mut count = 0;
        while schedule.next_tick().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_scripted_ticks_drain() {
        let mut ticks = ScriptedTicks::new([Tick::status(origin()), Tick::position(origin())]);
        assert_eq!(ticks.next_tick().unwrap().kind, TickKind::Status);
        assert_eq!(ticks.next_tick().unwrap().kind, TickKind::Position);
        assert!(ticks.next_tick().is_none());
    }
}
