use crate::config::Config;
use crate::signal::{Phase, SignalState};
use serde::Serialize;

/// Sensor snapshot of the two approaches at one tick.
///
/// Waiting times are approximated by the queue lengths; the fields stay
/// separate so a real wait clock could be dropped in without touching the
/// decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorReading {
    pub queue_ns: u32,
    pub queue_ew: u32,
    pub wait_ns: u32,
    pub wait_ew: u32,
}

impl SensorReading {
    pub fn from_queues(queue_ns: u32, queue_ew: u32) -> Self {
        Self {
            queue_ns,
            queue_ew,
            wait_ns: queue_ns,
            wait_ew: queue_ew,
        }
    }
}

/// The phase the signal should be in for this tick, plus the green to
/// schedule after yellow when a switch is being initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub phase: Phase,
    pub pending: Option<Phase>,
}

impl Directive {
    fn hold(phase: Phase) -> Self {
        Self {
            phase,
            pending: None,
        }
    }

    fn switch_to(next: Phase) -> Self {
        Self {
            phase: Phase::Yellow,
            pending: Some(next),
        }
    }
}

/// Reflex decision rule, evaluated in strict priority order:
///
/// 1. A running yellow holds until its fixed dwell elapses, then hands
///    over to the pending green.
/// 2. A green below its minimum dwell holds regardless of queue pressure.
/// 3. Otherwise a green yields (via yellow) when the opposing approach has
///    waited `max_wait` ticks, or its queue leads by `threshold` vehicles.
pub fn decide(cfg: &Config, signal: &SignalState, sensors: &SensorReading) -> Directive {
    if signal.phase == Phase::Yellow {
        if signal.time_in_phase >= cfg.yellow_time {
            return Directive::hold(signal.pending_phase);
        }
        return Directive::hold(Phase::Yellow);
    }

    if signal.time_in_phase < cfg.min_green {
        return Directive::hold(signal.phase);
    }

    let (opposing_wait, opposing_lead, next) = match signal.phase {
        Phase::NsGreen => (
            sensors.wait_ew,
            sensors.queue_ew.saturating_sub(sensors.queue_ns),
            Phase::EwGreen,
        ),
        _ => (
            sensors.wait_ns,
            sensors.queue_ns.saturating_sub(sensors.queue_ew),
            Phase::NsGreen,
        ),
    };

    if opposing_wait >= cfg.max_wait || opposing_lead >= cfg.threshold {
        return Directive::switch_to(next);
    }

    Directive::hold(signal.phase)
}
