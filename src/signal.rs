use serde::Serialize;
use std::fmt;

/// Signal phase of the intersection.
///
/// Exactly one phase is active at any tick. `Yellow` is the transitional
/// phase between the two greens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    NsGreen,
    EwGreen,
    Yellow,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NsGreen => "NS_GREEN",
            Phase::EwGreen => "EW_GREEN",
            Phase::Yellow => "YELLOW",
        }
    }

    pub fn is_green(self) -> bool {
        self != Phase::Yellow
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Honor width/alignment so the report can pad the phase column.
        f.pad(self.as_str())
    }
}

/// State of the signal head.
///
/// `pending_phase` is only meaningful while `phase` is `Yellow` and is
/// always one of the two greens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalState {
    pub phase: Phase,
    pub time_in_phase: u32,
    pub pending_phase: Phase,
}

impl SignalState {
    /// Starting state of a run: North-South green, zero dwell.
    pub fn new() -> Self {
        Self {
            phase: Phase::NsGreen,
            time_in_phase: 0,
            pending_phase: Phase::EwGreen,
        }
    }

    /// Enter `new_phase`, discarding the accumulated dwell.
    pub fn transition_to(&mut self, new_phase: Phase) {
        self.phase = new_phase;
        self.time_in_phase = 0;
    }

    /// Advance the dwell counter by one tick.
    pub fn advance_tick(&mut self) {
        self.time_in_phase += 1;
    }
}
