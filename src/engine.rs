use crate::agent::{self, Directive, SensorReading};
use crate::config::Config;
use crate::signal::{Phase, SignalState};
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Bernoulli;
use serde::Serialize;
use std::fmt;

/// Status of the intersection after one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickRecord {
    pub tick: usize,
    pub phase: Phase,
    pub queue_ns: u32,
    pub queue_ew: u32,
    pub pending_phase: Phase,
    pub time_in_phase: u32,
}

impl fmt::Display for TickRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:03} | State={:9} | NS_Q={:2} | EW_Q={:2} | Next={} | Time={}",
            self.tick, self.phase, self.queue_ns, self.queue_ew, self.pending_phase, self.time_in_phase
        )
    }
}

/// Simulation engine.
///
/// Holds the configuration, signal state, approach queues, and random
/// number generator, and advances the intersection tick by tick.
pub struct Engine {
    cfg: Config,
    signal: SignalState,
    queue_ns: u32,
    queue_ew: u32,
    arrival: Bernoulli,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` with empty queues and a seeded random stream.
    pub fn new(cfg: Config, seed: u64) -> Result<Self> {
        cfg.validate().context("invalid configuration")?;

        let arrival =
            Bernoulli::new(cfg.arrival_prob).context("invalid arrival probability")?;
        let rng = ChaCha12Rng::seed_from_u64(seed);

        Ok(Self {
            cfg,
            signal: SignalState::new(),
            queue_ns: 0,
            queue_ew: 0,
            arrival,
            rng,
        })
    }

    /// Simulate `steps` ticks and return the per-tick records in order.
    pub fn run(&mut self, steps: usize) -> Result<Vec<TickRecord>> {
        if steps == 0 {
            bail!("number of steps must be positive");
        }

        let mut records = Vec::with_capacity(steps);
        for tick in 1..=steps {
            records.push(self.perform_tick(tick));
        }

        log::info!("completed {steps} ticks");

        Ok(records)
    }

    fn perform_tick(&mut self, tick: usize) -> TickRecord {
        // New arrivals join the queues.
        self.apply_arrivals();

        // Waiting time is approximated by the queue length.
        let sensors = SensorReading::from_queues(self.queue_ns, self.queue_ew);

        // The agent picks the phase for this tick.
        let directive = agent::decide(&self.cfg, &self.signal, &sensors);
        self.apply_directive(directive);

        // Vehicles clear the intersection during a green phase.
        self.discharge();

        self.signal.advance_tick();

        TickRecord {
            tick,
            phase: self.signal.phase,
            queue_ns: self.queue_ns,
            queue_ew: self.queue_ew,
            pending_phase: self.signal.pending_phase,
            time_in_phase: self.signal.time_in_phase,
        }
    }

    fn apply_arrivals(&mut self) {
        // NS draw before EW draw, two draws per tick: the stream layout
        // keeps reports reproducible for a fixed seed.
        if self.arrival.sample(&mut self.rng) {
            self.queue_ns += 1;
        }
        if self.arrival.sample(&mut self.rng) {
            self.queue_ew += 1;
        }
    }

    fn apply_directive(&mut self, directive: Directive) {
        if let Some(pending) = directive.pending {
            self.signal.pending_phase = pending;
        }

        // A same-phase directive is a hold, not a re-entry: dwell keeps
        // accumulating.
        if directive.phase != self.signal.phase {
            self.signal.transition_to(directive.phase);
        }
    }

    fn discharge(&mut self) {
        let queue = match self.signal.phase {
            Phase::NsGreen => &mut self.queue_ns,
            Phase::EwGreen => &mut self.queue_ew,
            Phase::Yellow => return,
        };
        *queue -= self.cfg.car_pass_per_tick.min(*queue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_records(cfg: Config, seed: u64, steps: usize) -> Vec<TickRecord> {
        let mut engine = Engine::new(cfg, seed).unwrap();
        engine.run(steps).unwrap()
    }

    #[test]
    fn zero_steps_is_rejected() {
        let mut engine = Engine::new(Config::default(), 42).unwrap();
        assert!(engine.run(0).is_err());
    }

    #[test]
    fn fixed_seed_reproduces_the_run() {
        let first = run_records(Config::default(), 42, 200);
        let second = run_records(Config::default(), 42, 200);
        assert_eq!(first, second);
    }

    #[test]
    fn first_tick_is_north_south_green() {
        let records = run_records(Config::default(), 42, 50);
        let first = &records[0];
        assert_eq!(first.tick, 1);
        assert_eq!(first.phase, Phase::NsGreen);
        assert_eq!(first.time_in_phase, 1);
        assert_eq!(first.pending_phase, Phase::EwGreen);
    }

    #[test]
    fn queues_stay_within_arrival_bounds() {
        // At most one arrival per queue per tick.
        for seed in 0..10 {
            for record in run_records(Config::default(), seed, 300) {
                assert!(record.queue_ns <= record.tick as u32);
                assert!(record.queue_ew <= record.tick as u32);
            }
        }
    }

    #[test]
    fn heavy_discharge_does_not_underflow_queues() {
        let cfg = Config {
            car_pass_per_tick: 10,
            ..Config::default()
        };
        let records = run_records(cfg, 7, 300);
        assert_eq!(records.len(), 300);
    }

    #[test]
    fn green_always_reaches_minimum_dwell_before_yielding() {
        let cfg = Config::default();
        for seed in 0..10 {
            let records = run_records(cfg.clone(), seed, 400);
            for pair in records.windows(2) {
                if pair[0].phase.is_green() && pair[1].phase == Phase::Yellow {
                    assert!(pair[0].time_in_phase >= cfg.min_green);
                }
            }
        }
    }

    #[test]
    fn yellow_lasts_exactly_its_dwell_then_hands_over() {
        let cfg = Config::default();
        for seed in 0..10 {
            let records = run_records(cfg.clone(), seed, 400);
            let mut idx = 0;
            while idx < records.len() {
                if records[idx].phase != Phase::Yellow {
                    idx += 1;
                    continue;
                }

                let start = idx;
                while idx < records.len() && records[idx].phase == Phase::Yellow {
                    idx += 1;
                }

                // Ignore a yellow still running when the record ends.
                if idx == records.len() {
                    break;
                }

                assert_eq!((idx - start) as u32, cfg.yellow_time);
                assert_eq!(records[idx].phase, records[idx - 1].pending_phase);
                assert_eq!(records[idx].time_in_phase, 1);
            }
        }
    }

    #[test]
    fn pending_phase_opposes_the_yielding_green() {
        let records = run_records(Config::default(), 42, 400);
        for pair in records.windows(2) {
            if pair[0].phase.is_green() && pair[1].phase == Phase::Yellow {
                let expected = match pair[0].phase {
                    Phase::NsGreen => Phase::EwGreen,
                    _ => Phase::NsGreen,
                };
                assert_eq!(pair[1].pending_phase, expected);
            }
        }
    }

    #[test]
    fn saturated_arrivals_cycle_the_signal() {
        // With an arrival every tick the green approach drains while the
        // opposing queue grows, so the first switch lands as soon as the
        // minimum green elapses.
        let cfg = Config {
            arrival_prob: 1.0,
            ..Config::default()
        };
        let records = run_records(cfg.clone(), 0, 20);

        let onset = &records[cfg.min_green as usize];
        assert_eq!(onset.phase, Phase::Yellow);
        assert_eq!(onset.pending_phase, Phase::EwGreen);

        let handover = &records[(cfg.min_green + cfg.yellow_time) as usize];
        assert_eq!(handover.phase, Phase::EwGreen);
        assert_eq!(handover.time_in_phase, 1);
    }

    #[test]
    fn report_line_matches_the_reference_layout() {
        let record = TickRecord {
            tick: 3,
            phase: Phase::Yellow,
            queue_ns: 2,
            queue_ew: 11,
            pending_phase: Phase::EwGreen,
            time_in_phase: 1,
        };
        assert_eq!(
            record.to_string(),
            "t=003 | State=YELLOW    | NS_Q= 2 | EW_Q=11 | Next=EW_GREEN | Time=1"
        );
    }
}
