use crate::engine::TickRecord;
use crate::signal::Phase;
use serde::Serialize;
use std::fmt;

/// Streaming mean and standard deviation (Welford's method).
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Serialize)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: self.mean,
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

/// Aggregate view of a finished run.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub ticks: usize,
    pub ns_green_ticks: usize,
    pub ew_green_ticks: usize,
    pub yellow_ticks: usize,
    /// Switch cycles initiated, counted at yellow onsets.
    pub switches: usize,
    pub queue_ns: AccumulatorReport,
    pub queue_ew: AccumulatorReport,
    pub max_queue_ns: u32,
    pub max_queue_ew: u32,
}

impl Summary {
    pub fn from_records(records: &[TickRecord]) -> Self {
        let mut acc_ns = Accumulator::new();
        let mut acc_ew = Accumulator::new();
        let mut max_queue_ns = 0;
        let mut max_queue_ew = 0;
        let mut phase_ticks = [0usize; 3];
        let mut switches = 0;
        let mut prev_phase = None;

        for record in records {
            acc_ns.add(record.queue_ns as f64);
            acc_ew.add(record.queue_ew as f64);
            max_queue_ns = max_queue_ns.max(record.queue_ns);
            max_queue_ew = max_queue_ew.max(record.queue_ew);

            let slot = match record.phase {
                Phase::NsGreen => 0,
                Phase::EwGreen => 1,
                Phase::Yellow => 2,
            };
            phase_ticks[slot] += 1;

            if record.phase == Phase::Yellow && prev_phase != Some(Phase::Yellow) {
                switches += 1;
            }
            prev_phase = Some(record.phase);
        }

        Self {
            ticks: records.len(),
            ns_green_ticks: phase_ticks[0],
            ew_green_ticks: phase_ticks[1],
            yellow_ticks: phase_ticks[2],
            switches,
            queue_ns: acc_ns.report(),
            queue_ew: acc_ew.report(),
            max_queue_ns,
            max_queue_ew,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ticks: {} (NS_GREEN {}, EW_GREEN {}, YELLOW {})",
            self.ticks, self.ns_green_ticks, self.ew_green_ticks, self.yellow_ticks
        )?;
        writeln!(f, "switch cycles: {}", self.switches)?;
        writeln!(
            f,
            "NS queue: mean {:.2} | std_dev {:.2} | max {}",
            self.queue_ns.mean, self.queue_ns.std_dev, self.max_queue_ns
        )?;
        write!(
            f,
            "EW queue: mean {:.2} | std_dev {:.2} | max {}",
            self.queue_ew.mean, self.queue_ew.std_dev, self.max_queue_ew
        )
    }
}
