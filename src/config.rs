use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Signal tuning parameters.
///
/// The defaults reproduce the reference controller; a TOML file may
/// override any subset of them. See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum ticks a green phase must hold before a switch is considered.
    pub min_green: u32,
    /// Fixed ticks the transitional yellow phase lasts.
    pub yellow_time: u32,
    /// Vehicles that clear the intersection per green tick.
    pub car_pass_per_tick: u32,
    /// Probability of one arrival per queue per tick.
    pub arrival_prob: f64,
    /// Waiting time on the opposing approach that forces a switch.
    pub max_wait: u32,
    /// Queue-length differential that forces a switch.
    pub threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_green: 5,
            yellow_time: 2,
            car_pass_per_tick: 1,
            arrival_prob: 0.6,
            max_wait: 8,
            threshold: 3,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// Fields absent from the file keep their default values. Performs
    /// validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or if the
    /// configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to parse config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_num(self.min_green, 1..1_000).context("invalid minimum green time")?;
        check_num(self.yellow_time, 1..1_000).context("invalid yellow time")?;
        check_num(self.car_pass_per_tick, 1..100).context("invalid cars per tick")?;
        check_num(self.arrival_prob, 0.0..=1.0).context("invalid arrival probability")?;
        check_num(self.max_wait, 1..10_000).context("invalid maximum wait")?;
        check_num(self.threshold, 1..10_000).context("invalid queue threshold")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
