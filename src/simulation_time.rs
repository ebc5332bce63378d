use crate::core::units::SECONDS_PER_HOUR;
use crate::errors::TimeAxisError;
use chrono::{DateTime, TimeDelta, Utc};

/// A validated time index: strictly increasing, gap-free, with a single
/// uniform step derived from the timestamps themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationTime {
    timestamps: Vec<DateTime<Utc>>,
    step: TimeDelta,
}

impl SimulationTime {
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Result<Self, TimeAxisError> {
        if timestamps.len() < 2 {
            return Err(TimeAxisError::TooShort(timestamps.len()));
        }

        let step = timestamps[1] - timestamps[0];
        if step <= TimeDelta::zero() {
            return Err(TimeAxisError::NotIncreasing { index: 1 });
        }

        for (index, pair) in timestamps.windows(2).enumerate().skip(1) {
            let found = pair[1] - pair[0];
            if found <= TimeDelta::zero() {
                return Err(TimeAxisError::NotIncreasing { index: index + 1 });
            }
            if found != step {
                return Err(TimeAxisError::NonUniformStep {
                    index: index + 1,
                    expected_secs: step.num_seconds(),
                    found_secs: found.num_seconds(),
                });
            }
        }

        Ok(Self { timestamps, step })
    }

    pub fn step_in_hours(&self) -> f64 {
        self.step.num_seconds() as f64 / SECONDS_PER_HOUR as f64
    }

    pub fn total_steps(&self) -> usize {
        self.timestamps.len()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub(crate) fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator {
            current_index: 0,
            simulation_time: self,
        }
    }
}

pub struct SimulationTimeIterator<'a> {
    current_index: usize,
    simulation_time: &'a SimulationTime,
}

#[derive(Debug, PartialEq)]
pub struct SimulationTimeIteration {
    pub index: usize,
    pub time: DateTime<Utc>,
}

impl Iterator for SimulationTimeIterator<'_> {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        let time = *self.simulation_time.timestamps.get(self.current_index)?;
        let iteration = SimulationTimeIteration {
            index: self.current_index,
            time,
        };
        self.current_index += 1;
        Some(iteration)
    }
}
