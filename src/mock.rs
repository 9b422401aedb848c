//! Scripted stand-in for a VL53L1X driver, used by the unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use crate::driver::{DistanceMode, RangeReading, RangeStatus, RangingDriver};
use crate::roi::Roi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Driver operation recorded by [`MockDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Init,
    SetDistanceMode(DistanceMode),
    SetTimingBudget(u32),
    SetUserRoi(Roi),
    StartReading,
    DataReady,
    ReadRange,
}

/// What the sensor answers to the next `data_ready` poll.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    NotReady,
    Reading(RangeReading),
    BusError,
}

impl Step {
    pub fn valid(range_mm: u16) -> Self {
        Step::Reading(RangeReading {
            range_mm,
            status: RangeStatus::RangeValid,
        })
    }

    pub fn status(status: RangeStatus) -> Self {
        Step::Reading(RangeReading {
            range_mm: 0,
            status,
        })
    }
}

/// Plays back a script of sensor answers and records every call.
///
/// Once the script runs out the sensor never reports data ready.
#[derive(Debug, Default)]
pub struct MockDriver {
    script: VecDeque<Step>,
    calls: Vec<Call>,
    missing: bool,
    failing_starts: usize,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A driver whose `init` fails, as if nothing answered on the bus.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// Makes the next `start_single_reading` fail with a bus error.
    pub fn fail_next_start(&mut self) {
        self.failing_starts += 1;
    }

    pub fn push(&mut self, step: Step) {
        self.script.push_back(step);
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn start_count(&self) -> usize {
        self.count(|call| *call == Call::StartReading)
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// ROIs programmed so far, in order.
    pub fn rois(&self) -> Vec<Roi> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetUserRoi(roi) => Some(*roi),
                _ => None,
            })
            .collect()
    }
}

impl RangingDriver for MockDriver {
    type Error = MockError;

    fn init(&mut self) -> Result<(), MockError> {
        self.calls.push(Call::Init);
        if self.missing {
            Err(MockError)
        } else {
            Ok(())
        }
    }

    fn set_distance_mode(&mut self, mode: DistanceMode) -> Result<(), MockError> {
        self.calls.push(Call::SetDistanceMode(mode));
        Ok(())
    }

    fn set_measurement_timing_budget(&mut self, budget_us: u32) -> Result<(), MockError> {
        self.calls.push(Call::SetTimingBudget(budget_us));
        Ok(())
    }

    fn set_user_roi(&mut self, roi: &Roi) -> Result<(), MockError> {
        self.calls.push(Call::SetUserRoi(*roi));
        Ok(())
    }

    fn start_single_reading(&mut self) -> Result<(), MockError> {
        self.calls.push(Call::StartReading);
        if self.failing_starts > 0 {
            self.failing_starts -= 1;
            Err(MockError)
        } else {
            Ok(())
        }
    }

    fn data_ready(&mut self) -> Result<bool, MockError> {
        self.calls.push(Call::DataReady);
        match self.script.front() {
            None => Ok(false),
            Some(Step::Reading(_)) => Ok(true),
            Some(Step::NotReady) => {
                self.script.pop_front();
                Ok(false)
            }
            Some(Step::BusError) => {
                self.script.pop_front();
                Err(MockError)
            }
        }
    }

    fn read_range(&mut self) -> Result<RangeReading, MockError> {
        self.calls.push(Call::ReadRange);
        match self.script.pop_front() {
            Some(Step::Reading(reading)) => Ok(reading),
            _ => Err(MockError),
        }
    }
}
