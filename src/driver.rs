//! The sensor capability the measurement sequencer is built on.
//!
//! Register access and bus transport live in whatever implements
//! [`RangingDriver`]; this crate only needs the handful of operations below.

use crate::roi::Roi;

/// Distance mode of the VL53L1X.
///
/// Longer modes reach further but need a longer timing budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DistanceMode {
    /// Up to ~1.3 m, best ambient light immunity
    Short,
    /// Up to ~3 m
    Medium,
    /// Up to ~4 m
    #[default]
    Long,
}

impl DistanceMode {
    /// Shortest measurement timing budget in microseconds the mode supports.
    #[must_use]
    pub fn min_timing_budget_us(self) -> u32 {
        match self {
            DistanceMode::Short => 20_000,
            DistanceMode::Medium | DistanceMode::Long => 33_000,
        }
    }

    /// Returns `budget_us` raised to the minimum of this mode if needed.
    #[must_use]
    pub fn clamp_timing_budget(self, budget_us: u32) -> u32 {
        budget_us.max(self.min_timing_budget_us())
    }

    /// Human readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMode::Short => "short",
            DistanceMode::Medium => "medium",
            DistanceMode::Long => "long",
        }
    }
}

/// Range status reported with every reading.
///
/// Only [`RangeStatus::RangeValid`] counts as a usable distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeStatus {
    /// Valid reading
    RangeValid,
    /// Sigma estimator check is above the threshold
    SigmaFail,
    /// Signal value is below the threshold
    SignalFail,
    /// Target is below the minimum detection threshold
    RangeValidMinRangeClipped,
    /// Phase is out of bounds
    OutOfBoundsFail,
    /// Hardware or VCSEL failure
    HardwareFail,
    /// Valid range but the wraparound check was not performed
    RangeValidNoWrapCheckFail,
    /// Wrapped target, no matching phase in the other VCSEL period
    WrapTargetFail,
    /// Crosstalk signal failure
    XtalkSignalFail,
    /// First interrupt after a start, the reading must be discarded
    SynchronizationInt,
    /// Target distance is below the minimum range
    MinRangeFail,
    /// No update
    None,
    /// Status code not listed above
    Unknown(u8),
}

impl RangeStatus {
    /// Whether the reading carries a usable distance.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self == RangeStatus::RangeValid
    }

    /// Human readable name, as used in log messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RangeStatus::RangeValid => "range valid",
            RangeStatus::SigmaFail => "sigma fail",
            RangeStatus::SignalFail => "signal fail",
            RangeStatus::RangeValidMinRangeClipped => "range valid, min range clipped",
            RangeStatus::OutOfBoundsFail => "out of bounds fail",
            RangeStatus::HardwareFail => "hardware fail",
            RangeStatus::RangeValidNoWrapCheckFail => "range valid, no wrap check fail",
            RangeStatus::WrapTargetFail => "wrap target fail",
            RangeStatus::XtalkSignalFail => "xtalk signal fail",
            RangeStatus::SynchronizationInt => "synchronization int",
            RangeStatus::MinRangeFail => "min range fail",
            RangeStatus::None => "no update",
            RangeStatus::Unknown(_) => "unknown status",
        }
    }
}

impl From<RangeStatus> for u8 {
    fn from(status: RangeStatus) -> Self {
        match status {
            RangeStatus::RangeValid => 0,
            RangeStatus::SigmaFail => 1,
            RangeStatus::SignalFail => 2,
            RangeStatus::RangeValidMinRangeClipped => 3,
            RangeStatus::OutOfBoundsFail => 4,
            RangeStatus::HardwareFail => 5,
            RangeStatus::RangeValidNoWrapCheckFail => 6,
            RangeStatus::WrapTargetFail => 7,
            RangeStatus::XtalkSignalFail => 9,
            RangeStatus::SynchronizationInt => 10,
            RangeStatus::MinRangeFail => 13,
            RangeStatus::None => 255,
            RangeStatus::Unknown(value) => value,
        }
    }
}

impl From<u8> for RangeStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => RangeStatus::RangeValid,
            1 => RangeStatus::SigmaFail,
            2 => RangeStatus::SignalFail,
            3 => RangeStatus::RangeValidMinRangeClipped,
            4 => RangeStatus::OutOfBoundsFail,
            5 => RangeStatus::HardwareFail,
            6 => RangeStatus::RangeValidNoWrapCheckFail,
            7 => RangeStatus::WrapTargetFail,
            9 => RangeStatus::XtalkSignalFail,
            10 => RangeStatus::SynchronizationInt,
            13 => RangeStatus::MinRangeFail,
            255 => RangeStatus::None,
            _ => {
                warn!("Unknown range status: {}", value);
                RangeStatus::Unknown(value)
            }
        }
    }
}

/// Result of one completed ranging operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeReading {
    /// Measured distance in millimeters
    pub range_mm: u16,
    /// Status of the measurement
    pub status: RangeStatus,
}

impl RangeReading {
    /// Distance in meters, or NaN when the status is not valid.
    #[must_use]
    pub fn distance_m(&self) -> f32 {
        if self.status.is_valid() {
            f32::from(self.range_mm) / 1000.0
        } else {
            f32::NAN
        }
    }
}

/// Operations the sequencer needs from a VL53L1X driver.
///
/// Implementations own the bus handle and the device address. Every method
/// must return promptly: [`start_single_reading`](Self::start_single_reading)
/// only triggers a measurement and [`data_ready`](Self::data_ready) only checks
/// for its completion.
#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
#[allow(async_fn_in_trait)]
pub trait RangingDriver {
    /// Error type of the underlying transport
    type Error: core::fmt::Debug;

    /// Boots and configures the sensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the device does not answer.
    async fn init(&mut self) -> Result<(), Self::Error>;

    /// Selects the distance mode.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure.
    async fn set_distance_mode(&mut self, mode: DistanceMode) -> Result<(), Self::Error>;

    /// Sets the measurement timing budget in microseconds.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure.
    async fn set_measurement_timing_budget(&mut self, budget_us: u32) -> Result<(), Self::Error>;

    /// Programs the region of interest used by subsequent readings.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure.
    async fn set_user_roi(&mut self, roi: &Roi) -> Result<(), Self::Error>;

    /// Triggers one measurement without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure.
    async fn start_single_reading(&mut self) -> Result<(), Self::Error>;

    /// Checks whether the last triggered measurement has completed.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure.
    async fn data_ready(&mut self) -> Result<bool, Self::Error>;

    /// Reads the result of the last completed measurement.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport failure.
    async fn read_range(&mut self) -> Result<RangeReading, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_budget_is_clamped_per_mode() {
        assert_eq!(DistanceMode::Short.clamp_timing_budget(15_000), 20_000);
        assert_eq!(DistanceMode::Short.clamp_timing_budget(25_000), 25_000);
        assert_eq!(DistanceMode::Medium.clamp_timing_budget(20_000), 33_000);
        assert_eq!(DistanceMode::Long.clamp_timing_budget(33_000), 33_000);
        assert_eq!(DistanceMode::Long.clamp_timing_budget(140_000), 140_000);
    }

    #[test]
    fn range_status_codes() {
        for code in [0u8, 1, 2, 3, 4, 5, 6, 7, 9, 10, 13, 255] {
            assert_eq!(u8::from(RangeStatus::from(code)), code);
        }
        assert_eq!(RangeStatus::from(8), RangeStatus::Unknown(8));
        assert!(RangeStatus::from(0).is_valid());
        assert!(!RangeStatus::RangeValidMinRangeClipped.is_valid());
    }

    #[test]
    fn reading_converts_to_meters() {
        let reading = RangeReading {
            range_mm: 1523,
            status: RangeStatus::RangeValid,
        };
        assert_eq!(reading.distance_m(), 1.523);

        let reading = RangeReading {
            range_mm: 1523,
            status: RangeStatus::SignalFail,
        };
        assert!(reading.distance_m().is_nan());
    }
}
