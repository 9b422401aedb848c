//! Settings of a [`PresenceSensor`](crate::PresenceSensor).

use crate::cycle::ZONE_COUNT;
use crate::driver::DistanceMode;
use crate::roi::{OpticalCenter, Roi};

/// Configuration of the presence sensor.
///
/// All values are applied once, in [`PresenceSensor::new`](crate::PresenceSensor::new)
/// and [`PresenceSensor::setup`](crate::PresenceSensor::setup).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Distance mode of the sensor
    pub distance_mode: DistanceMode,
    /// Measurement timing budget in microseconds, raised to the minimum of
    /// the distance mode during setup
    pub timing_budget_us: u32,
    /// Optical center (SPAD number) of each zone
    pub optical_centers: [OpticalCenter; ZONE_COUNT],
    /// Distance threshold of each zone in millimeters, for downstream use
    pub distance_thresholds_mm: [u16; ZONE_COUNT],
    /// Width of each zone's ROI in SPADs (4-16)
    pub roi_width: u8,
    /// Height of each zone's ROI in SPADs (4-16)
    pub roi_height: u8,
    /// Retries of an invalid reading before a zone is given up
    pub retry_budget: u8,
    /// A zone is given up once more than this many consecutive polls found no
    /// data, `None` waits forever
    pub max_pending_polls: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            distance_mode: DistanceMode::Long,
            timing_budget_us: 50_000,
            optical_centers: [OpticalCenter(167), OpticalCenter(231)],
            distance_thresholds_mm: [1600, 1600],
            roi_width: 8,
            roi_height: 16,
            retry_budget: 5,
            max_pending_polls: None,
        }
    }
}

impl Config {
    /// Sets the optical center of both zones.
    #[must_use]
    pub fn with_optical_centers(mut self, centers: [u8; ZONE_COUNT]) -> Self {
        self.optical_centers = centers.map(OpticalCenter);
        self
    }

    /// Sets the distance threshold of both zones.
    #[must_use]
    pub fn with_distance_thresholds(mut self, thresholds_mm: [u16; ZONE_COUNT]) -> Self {
        self.distance_thresholds_mm = thresholds_mm;
        self
    }

    /// Sets the size of the zone ROIs.
    #[must_use]
    pub fn with_roi_size(mut self, width: u8, height: u8) -> Self {
        self.roi_width = width;
        self.roi_height = height;
        self
    }

    /// Sets distance mode and timing budget.
    #[must_use]
    pub fn with_timing(mut self, distance_mode: DistanceMode, timing_budget_us: u32) -> Self {
        self.distance_mode = distance_mode;
        self.timing_budget_us = timing_budget_us;
        self
    }

    /// Sets the retry budget.
    #[must_use]
    pub fn with_retry_budget(mut self, retry_budget: u8) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Sets the pending-poll timeout.
    #[must_use]
    pub fn with_max_pending_polls(mut self, max_pending_polls: Option<u32>) -> Self {
        self.max_pending_polls = max_pending_polls;
        self
    }

    /// Timing budget that will actually be programmed.
    #[must_use]
    pub fn effective_timing_budget_us(&self) -> u32 {
        self.distance_mode.clamp_timing_budget(self.timing_budget_us)
    }

    /// ROI of each zone, or `None` if one of them does not fit on the grid.
    #[must_use]
    pub fn zone_rois(&self) -> Option<[Roi; ZONE_COUNT]> {
        let [first, second] = self
            .optical_centers
            .map(|center| Roi::centered(center, self.roi_width, self.roi_height));
        Some([first?, second?])
    }

    /// Checks that every zone's ROI fits on the grid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.zone_rois().is_some()
    }
}
