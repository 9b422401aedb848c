//! Sequencing of the measurement zones.

use crate::roi::Roi;

/// Number of zones measured per cycle.
pub const ZONE_COUNT: usize = 2;

/// Where a [`ZoneMeasurementCycle`] currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    /// No cycle has been started yet
    Idle,
    /// The zone with the given index is being measured
    ZoneActive(usize),
    /// Every zone has a result
    Complete,
}

/// Walks through a fixed, ordered list of zones, one at a time.
///
/// The cycle only keeps the bookkeeping: which zone is active, which ROI it
/// uses and the distance each zone produced. Driving the sensor is up to the
/// owner, which starts a reading on [`roi`](Self::roi) whenever
/// [`start`](Self::start) or [`next`](Self::next) makes a new zone active.
///
/// Results are in meters; NaN marks a zone that was not measured yet or whose
/// measurement failed.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZoneMeasurementCycle<const N: usize = ZONE_COUNT> {
    rois: [Roi; N],
    state: CycleState,
    results: [f32; N],
}

impl<const N: usize> ZoneMeasurementCycle<N> {
    /// Creates an idle cycle over the given zones.
    #[must_use]
    pub fn new(rois: [Roi; N]) -> Self {
        Self {
            rois,
            state: CycleState::Idle,
            results: [f32::NAN; N],
        }
    }

    /// Begins a new cycle at the first zone and clears all results.
    pub fn start(&mut self) {
        self.results = [f32::NAN; N];
        self.state = if N == 0 {
            CycleState::Complete
        } else {
            CycleState::ZoneActive(0)
        };
    }

    /// ROI of the active zone, `None` while no zone is active.
    #[must_use]
    pub fn roi(&self) -> Option<&Roi> {
        match self.state {
            CycleState::ZoneActive(index) => self.rois.get(index),
            CycleState::Idle | CycleState::Complete => None,
        }
    }

    /// Stores the distance of the active zone.
    pub fn set_result(&mut self, value: f32) {
        if let CycleState::ZoneActive(index) = self.state {
            self.results[index] = value;
        } else {
            error!("Result stored while no zone is active");
        }
    }

    /// Moves on to the next zone.
    ///
    /// Returns `true` when another zone became active and needs a reading, or
    /// `false` when the last zone was done and the cycle is complete.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        match self.state {
            CycleState::ZoneActive(index) if index + 1 < N => {
                self.state = CycleState::ZoneActive(index + 1);
                true
            }
            CycleState::ZoneActive(_) => {
                self.state = CycleState::Complete;
                false
            }
            CycleState::Idle | CycleState::Complete => {
                error!("Advanced a cycle that is not running");
                false
            }
        }
    }

    /// Abandons the running cycle and goes back to [`CycleState::Idle`].
    ///
    /// Results stored so far are kept until the next [`start`](Self::start).
    pub fn abort(&mut self) {
        self.state = CycleState::Idle;
    }

    /// Distance of zone `index` in meters, NaN if unknown or failed.
    #[must_use]
    pub fn result(&self, index: usize) -> f32 {
        self.results.get(index).copied().unwrap_or(f32::NAN)
    }

    /// Distances of all zones.
    #[must_use]
    pub fn results(&self) -> [f32; N] {
        self.results
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Index of the active zone.
    #[must_use]
    pub fn zone_index(&self) -> Option<usize> {
        match self.state {
            CycleState::ZoneActive(index) => Some(index),
            CycleState::Idle | CycleState::Complete => None,
        }
    }

    /// Whether a zone is being measured.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, CycleState::ZoneActive(_))
    }

    /// Whether every zone has been measured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == CycleState::Complete
    }

    /// ROIs of all zones, in measuring order.
    #[must_use]
    pub fn rois(&self) -> &[Roi; N] {
        &self.rois
    }

    /// Number of zones.
    #[must_use]
    pub fn zone_count(&self) -> usize {
        N
    }
}
