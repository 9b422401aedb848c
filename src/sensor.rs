//! The two-zone presence sensor built from a driver, a zone cycle and one
//! reading session at a time.

use crate::config::Config;
use crate::cycle::{CycleState, ZoneMeasurementCycle, ZONE_COUNT};
use crate::driver::RangingDriver;
use crate::roi::Roi;
use crate::session::{RangeReadingSession, SessionOutcome};
use crate::Error;

/// Measures the configured zones one after the other without ever blocking.
///
/// The host calls [`setup`](Self::setup) once, [`update`](Self::update) on
/// every measurement period and [`poll`](Self::poll) as often as it can in
/// between. Each call returns immediately; a completed cycle is reported by
/// `poll` returning both zone distances.
///
/// Only one reading is ever in flight. A trigger arriving while a cycle is
/// still running is ignored, so a slow sensor simply skips periods.
pub struct PresenceSensor<D> {
    driver: D,
    config: Config,
    cycle: ZoneMeasurementCycle,
    session: Option<RangeReadingSession>,
    last_distances: [f32; ZONE_COUNT],
    cycles_completed: u32,
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<D> PresenceSensor<D>
where
    D: RangingDriver,
{
    /// Creates a presence sensor on top of `driver`.
    ///
    /// The driver keeps ownership of the bus and the device address; nothing
    /// is sent to the sensor until [`setup`](Self::setup).
    ///
    /// # Errors
    ///
    /// * `Err(Error::InvalidArgument)` - If a zone's ROI does not fit on the
    ///   SPAD grid
    pub fn new(driver: D, config: Config) -> Result<Self, Error<D::Error>> {
        let Some(rois) = config.zone_rois() else {
            error!(
                "Zones do not fit on the grid: centers [{},{}], size {}x{}",
                config.optical_centers[0].0,
                config.optical_centers[1].0,
                config.roi_width,
                config.roi_height
            );
            return Err(Error::InvalidArgument);
        };

        Ok(Self {
            driver,
            config,
            cycle: ZoneMeasurementCycle::new(rois),
            session: None,
            last_distances: [f32::NAN; ZONE_COUNT],
            cycles_completed: 0,
        })
    }

    /// Initializes the sensor and applies distance mode and timing budget.
    ///
    /// A sensor that does not answer to initialization is only reported; the
    /// configuration is still sent so that a late-starting device works.
    ///
    /// # Errors
    ///
    /// * `Err(Error::Driver(E))` - If distance mode or timing budget could
    ///   not be written
    pub async fn setup(&mut self) -> Result<(), Error<D::Error>> {
        if self.driver.init().await.is_err() {
            warn!("Device not found");
        }

        self.driver
            .set_distance_mode(self.config.distance_mode)
            .await?;

        let timing_budget_us = self.config.effective_timing_budget_us();
        if timing_budget_us != self.config.timing_budget_us {
            info!(
                "Timing budget raised to {} us for {} mode",
                timing_budget_us,
                self.config.distance_mode.as_str()
            );
        }
        self.driver
            .set_measurement_timing_budget(timing_budget_us)
            .await?;
        Ok(())
    }

    /// Starts a measurement cycle at the first zone.
    ///
    /// Returns `false` without touching the sensor if the previous cycle is
    /// still running.
    ///
    /// # Errors
    ///
    /// * `Err(Error::Driver(E))` - If the first reading could not be started.
    ///   The cycle is abandoned and the next call starts over.
    pub async fn update(&mut self) -> Result<bool, Error<D::Error>> {
        if self.session.is_some() {
            debug!("Previous cycle still running, skipping trigger");
            return Ok(false);
        }

        self.cycle.start();
        self.initiate_reading().await?;
        Ok(true)
    }

    /// Advances the running cycle by at most one step.
    ///
    /// Returns the distance of every zone in meters once the last zone is
    /// done, NaN for zones that failed, and `None` otherwise.
    ///
    /// # Errors
    ///
    /// * `Err(Error::Driver(E))` - On a bus failure. A failed poll can be
    ///   repeated. A failed start of the next zone abandons the cycle, and the
    ///   next [`update`](Self::update) starts a new one.
    pub async fn poll(&mut self) -> Result<Option<[f32; ZONE_COUNT]>, Error<D::Error>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        let distance = match session.poll(&mut self.driver).await? {
            SessionOutcome::Done(distance) => distance,
            _ => return Ok(None),
        };
        self.session = None;
        self.store_reading(distance).await
    }

    async fn initiate_reading(&mut self) -> Result<(), Error<D::Error>> {
        let Some(&roi) = self.cycle.roi() else {
            return Ok(());
        };
        match RangeReadingSession::start(&mut self.driver, roi, self.config.retry_budget).await {
            Ok(session) => {
                self.session = Some(session.with_timeout(self.config.max_pending_polls));
                Ok(())
            }
            Err(e) => {
                warn!("Could not start a reading, cycle abandoned");
                self.cycle.abort();
                Err(Error::Driver(e))
            }
        }
    }

    async fn store_reading(
        &mut self,
        distance: f32,
    ) -> Result<Option<[f32; ZONE_COUNT]>, Error<D::Error>> {
        self.cycle.set_result(distance);

        if self.cycle.next() {
            self.initiate_reading().await?;
            return Ok(None);
        }

        let distances = self.cycle.results();
        self.last_distances = distances;
        self.cycles_completed = self.cycles_completed.wrapping_add(1);
        debug!("Cycle done: [{}, {}] m", distances[0], distances[1]);
        Ok(Some(distances))
    }
}

impl<D> PresenceSensor<D> {
    /// Logs the active configuration.
    pub fn dump_config(&self) {
        let config = &self.config;
        info!(
            "Optical centers: [{},{}]",
            config.optical_centers[0].0,
            config.optical_centers[1].0
        );
        info!(
            "Distance thresholds: [{},{}] mm",
            config.distance_thresholds_mm[0],
            config.distance_thresholds_mm[1]
        );
        info!(
            "Distance mode: {}, timing budget: {} us, retry budget: {}",
            config.distance_mode.as_str(),
            config.effective_timing_budget_us(),
            config.retry_budget
        );
        for (zone, roi) in self.cycle.rois().iter().enumerate() {
            info!(
                "Zone {} ROI: [{},{}]-[{},{}]",
                zone,
                roi.top_left_x,
                roi.top_left_y,
                roi.bot_right_x,
                roi.bot_right_y
            );
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Per-zone distance thresholds in millimeters, for the consumer of the
    /// readings.
    #[must_use]
    pub fn distance_thresholds_mm(&self) -> [u16; ZONE_COUNT] {
        self.config.distance_thresholds_mm
    }

    /// ROI of each zone.
    #[must_use]
    pub fn zone_rois(&self) -> &[Roi; ZONE_COUNT] {
        self.cycle.rois()
    }

    /// Distances of the last completed cycle, all NaN before the first one.
    #[must_use]
    pub fn last_distances(&self) -> [f32; ZONE_COUNT] {
        self.last_distances
    }

    /// Number of cycles completed since creation.
    #[must_use]
    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// Whether a reading is in flight.
    #[must_use]
    pub fn is_measuring(&self) -> bool {
        self.session.is_some()
    }

    /// State of the zone cycle.
    #[must_use]
    pub fn cycle_state(&self) -> CycleState {
        self.cycle.state()
    }

    /// The underlying driver.
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Gives the driver back.
    #[must_use]
    pub fn release(self) -> D {
        self.driver
    }
}
