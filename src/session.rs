//! One non-blocking range reading, including its retries.

use crate::driver::{RangeStatus, RangingDriver};
use crate::roi::Roi;

/// What a poll of a [`RangeReadingSession`] found.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionOutcome {
    /// The measurement has not completed yet, poll again on the next tick
    Pending,
    /// The session is finished; the distance is in meters, NaN on failure
    Done(f32),
}

impl SessionOutcome {
    /// Returns the distance of a finished session.
    #[must_use]
    pub fn distance(self) -> Option<f32> {
        match self {
            SessionOutcome::Pending => None,
            SessionOutcome::Done(distance) => Some(distance),
        }
    }
}

/// A single-zone measurement in flight on the sensor.
///
/// The session is created by [`start`](Self::start), which programs the ROI
/// and triggers the first reading, and is then driven by calling
/// [`poll`](Self::poll) once per tick until it returns
/// [`SessionOutcome::Done`]. A reading with a status other than
/// [`RangeStatus::RangeValid`] is retried up to the retry budget given at
/// start; after that the session gives up with a NaN distance.
///
/// At most one session may be in flight on a sensor at any time.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeReadingSession {
    roi: Roi,
    retries_remaining: u8,
    last_status: Option<RangeStatus>,
    pending_polls: u32,
    max_pending_polls: Option<u32>,
    restart_pending: bool,
    outcome: Option<f32>,
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl RangeReadingSession {
    /// Programs `roi` and triggers the first reading.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the ROI could not be set or the reading
    /// could not be triggered.
    pub async fn start<D>(driver: &mut D, roi: Roi, retry_budget: u8) -> Result<Self, D::Error>
    where
        D: RangingDriver,
    {
        driver.set_user_roi(&roi).await?;
        driver.start_single_reading().await?;
        trace!(
            "Reading started on ROI [{},{}]-[{},{}]",
            roi.top_left_x,
            roi.top_left_y,
            roi.bot_right_x,
            roi.bot_right_y
        );

        Ok(Self {
            roi,
            retries_remaining: retry_budget,
            last_status: None,
            pending_polls: 0,
            max_pending_polls: None,
            restart_pending: false,
            outcome: None,
        })
    }

    /// Checks the sensor once and advances the session.
    ///
    /// Invalid readings are retried while the retry budget lasts. Once the
    /// session is done, further polls return the same outcome without
    /// touching the sensor.
    ///
    /// # Errors
    ///
    /// Returns the driver error of a failed bus transaction. The session stays
    /// pending and may be polled again; a retry whose trigger failed is
    /// triggered again by the next poll.
    pub async fn poll<D>(&mut self, driver: &mut D) -> Result<SessionOutcome, D::Error>
    where
        D: RangingDriver,
    {
        if let Some(distance) = self.outcome {
            return Ok(SessionOutcome::Done(distance));
        }

        if self.restart_pending {
            self.restart(driver).await?;
            return Ok(SessionOutcome::Pending);
        }

        if !driver.data_ready().await? {
            self.pending_polls = self.pending_polls.saturating_add(1);
            return match self.max_pending_polls {
                Some(limit) if self.pending_polls > limit => {
                    warn!("No data after {} polls, giving up", limit);
                    Ok(self.finish(f32::NAN))
                }
                _ => Ok(SessionOutcome::Pending),
            };
        }

        let reading = driver.read_range().await?;
        self.last_status = Some(reading.status);

        if reading.status.is_valid() {
            let distance = reading.distance_m();
            debug!("Got distance {} m", distance);
            return Ok(self.finish(distance));
        }

        if self.retries_remaining > 0 {
            warn!(
                "{} --> retrying {}",
                reading.status.as_str(),
                self.retries_remaining
            );
            self.restart_pending = true;
            self.restart(driver).await?;
            Ok(SessionOutcome::Pending)
        } else {
            warn!("{}", reading.status.as_str());
            Ok(self.finish(f32::NAN))
        }
    }

    async fn restart<D>(&mut self, driver: &mut D) -> Result<(), D::Error>
    where
        D: RangingDriver,
    {
        driver.start_single_reading().await?;
        self.restart_pending = false;
        self.retries_remaining -= 1;
        self.pending_polls = 0;
        Ok(())
    }
}

impl RangeReadingSession {
    /// Gives up with a NaN distance once more than `max_pending_polls`
    /// consecutive polls found no data. `None` waits forever.
    #[must_use]
    pub fn with_timeout(mut self, max_pending_polls: Option<u32>) -> Self {
        self.max_pending_polls = max_pending_polls;
        self
    }

    /// ROI the session measures.
    #[must_use]
    pub fn roi(&self) -> &Roi {
        &self.roi
    }

    /// Retries left before an invalid reading is accepted as a failure.
    #[must_use]
    pub fn retries_remaining(&self) -> u8 {
        self.retries_remaining
    }

    /// Status of the last reading taken, if any.
    #[must_use]
    pub fn last_status(&self) -> Option<RangeStatus> {
        self.last_status
    }

    /// Whether the session has finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.outcome.is_some()
    }

    fn finish(&mut self, distance: f32) -> SessionOutcome {
        self.outcome = Some(distance);
        SessionOutcome::Done(distance)
    }
}
