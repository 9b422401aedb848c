//! # VL53L1X Two-Zone Presence Sequencer
//!
//! This crate measures two regions of interest ("zones") of an ST-Microelectronics
//! VL53L1X time-of-flight sensor one after the other, without ever blocking the
//! caller, and hands the pair of distances to whatever decides about presence.
//!
//! The sensor itself is reached through the [`RangingDriver`] trait, so any
//! VL53L1X driver (blocking, or async with the `async` feature) can be plugged
//! in together with the bus it owns.
//!
//! ## Basic Usage
//!
#![cfg_attr(
    not(feature = "async"),
    doc = r#"
```rust,no_run
use vl53l1x_presence::{Config, DistanceMode, PresenceSensor, RangeReading, RangingDriver, Roi};
# struct Vl53l1x;
# impl RangingDriver for Vl53l1x {
#     type Error = ();
#     fn init(&mut self) -> Result<(), ()> { Ok(()) }
#     fn set_distance_mode(&mut self, _: DistanceMode) -> Result<(), ()> { Ok(()) }
#     fn set_measurement_timing_budget(&mut self, _: u32) -> Result<(), ()> { Ok(()) }
#     fn set_user_roi(&mut self, _: &Roi) -> Result<(), ()> { Ok(()) }
#     fn start_single_reading(&mut self) -> Result<(), ()> { Ok(()) }
#     fn data_ready(&mut self) -> Result<bool, ()> { Ok(false) }
#     fn read_range(&mut self) -> Result<RangeReading, ()> { Err(()) }
# }
# let driver = Vl53l1x;

let config = Config::default()
    .with_optical_centers([167, 231])
    .with_timing(DistanceMode::Long, 50_000);
let mut sensor = PresenceSensor::new(driver, config).unwrap();
sensor.setup().unwrap();

loop {
    // once per measurement period
    sensor.update().unwrap();

    // as often as possible in between
    if let Some([zone_1, zone_2]) = sensor.poll().unwrap() {
        println!("zone 1: {zone_1} m, zone 2: {zone_2} m");
    }
}
```
"#
)]
#![cfg_attr(
    feature = "async",
    doc = r#"
With the `async` feature every sensor operation is awaited:

```rust,no_run
use vl53l1x_presence::{Config, DistanceMode, PresenceSensor, RangeReading, RangingDriver, Roi};
# struct Vl53l1x;
# impl RangingDriver for Vl53l1x {
#     type Error = ();
#     async fn init(&mut self) -> Result<(), ()> { Ok(()) }
#     async fn set_distance_mode(&mut self, _: DistanceMode) -> Result<(), ()> { Ok(()) }
#     async fn set_measurement_timing_budget(&mut self, _: u32) -> Result<(), ()> { Ok(()) }
#     async fn set_user_roi(&mut self, _: &Roi) -> Result<(), ()> { Ok(()) }
#     async fn start_single_reading(&mut self) -> Result<(), ()> { Ok(()) }
#     async fn data_ready(&mut self) -> Result<bool, ()> { Ok(false) }
#     async fn read_range(&mut self) -> Result<RangeReading, ()> { Err(()) }
# }

async fn run(driver: Vl53l1x) -> Result<(), vl53l1x_presence::Error<()>> {
    let mut sensor = PresenceSensor::new(driver, Config::default())?;
    sensor.setup().await?;

    loop {
        sensor.update().await?;
        while sensor.is_measuring() {
            if let Some([zone_1, zone_2]) = sensor.poll().await? {
                println!("zone 1: {zone_1} m, zone 2: {zone_2} m");
            }
        }
    }
}
```
"#
)]
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod fmt; // <-- must be first module!

pub mod config;
pub mod cycle;
pub mod driver;
pub mod roi;
pub mod sensor;
pub mod session;

#[cfg(test)]
extern crate std;

#[cfg(all(test, not(feature = "async")))]
mod mock;

pub use config::Config;
pub use cycle::{CycleState, ZoneMeasurementCycle, ZONE_COUNT};
pub use driver::{DistanceMode, RangeReading, RangeStatus, RangingDriver};
pub use roi::{OpticalCenter, Roi};
pub use sensor::PresenceSensor;
pub use session::{RangeReadingSession, SessionOutcome};

/// Error type of the presence sensor.
///
/// Range readings that come back invalid are not errors: they are retried and
/// finally reported as a NaN distance. Errors are limited to an unusable
/// configuration and failures of the driver itself.
///
/// # Examples
///
/// ```rust,ignore
/// use vl53l1x_presence::{Config, Error, PresenceSensor};
///
/// match PresenceSensor::new(driver, Config::default().with_roi_size(16, 16)) {
///     Ok(_) => println!("Zones configured"),
///     Err(Error::InvalidArgument) => println!("Zones do not fit on the SPAD grid"),
///     Err(Error::Driver(e)) => println!("Driver error: {:?}", e),
/// }
/// ```
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E: core::fmt::Debug> {
    /// The sensor driver reported an error
    Driver(E),
    /// A configuration value was out of range
    InvalidArgument,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Driver(e) => write!(f, "driver error: {e:?}"),
            Error::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

impl<E: core::fmt::Debug> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Driver(error)
    }
}
