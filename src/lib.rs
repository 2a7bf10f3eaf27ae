//! BME280 temperature, pressure and humidity sensor driver.
//!
//! ```no_run
//! use bme280_env::bme280::{config::Settings, registers::ADDR_PRIMARY, Bme280};
//!
//! let mut sensor = Bme280::begin(ADDR_PRIMARY, 1, Settings::default())?;
//! let m = sensor.measure()?;
//! println!("{:.2} C {:.2} hPa {:.2} %", m.temperature, m.pressure, m.humidity);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`bme280::Bme280`] works over any [`transport::RegisterTransport`]; the
//! crate provides one for Linux `/dev/i2c-N` buses and one for any
//! `embedded-hal` 1.0 I²C bus.

pub mod bme280;
pub mod structs;
pub mod transport;

pub use crate::bme280::{Bme280, DriverState, Error, InitError};
pub use crate::structs::{Measurement, SharedReadings};
pub use crate::transport::{HalTransport, RegisterTransport, TransportError};
