use std::sync::{Arc, Mutex};

use crate::bme280::registers::{adc16, adc20, ALL_ADC_LEN};

/// Raw ADC counts of one acquisition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    pub adc_temperature: i32,
    pub adc_pressure: i32,
    pub adc_humidity: i32,
}

impl RawSample {
    /// Decodes the 0xF7–0xFE measurement block.
    pub fn from_burst(data: &[u8; ALL_ADC_LEN]) -> Self {
        Self {
            adc_pressure: adc20(data[0], data[1], data[2]),
            adc_temperature: adc20(data[3], data[4], data[5]),
            adc_humidity: adc16(data[6], data[7]),
        }
    }
}

/// Temperature (°C), pressure (hPa) and relative humidity (%).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub temperature: f32,
    pub pressure: f32,
    pub humidity: f32,
}

impl Measurement {
    /// Values reported before the first accepted reading.
    pub const FALLBACK: Measurement = Measurement {
        temperature: 20.0,
        pressure: 1000.0,
        humidity: 50.0,
    };
}

impl Default for Measurement {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Last accepted readings, shareable with other threads.
///
/// The driver publishes into it after every accepted value; clones observe
/// the same triple. The three values are always read and written together.
#[derive(Clone, Debug, Default)]
pub struct SharedReadings(Arc<Mutex<Measurement>>);

impl SharedReadings {
    pub fn new(initial: Measurement) -> Self {
        SharedReadings(Arc::new(Mutex::new(initial)))
    }

    pub fn get(&self) -> Measurement {
        // a panic while holding the lock cannot leave a torn Copy value behind
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn publish(&self, readings: Measurement) {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = readings;
    }
}
