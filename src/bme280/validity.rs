//! Plausibility check for compensated values.
//!
//! Bus glitches and power-on transients occasionally produce values outside
//! the sensor's operating range. Those are replaced by the last accepted
//! value instead of being reported as errors, so a polling loop keeps going.

/// Inclusive operating range of one quantity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidRange {
    pub min: f32,
    pub max: f32,
}

impl ValidRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        !value.is_nan() && value >= self.min && value <= self.max
    }
}

pub const TEMPERATURE_RANGE: ValidRange = ValidRange::new(-40.0, 85.0);
pub const PRESSURE_RANGE: ValidRange = ValidRange::new(300.0, 1100.0);
pub const HUMIDITY_RANGE: ValidRange = ValidRange::new(0.0, 100.0);

/// Returns `value` if it is a number within `[min, max]`, `last_good` otherwise.
#[inline]
pub fn accept(value: f32, min: f32, max: f32, last_good: f32) -> f32 {
    if ValidRange::new(min, max).contains(value) {
        value
    } else {
        last_good
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_values_pass_through() {
        assert_eq!(accept(21.5, -40.0, 85.0, 20.0), 21.5);
        assert_eq!(accept(-40.0, -40.0, 85.0, 20.0), -40.0);
        assert_eq!(accept(85.0, -40.0, 85.0, 20.0), 85.0);
    }

    #[test]
    fn nan_is_replaced() {
        assert_eq!(accept(f32::NAN, 300.0, 1100.0, 1000.0), 1000.0);
    }

    #[test]
    fn out_of_range_is_replaced() {
        assert_eq!(accept(299.9, 300.0, 1100.0, 1012.0), 1012.0);
        assert_eq!(accept(100.01, 0.0, 100.0, 48.0), 48.0);
        assert_eq!(accept(f32::INFINITY, 0.0, 100.0, 48.0), 48.0);
    }

    #[test]
    fn ranges_match_operating_envelope() {
        assert!(TEMPERATURE_RANGE.contains(25.0));
        assert!(!TEMPERATURE_RANGE.contains(-140.0));
        assert!(PRESSURE_RANGE.contains(1006.53));
        assert!(!PRESSURE_RANGE.contains(0.0));
        assert!(HUMIDITY_RANGE.contains(0.0));
        assert!(!HUMIDITY_RANGE.contains(f32::NAN));
    }
}
