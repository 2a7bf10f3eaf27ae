//! Compensation formulas (datasheet BST-BME280-DS002, section 4.2.3 and
//! appendix 8.1/8.2).
//!
//! Temperature uses the floating-point formula, pressure the 64-bit integer
//! one and humidity the 32-bit integer one, exactly as Bosch publishes them.
//! The integer paths keep the reference widths and wrap on overflow the way
//! the reference C code does on two's-complement targets; reordering or
//! widening any step changes the rounding.
//!
//! All three are pure. `t_fine` is produced once per sample by
//! [`compensate_temperature`] and must be handed to the other two for the same
//! sample.

use std::error::Error as StdError;
use std::fmt;
use std::num::Wrapping;

use crate::bme280::calibration::CalibrationData;

/// The pressure divisor evaluated to zero.
///
/// Happens with a zero `dig_P1`, i.e. an erased or misread calibration block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DivisionGuard;

impl fmt::Display for DivisionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("pressure compensation divisor is zero")
    }
}

impl StdError for DivisionGuard {}

/// Compensates a raw 20-bit temperature value.
///
/// Returns the temperature in °C and `t_fine`, the fine-resolution
/// temperature the pressure and humidity formulas depend on.
pub fn compensate_temperature(adc_t: i32, calib: &CalibrationData) -> (f32, i32) {
    let adc_t = f64::from(adc_t);
    let t1 = f64::from(calib.dig_t1);

    let var1 = (adc_t / 16384.0 - t1 / 1024.0) * f64::from(calib.dig_t2);
    let delta = adc_t / 131072.0 - t1 / 8192.0;
    let var2 = delta * delta * f64::from(calib.dig_t3);

    let t_fine = (var1 + var2).floor() as i32;
    let celsius = (var1 + var2) / 5120.0;
    (celsius as f32, t_fine)
}

/// Compensates a raw 20-bit pressure value, returning hPa.
pub fn compensate_pressure(
    adc_p: i32,
    t_fine: i32,
    calib: &CalibrationData,
) -> Result<f32, DivisionGuard> {
    let p1 = Wrapping(i64::from(calib.dig_p1));
    let p2 = Wrapping(i64::from(calib.dig_p2));
    let p3 = Wrapping(i64::from(calib.dig_p3));
    let p4 = Wrapping(i64::from(calib.dig_p4));
    let p5 = Wrapping(i64::from(calib.dig_p5));
    let p6 = Wrapping(i64::from(calib.dig_p6));
    let p7 = Wrapping(i64::from(calib.dig_p7));
    let p8 = Wrapping(i64::from(calib.dig_p8));
    let p9 = Wrapping(i64::from(calib.dig_p9));

    let mut var1 = Wrapping(i64::from(t_fine)) - Wrapping(128_000);
    let mut var2 = var1 * var1 * p6;
    var2 += (var1 * p5) << 17;
    var2 += p4 << 35;
    var1 = ((var1 * var1 * p3) >> 8) + ((var1 * p2) << 12);
    var1 = ((Wrapping(1i64 << 47) + var1) * p1) >> 33;
    if var1.0 == 0 {
        return Err(DivisionGuard);
    }

    let mut p = Wrapping(1_048_576) - Wrapping(i64::from(adc_p));
    p = (((p << 31) - var2) * Wrapping(3125)) / var1;
    var1 = (p9 * (p >> 13) * (p >> 13)) >> 25;
    var2 = (p8 * p) >> 19;
    p = ((p + var1 + var2) >> 8) + (p7 << 4);

    // Q24.8 Pa -> hPa
    Ok((p.0 as f64 / 25600.0) as f32)
}

/// Compensates a raw 16-bit humidity value, returning %RH.
pub fn compensate_humidity(adc_h: i32, t_fine: i32, calib: &CalibrationData) -> f32 {
    let h1 = Wrapping(i32::from(calib.dig_h1));
    let h2 = Wrapping(i32::from(calib.dig_h2));
    let h3 = Wrapping(i32::from(calib.dig_h3));
    let h4 = Wrapping(i32::from(calib.dig_h4));
    let h5 = Wrapping(i32::from(calib.dig_h5));
    let h6 = Wrapping(i32::from(calib.dig_h6));

    let mut x = Wrapping(t_fine) - Wrapping(76_800);
    x = (((Wrapping(adc_h) << 14) - (h4 << 20) - (h5 * x) + Wrapping(16_384)) >> 15)
        * (((((((x * h6) >> 10) * (((x * h3) >> 11) + Wrapping(32_768))) >> 10)
            + Wrapping(2_097_152))
            * h2
            + Wrapping(8_192))
            >> 14);
    x -= ((((x >> 15) * (x >> 15)) >> 7) * h1) >> 4;

    // Q22.10 %RH
    let x = x.0.clamp(0, 419_430_400);
    (x >> 12) as f32 / 1024.0
}
