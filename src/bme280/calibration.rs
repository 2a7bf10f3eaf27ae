//! BME280 factory calibration coefficients.
//!
//! The 26 trimming values live in two blocks of non-volatile memory
//! (datasheet BST-BME280-DS002, section 4.2.2 "Trimming parameter readout"):
//! 0x88–0x9F holds the temperature and pressure words (little-endian), 0xA1
//! and 0xE1–0xE7 the humidity values, two of which share a nibble at 0xE5.

use log::debug;

use crate::bme280::registers::Register;
use crate::transport::{RegisterTransport, TransportError};

/// Factory-trimmed calibration coefficients.
///
/// Immutable once parsed; the driver keeps one copy for the lifetime of an
/// initialisation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationData {
    /// Temperature coefficient 1 (unsigned, typical ~27000–28000)
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    /// Pressure coefficient 1 (unsigned, typical ~36000–38000)
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    /// 12-bit, packed across 0xE4 and the low nibble of 0xE5
    pub dig_h4: i16,
    /// 12-bit, packed across the high nibble of 0xE5 and 0xE6
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl CalibrationData {
    /// Reads the full calibration set from the sensor.
    ///
    /// Must be called after soft reset and chip ID verification. The first
    /// transport error aborts the read; no partial set is returned.
    pub fn parse<T: RegisterTransport + ?Sized>(
        transport: &mut T,
    ) -> Result<CalibrationData, TransportError> {
        let dig_t1 = transport.read16_le(Register::CalibT1.addr())?;
        let dig_t2 = transport.read_signed16_le(Register::CalibT2.addr())?;
        let dig_t3 = transport.read_signed16_le(Register::CalibT3.addr())?;

        let dig_p1 = transport.read16_le(Register::CalibP1.addr())?;
        let dig_p2 = transport.read_signed16_le(Register::CalibP2.addr())?;
        let dig_p3 = transport.read_signed16_le(Register::CalibP3.addr())?;
        let dig_p4 = transport.read_signed16_le(Register::CalibP4.addr())?;
        let dig_p5 = transport.read_signed16_le(Register::CalibP5.addr())?;
        let dig_p6 = transport.read_signed16_le(Register::CalibP6.addr())?;
        let dig_p7 = transport.read_signed16_le(Register::CalibP7.addr())?;
        let dig_p8 = transport.read_signed16_le(Register::CalibP8.addr())?;
        let dig_p9 = transport.read_signed16_le(Register::CalibP9.addr())?;

        let dig_h1 = transport.read8(Register::CalibH1.addr())?;
        let dig_h2 = transport.read_signed16_le(Register::CalibH2.addr())?;
        let dig_h3 = transport.read8(Register::CalibH3.addr())?;

        // 0xE4..=0xE6 in one burst, the shared nibble byte must not change between reads
        let mut packed = [0u8; 3];
        transport.read_burst(Register::CalibH4.addr(), &mut packed)?;
        let (dig_h4, dig_h5) = unpack_h4_h5(packed[0], packed[1], packed[2]);

        let dig_h6 = transport.read8(Register::CalibH6.addr())? as i8;

        let calib = CalibrationData {
            dig_t1,
            dig_t2,
            dig_t3,
            dig_p1,
            dig_p2,
            dig_p3,
            dig_p4,
            dig_p5,
            dig_p6,
            dig_p7,
            dig_p8,
            dig_p9,
            dig_h1,
            dig_h2,
            dig_h3,
            dig_h4,
            dig_h5,
            dig_h6,
        };
        debug!("calibration loaded: {:?}", calib);
        Ok(calib)
    }
}

/// Reassembles `dig_H4` and `dig_H5` from registers 0xE4, 0xE5 and 0xE6.
///
/// ```text
/// dig_H4 = 0xE4[7:0] << 4 | 0xE5[3:0]
/// dig_H5 = 0xE6[7:0] << 4 | 0xE5[7:4]
/// ```
///
/// The full byte of each pair is the signed high part, so both results are
/// sign-extended 12-bit values.
pub fn unpack_h4_h5(e4: u8, e5: u8, e6: u8) -> (i16, i16) {
    let dig_h4 = (i16::from(e4 as i8) << 4) | i16::from(e5 & 0x0F);
    let dig_h5 = (i16::from(e6 as i8) << 4) | i16::from(e5 >> 4);
    (dig_h4, dig_h5)
}
