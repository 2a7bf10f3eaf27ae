/// BME280 register map (Bosch Sensortec BME280 datasheet BST-BME280-DS002).
///
/// Key groups:
/// - **Measurement results** - 0xF7–0xFE (8 bytes): pressure (20-bit), temperature (20-bit),
///   humidity (16-bit)
/// - **Control registers** - 0xF2 (humidity), 0xF4 (temperature/pressure + mode), 0xF5 (IIR + standby)
/// - **Status** - 0xF3 (measuring / updating bits)
/// - **Reset & ID** - 0xE0 (soft reset), 0xD0 (chip ID)
/// - **Calibration** - 0x88–0x9F, 0xA1 and 0xE1–0xE7 (read-only, factory trimmed)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    HumLsb = 0xFE,
    HumMsb = 0xFD,
    TempXlsb = 0xFC,
    TempLsb = 0xFB,
    TempMsb = 0xFA,
    PressXlsb = 0xF9,
    PressLsb = 0xF8,
    PressMsb = 0xF7,
    Config = 0xF5,
    CtrlMeas = 0xF4,
    // bit 3 - conversion running, bit 0 - NVM data being copied
    Status = 0xF3,
    CtrlHum = 0xF2,
    // Writing 0xB6 runs the complete power-on-reset procedure
    Reset = 0xE0,
    // Must be 0x60 after start up
    Id = 0xD0,
    CalibT1 = 0x88,
    CalibT2 = 0x8A,
    CalibT3 = 0x8C,
    CalibP1 = 0x8E,
    CalibP2 = 0x90,
    CalibP3 = 0x92,
    CalibP4 = 0x94,
    CalibP5 = 0x96,
    CalibP6 = 0x98,
    CalibP7 = 0x9A,
    CalibP8 = 0x9C,
    CalibP9 = 0x9E,
    CalibH1 = 0xA1,
    CalibH2 = 0xE1,
    CalibH3 = 0xE3,
    CalibH4 = 0xE4,
    CalibH45 = 0xE5,
    CalibH5 = 0xE6,
    CalibH6 = 0xE7,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

pub const BME280_CHIP_ID: u8 = 0x60;
pub const BME280_RESET_REG_VALUE: u8 = 0xB6;

/// Time the sensor ignores the bus after a soft reset.
pub const RESET_SETTLE_MS: u32 = 300;

/// Default I²C addresses (SDO to GND / SDO to VDDIO).
pub const ADDR_PRIMARY: u16 = 0x76;
pub const ADDR_SECONDARY: u16 = 0x77;

/// Burst lengths for the ADC blocks.
pub const TEMP_ADC_LEN: usize = 3;
pub const PRESS_TEMP_ADC_LEN: usize = 6;
pub const TEMP_HUM_ADC_LEN: usize = 5;
pub const ALL_ADC_LEN: usize = 8;

/// Status register bit 3, set while a conversion is running.
pub const STATUS_MEASURING: u8 = 1 << 3;

/// Assembles a 20-bit ADC value from its MSB, LSB and XLSB registers.
///
/// Only the top four bits of XLSB carry data.
pub fn adc20(msb: u8, lsb: u8, xlsb: u8) -> i32 {
    (i32::from(msb) << 12) | (i32::from(lsb) << 4) | (i32::from(xlsb) >> 4)
}

/// Assembles the 16-bit humidity ADC value.
pub fn adc16(msb: u8, lsb: u8) -> i32 {
    (i32::from(msb) << 8) | i32::from(lsb)
}
