use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use crate::bme280::registers::{Register, BME280_RESET_REG_VALUE};

/// Oversampling setting for humidity (osrs_h[2:0] in ctrl_hum 0xF2, bits 2:0).
///
/// Changes to ctrl_hum only take effect after the next write to ctrl_meas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum HumidityOversampling {
    Skipped = 0x00,
    X1 = 0x01,
    X2 = 0x02,
    X4 = 0x03,
    X8 = 0x04,
    X16 = 0x05,
}

/// Oversampling setting for temperature (osrs_t[2:0] in ctrl_meas 0xF4, bits 7:5).
///
/// | Variant | osrs_t | Bits | Resolution |
/// |---------|--------|------|------------|
/// | X1      | 001    | 0x20 | 16 bit     |
/// | X2      | 010    | 0x40 | 17 bit     |
/// | X4      | 011    | 0x60 | 18 bit     |
/// | X8      | 100    | 0x80 | 19 bit     |
/// | X16     | 101    | 0xA0 | 20 bit     |
///
/// Skipping temperature also freezes `t_fine`, so pressure and humidity
/// become meaningless.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TemperatureOversampling {
    Skipped = 0x00,
    X1 = 0x20,
    X2 = 0x40,
    X4 = 0x60,
    X8 = 0x80,
    X16 = 0xA0,
}

/// Oversampling setting for pressure (osrs_p[2:0] in ctrl_meas 0xF4, bits 4:2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PressureOversampling {
    Skipped = 0x00,
    X1 = 0x04,
    X2 = 0x08,
    X4 = 0x0C,
    X8 = 0x10,
    X16 = 0x14,
}

/// Power mode (mode[1:0] in ctrl_meas 0xF4, bits 1:0).
///
/// | Variant | Value | Behavior                                                    |
/// |---------|-------|-------------------------------------------------------------|
/// | Sleep   | 0x00  | No measurements; registers readable                         |
/// | Forced  | 0x01  | One measurement cycle, then back to sleep; host re-triggers |
/// | Normal  | 0x03  | Continuous: measure → standby (t_sb) → measure              |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMode {
    Sleep = 0x00,
    Forced = 0x01,
    Normal = 0x03,
}

/// IIR filter coefficient (filter[2:0] in config 0xF5, bits 4:2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum IirFilter {
    Off = 0x00,
    X2 = 0x04,
    X4 = 0x08,
    X8 = 0x0C,
    X16 = 0x10,
}

/// Standby duration in Normal mode (t_sb[2:0] in config 0xF5, bits 7:5).
///
/// Note the BME280 ordering: 110 and 111 are 10 ms and 20 ms, not the
/// 2 s / 4 s of the BMP280.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StandbyTime {
    Ms0_5 = 0x00,
    Ms62_5 = 0x20,
    Ms125 = 0x40,
    Ms250 = 0x60,
    Ms500 = 0x80,
    Ms1000 = 0xA0,
    Ms10 = 0xC0,
    Ms20 = 0xE0,
}

/// Recommended modes of operation (datasheet section 3.5).
///
/// | Preset           | Mode   | osrs T/P/H      | Filter | Standby |
/// |------------------|--------|-----------------|--------|---------|
/// | WeatherMonitoring| Forced | ×1 / ×1 / ×1    | Off    | -       |
/// | HumiditySensing  | Forced | ×1 / skip / ×1  | Off    | -       |
/// | IndoorNavigation | Normal | ×2 / ×16 / ×1   | ×16    | 0.5 ms  |
/// | Gaming           | Normal | ×1 / ×4 / skip  | ×16    | 0.5 ms  |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    WeatherMonitoring,
    HumiditySensing,
    IndoorNavigation,
    Gaming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePresetError(String);

impl fmt::Display for ParsePresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown preset '{}' (expected weather, humidity, indoor or gaming)",
            self.0
        )
    }
}

impl StdError for ParsePresetError {}

impl FromStr for Preset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weather" => Ok(Preset::WeatherMonitoring),
            "humidity" => Ok(Preset::HumiditySensing),
            "indoor" => Ok(Preset::IndoorNavigation),
            "gaming" => Ok(Preset::Gaming),
            _ => Err(ParsePresetError(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegValType {
    Humidity,
    Measurement,
    Config,
    Reset,
}

/// Sensor acquisition settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub hovrs: HumidityOversampling,
    pub tovrs: TemperatureOversampling,
    pub povrs: PressureOversampling,
    pub pmode: PowerMode,
    pub iir: IirFilter,
    pub stdby: StandbyTime,
}

impl Settings {
    pub fn new(
        hovrs: HumidityOversampling,
        tovrs: TemperatureOversampling,
        povrs: PressureOversampling,
        pmode: PowerMode,
        iir: IirFilter,
        stdby: StandbyTime,
    ) -> Self {
        Self {
            hovrs,
            tovrs,
            povrs,
            pmode,
            iir,
            stdby,
        }
    }

    /// Settings for one of the datasheet's recommended use cases.
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::WeatherMonitoring => Self {
                hovrs: HumidityOversampling::X1,
                tovrs: TemperatureOversampling::X1,
                povrs: PressureOversampling::X1,
                pmode: PowerMode::Forced,
                iir: IirFilter::Off,
                stdby: StandbyTime::Ms0_5,
            },

            Preset::HumiditySensing => Self {
                hovrs: HumidityOversampling::X1,
                tovrs: TemperatureOversampling::X1,
                povrs: PressureOversampling::Skipped,
                pmode: PowerMode::Forced,
                iir: IirFilter::Off,
                stdby: StandbyTime::Ms0_5,
            },

            Preset::IndoorNavigation => Self {
                hovrs: HumidityOversampling::X1,
                tovrs: TemperatureOversampling::X2,
                povrs: PressureOversampling::X16,
                pmode: PowerMode::Normal,
                iir: IirFilter::X16,
                stdby: StandbyTime::Ms0_5,
            },

            Preset::Gaming => Self {
                hovrs: HumidityOversampling::Skipped,
                tovrs: TemperatureOversampling::X1,
                povrs: PressureOversampling::X4,
                pmode: PowerMode::Normal,
                iir: IirFilter::X16,
                stdby: StandbyTime::Ms0_5,
            },
        }
    }

    pub fn with_humidity_oversampling(mut self, hovrs: HumidityOversampling) -> Self {
        self.hovrs = hovrs;
        self
    }

    pub fn with_temperature_oversampling(mut self, tovrs: TemperatureOversampling) -> Self {
        self.tovrs = tovrs;
        self
    }

    pub fn with_pressure_oversampling(mut self, povrs: PressureOversampling) -> Self {
        self.povrs = povrs;
        self
    }

    pub fn with_mode(mut self, pmode: PowerMode) -> Self {
        self.pmode = pmode;
        self
    }

    pub fn with_filter(mut self, iir: IirFilter) -> Self {
        self.iir = iir;
        self
    }

    pub fn with_standby_time(mut self, stdby: StandbyTime) -> Self {
        self.stdby = stdby;
        self
    }

    /// Generates a `[register, value]` pair ready to be written.
    ///
    /// - `RegValType::Humidity`    → `0xF2` (osrs_h)
    /// - `RegValType::Measurement` → `0xF4` (osrs_t + osrs_p + mode)
    /// - `RegValType::Config`      → `0xF5` (t_sb + filter, 3-wire SPI off)
    /// - `RegValType::Reset`       → `0xB6` to `0xE0`
    pub fn make_reg_val(&self, reg_val_type: RegValType) -> [u8; 2] {
        match reg_val_type {
            RegValType::Humidity => [Register::CtrlHum.addr(), self.hovrs as u8],
            RegValType::Measurement => [
                Register::CtrlMeas.addr(),
                self.tovrs as u8 | self.povrs as u8 | self.pmode as u8,
            ],
            RegValType::Config => [Register::Config.addr(), self.stdby as u8 | self.iir as u8],
            RegValType::Reset => [Register::Reset.addr(), BME280_RESET_REG_VALUE],
        }
    }

    /// Upper bound of one measurement cycle in microseconds (datasheet
    /// appendix 9.1, t_measure,max).
    pub fn max_measurement_time_us(&self) -> u32 {
        let t = oversampling_factor(self.tovrs as u8 >> 5);
        let p = oversampling_factor(self.povrs as u8 >> 2);
        let h = oversampling_factor(self.hovrs as u8);

        let mut us = 1_250 + 2_300 * t;
        if p > 0 {
            us += 2_300 * p + 575;
        }
        if h > 0 {
            us += 2_300 * h + 575;
        }
        us
    }
}

fn oversampling_factor(osrs: u8) -> u32 {
    match osrs {
        0 => 0,
        n @ 1..=5 => 1 << (n - 1),
        _ => 16,
    }
}

/// Humidity ×1, temperature ×1, pressure ×1, normal mode, 0.5 ms standby,
/// filter off.
impl Default for Settings {
    fn default() -> Self {
        Self {
            hovrs: HumidityOversampling::X1,
            tovrs: TemperatureOversampling::X1,
            povrs: PressureOversampling::X1,
            pmode: PowerMode::Normal,
            iir: IirFilter::Off,
            stdby: StandbyTime::Ms0_5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_register_values() {
        let settings = Settings::default();
        assert_eq!(settings.make_reg_val(RegValType::Humidity), [0xF2, 0x01]);
        assert_eq!(settings.make_reg_val(RegValType::Measurement), [0xF4, 0x27]);
        assert_eq!(settings.make_reg_val(RegValType::Config), [0xF5, 0x00]);
        assert_eq!(settings.make_reg_val(RegValType::Reset), [0xE0, 0xB6]);
    }

    #[test]
    fn builder_overrides_fields() {
        let settings = Settings::default()
            .with_temperature_oversampling(TemperatureOversampling::X2)
            .with_pressure_oversampling(PressureOversampling::X16)
            .with_mode(PowerMode::Forced)
            .with_filter(IirFilter::X4)
            .with_standby_time(StandbyTime::Ms1000);

        assert_eq!(settings.make_reg_val(RegValType::Measurement), [0xF4, 0x55]);
        assert_eq!(settings.make_reg_val(RegValType::Config), [0xF5, 0xA8]);
    }

    #[test]
    fn indoor_navigation_preset() {
        let settings = Settings::from_preset(Preset::IndoorNavigation);
        assert_eq!(settings.make_reg_val(RegValType::Humidity), [0xF2, 0x01]);
        assert_eq!(settings.make_reg_val(RegValType::Measurement), [0xF4, 0x57]);
        assert_eq!(settings.make_reg_val(RegValType::Config), [0xF5, 0x10]);
    }

    #[test]
    fn measurement_time_follows_datasheet() {
        // weather monitoring: 1.25 + 2.3 + 2.875 + 2.875 ms
        let weather = Settings::from_preset(Preset::WeatherMonitoring);
        assert_eq!(weather.max_measurement_time_us(), 9_300);

        let humidity = Settings::from_preset(Preset::HumiditySensing);
        assert_eq!(humidity.max_measurement_time_us(), 6_425);
    }

    #[test]
    fn presets_parse_from_cli_names() {
        assert_eq!("weather".parse::<Preset>(), Ok(Preset::WeatherMonitoring));
        assert_eq!("Indoor".parse::<Preset>(), Ok(Preset::IndoorNavigation));
        assert!("altitude".parse::<Preset>().is_err());
    }
}
