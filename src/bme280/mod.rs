pub mod calibration;
pub mod compensation;
pub mod config;
pub mod registers;
pub mod validity;

use std::error::Error as StdError;
use std::fmt;

use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

use crate::bme280::{
    calibration::CalibrationData,
    compensation::{compensate_humidity, compensate_pressure, compensate_temperature},
    config::{PowerMode, RegValType, Settings},
    registers::{
        adc16, adc20, Register, ALL_ADC_LEN, BME280_CHIP_ID, PRESS_TEMP_ADC_LEN,
        RESET_SETTLE_MS, STATUS_MEASURING, TEMP_ADC_LEN, TEMP_HUM_ADC_LEN,
    },
    validity::{ValidRange, HUMIDITY_RANGE, PRESSURE_RANGE, TEMPERATURE_RANGE},
};
use crate::structs::{Measurement, RawSample, SharedReadings};
use crate::transport::{linux, RegisterTransport, TransportError};

/// Lifecycle of a [`Bme280`].
///
/// ```text
/// Uninitialized ──init()──▶ Initializing ──▶ Ready
///                                 │
///                                 └────────▶ Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Initializing,
    Ready,
    /// Reads are refused until `init()` succeeds again
    Failed,
}

/// Errors during initialisation.
#[derive(Debug)]
pub enum InitError {
    /// Chip ID register did not read 0x60 (not a BME280)
    UnexpectedChipId(u8),
    /// Opening the bus or a register access failed
    Transport(TransportError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::UnexpectedChipId(id) => write!(
                f,
                "unexpected chip id {:#04x} (expected {:#04x})",
                id, BME280_CHIP_ID
            ),
            InitError::Transport(e) => write!(f, "initialisation failed: {}", e),
        }
    }
}

impl StdError for InitError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            InitError::Transport(e) => Some(e),
            InitError::UnexpectedChipId(_) => None,
        }
    }
}

impl From<TransportError> for InitError {
    fn from(e: TransportError) -> Self {
        InitError::Transport(e)
    }
}

/// Errors of the read operations.
#[derive(Debug)]
pub enum Error {
    Transport(TransportError),
    /// The driver is not in the `Ready` state
    NotReady(DriverState),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => e.fmt(f),
            Error::NotReady(state) => write!(f, "sensor not ready (state: {:?})", state),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::NotReady(_) => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

/// BME280 driver.
///
/// Owns the register transport, the delay provider, the calibration loaded by
/// the last successful [`init`](Bme280::init) and the last accepted readings.
/// All bus access goes through `&mut self`; to share one sensor between
/// threads, put the whole driver behind a mutex and read published values
/// through [`snapshot`](Bme280::snapshot).
pub struct Bme280<T, D> {
    transport: T,
    delay: D,
    settings: Settings,
    state: DriverState,
    calib: Option<CalibrationData>,
    last_good: Measurement,
    shared: SharedReadings,
}

impl Bme280<rppal::i2c::I2c, rppal::hal::Delay> {
    /// Opens `/dev/i2c-<bus>`, selects `address` and initialises the sensor.
    ///
    /// # Errors
    /// `InitError::Transport` if the bus cannot be opened or the address
    /// selected, `InitError::UnexpectedChipId` if the device is not a BME280.
    pub fn begin(address: u16, bus: u8, settings: Settings) -> Result<Self, InitError> {
        let i2c = linux::open(bus, address)?;
        let mut sensor = Bme280::with_settings(i2c, rppal::hal::Delay::new(), settings);
        sensor.init()?;
        Ok(sensor)
    }
}

impl<T: RegisterTransport, D: DelayNs> Bme280<T, D> {
    /// Creates an uninitialised driver with [`Settings::default`].
    pub fn new(transport: T, delay: D) -> Self {
        Self::with_settings(transport, delay, Settings::default())
    }

    pub fn with_settings(transport: T, delay: D, settings: Settings) -> Self {
        Self {
            transport,
            delay,
            settings,
            state: DriverState::Uninitialized,
            calib: None,
            last_good: Measurement::FALLBACK,
            shared: SharedReadings::new(Measurement::FALLBACK),
        }
    }

    /// Identifies, resets, calibrates and configures the sensor.
    ///
    /// Sequence:
    /// 1. Verify chip ID (0xD0 == 0x60)
    /// 2. Soft reset (0xE0 ← 0xB6), then wait 300 ms
    /// 3. Read calibration coefficients
    /// 4. Write ctrl_hum, config and ctrl_meas
    ///
    /// Can be called again from any state; last accepted readings survive.
    pub fn init(&mut self) -> Result<(), InitError> {
        self.state = DriverState::Initializing;
        self.calib = None;

        match self.run_init() {
            Ok(calib) => {
                self.calib = Some(calib);
                self.state = DriverState::Ready;
                debug!("bme280 ready");
                Ok(())
            }
            Err(e) => {
                self.state = DriverState::Failed;
                debug!("bme280 initialisation failed: {}", e);
                Err(e)
            }
        }
    }

    fn run_init(&mut self) -> Result<CalibrationData, InitError> {
        let chip_id = self.transport.read8(Register::Id.addr())?;
        if chip_id != BME280_CHIP_ID {
            return Err(InitError::UnexpectedChipId(chip_id));
        }
        debug!("chip id {:#04x}", chip_id);

        let [reg, val] = self.settings.make_reg_val(RegValType::Reset);
        self.transport.write8(reg, val)?;
        // the sensor ignores the bus while it copies its NVM
        self.delay.delay_ms(RESET_SETTLE_MS);

        let calib = CalibrationData::parse(&mut self.transport)?;
        self.write_settings()?;
        Ok(calib)
    }

    // ctrl_hum only latches on the following ctrl_meas write, and config must
    // land before ctrl_meas leaves sleep mode
    fn write_settings(&mut self) -> Result<(), TransportError> {
        for kind in [RegValType::Humidity, RegValType::Config, RegValType::Measurement].iter() {
            let [reg, val] = self.settings.make_reg_val(*kind);
            self.transport.write8(reg, val)?;
        }
        debug!("settings written: {:?}", self.settings);
        Ok(())
    }

    /// Replaces the acquisition settings of a ready sensor.
    ///
    /// The sensor is put to sleep first and the new mode is written last, as
    /// config writes may be ignored in normal mode.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), Error> {
        self.ready_calibration()?;
        let sleep = self.settings.with_mode(PowerMode::Sleep);
        let [reg, val] = sleep.make_reg_val(RegValType::Measurement);
        self.transport.write8(reg, val)?;

        self.settings = settings;
        self.write_settings()?;
        Ok(())
    }

    /// Reads the temperature in °C.
    pub fn read_temperature(&mut self) -> Result<f32, Error> {
        let calib = self.ready_calibration()?;
        self.trigger_forced()?;

        let mut buf = [0u8; TEMP_ADC_LEN];
        self.transport
            .read_burst(Register::TempMsb.addr(), &mut buf)?;
        let adc_t = adc20(buf[0], buf[1], buf[2]);
        trace!("adc_t={}", adc_t);

        let (celsius, _) = compensate_temperature(adc_t, &calib);
        let celsius = guard(
            "temperature",
            celsius,
            TEMPERATURE_RANGE,
            &mut self.last_good.temperature,
        );
        self.shared.publish(self.last_good);
        Ok(celsius)
    }

    /// Reads the pressure in hPa.
    ///
    /// Pressure and temperature registers are read in one burst, so `t_fine`
    /// belongs to the same conversion as the pressure value.
    pub fn read_pressure(&mut self) -> Result<f32, Error> {
        let calib = self.ready_calibration()?;
        self.trigger_forced()?;

        let mut buf = [0u8; PRESS_TEMP_ADC_LEN];
        self.transport
            .read_burst(Register::PressMsb.addr(), &mut buf)?;
        let adc_p = adc20(buf[0], buf[1], buf[2]);
        let adc_t = adc20(buf[3], buf[4], buf[5]);
        trace!("adc_p={} adc_t={}", adc_p, adc_t);

        let (_, t_fine) = compensate_temperature(adc_t, &calib);
        let hpa = self.pressure_or_last_good(adc_p, t_fine, &calib);
        self.shared.publish(self.last_good);
        Ok(hpa)
    }

    /// Reads the relative humidity in %.
    ///
    /// Temperature and humidity registers are read in one burst, so `t_fine`
    /// belongs to the same conversion as the humidity value.
    pub fn read_humidity(&mut self) -> Result<f32, Error> {
        let calib = self.ready_calibration()?;
        self.trigger_forced()?;

        let mut buf = [0u8; TEMP_HUM_ADC_LEN];
        self.transport
            .read_burst(Register::TempMsb.addr(), &mut buf)?;
        let adc_t = adc20(buf[0], buf[1], buf[2]);
        let adc_h = adc16(buf[3], buf[4]);
        trace!("adc_t={} adc_h={}", adc_t, adc_h);

        let (_, t_fine) = compensate_temperature(adc_t, &calib);
        let humidity = guard(
            "humidity",
            compensate_humidity(adc_h, t_fine, &calib),
            HUMIDITY_RANGE,
            &mut self.last_good.humidity,
        );
        self.shared.publish(self.last_good);
        Ok(humidity)
    }

    /// Reads all three quantities from one burst of 0xF7–0xFE.
    pub fn measure(&mut self) -> Result<Measurement, Error> {
        let calib = self.ready_calibration()?;
        self.trigger_forced()?;

        let mut buf = [0u8; ALL_ADC_LEN];
        self.transport
            .read_burst(Register::PressMsb.addr(), &mut buf)?;
        let raw = RawSample::from_burst(&buf);
        trace!("raw sample {:?}", raw);

        let (celsius, t_fine) = compensate_temperature(raw.adc_temperature, &calib);
        let temperature = guard(
            "temperature",
            celsius,
            TEMPERATURE_RANGE,
            &mut self.last_good.temperature,
        );
        let pressure = self.pressure_or_last_good(raw.adc_pressure, t_fine, &calib);
        let humidity = guard(
            "humidity",
            compensate_humidity(raw.adc_humidity, t_fine, &calib),
            HUMIDITY_RANGE,
            &mut self.last_good.humidity,
        );
        self.shared.publish(self.last_good);

        Ok(Measurement {
            temperature,
            pressure,
            humidity,
        })
    }

    /// Whether a conversion is running (status register bit 3).
    pub fn is_measuring(&mut self) -> Result<bool, Error> {
        self.ready_calibration()?;
        let status = self.transport.read8(Register::Status.addr())?;
        Ok(status & STATUS_MEASURING != 0)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Calibration of the current initialisation, if any.
    pub fn calibration(&self) -> Option<&CalibrationData> {
        self.calib.as_ref()
    }

    pub fn last_known_good(&self) -> Measurement {
        self.last_good
    }

    /// Handle to the last accepted readings for other threads.
    pub fn snapshot(&self) -> SharedReadings {
        self.shared.clone()
    }

    /// Releases the transport.
    pub fn release(self) -> T {
        self.transport
    }

    fn ready_calibration(&self) -> Result<CalibrationData, Error> {
        match (self.state, self.calib) {
            (DriverState::Ready, Some(calib)) => Ok(calib),
            (state, _) => Err(Error::NotReady(state)),
        }
    }

    // In forced mode the sensor sleeps after each conversion and has to be
    // re-triggered before fresh data can be read.
    fn trigger_forced(&mut self) -> Result<(), TransportError> {
        if self.settings.pmode != PowerMode::Forced {
            return Ok(());
        }
        let [reg, val] = self.settings.make_reg_val(RegValType::Measurement);
        self.transport.write8(reg, val)?;
        self.delay
            .delay_us(self.settings.max_measurement_time_us());
        Ok(())
    }

    fn pressure_or_last_good(&mut self, adc_p: i32, t_fine: i32, calib: &CalibrationData) -> f32 {
        match compensate_pressure(adc_p, t_fine, calib) {
            Ok(hpa) => guard("pressure", hpa, PRESSURE_RANGE, &mut self.last_good.pressure),
            Err(e) => {
                warn!("{}, keeping {} hPa", e, self.last_good.pressure);
                self.last_good.pressure
            }
        }
    }
}

fn guard(name: &str, value: f32, range: ValidRange, last_good: &mut f32) -> f32 {
    let accepted = validity::accept(value, range.min, range.max, *last_good);
    if !range.contains(value) {
        warn!("{} {} out of range, keeping {}", name, value, accepted);
    }
    *last_good = accepted;
    accepted
}
