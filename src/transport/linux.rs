//! `/dev/i2c-N` transport through `rppal`.

use log::debug;
use rppal::i2c::I2c;

use super::{RegisterTransport, TransportError};

/// Opens I²C bus `bus` and selects the device at `address`.
///
/// Open and select failures are reported as distinct errors.
pub fn open(bus: u8, address: u16) -> Result<I2c, TransportError> {
    let mut i2c = I2c::with_bus(bus).map_err(|source| TransportError::Open { bus, source })?;
    i2c.set_slave_address(address)
        .map_err(|source| TransportError::SelectAddress { address, source })?;
    debug!("opened i2c bus {} at address {:#04x}", bus, address);
    Ok(i2c)
}

impl RegisterTransport for I2c {
    fn read8(&mut self, reg: u8) -> Result<u8, TransportError> {
        self.smbus_read_byte(reg)
            .map_err(|source| TransportError::Io { reg, source })
    }

    // one I2C_RDWR ioctl: register select and data phase joined by a repeated start
    fn read_burst(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), TransportError> {
        self.write_read(&[reg], buf)
            .map_err(|source| TransportError::Io { reg, source })
    }

    fn write8(&mut self, reg: u8, value: u8) -> Result<(), TransportError> {
        self.smbus_write_byte(reg, value)
            .map_err(|source| TransportError::Io { reg, source })
    }
}
