//! Register-oriented bus access.
//!
//! The sensor is driven entirely through 8-bit register reads and writes. A
//! [`RegisterTransport`] hides how those reach the chip: the Linux adapter in
//! [`linux`] talks to `/dev/i2c-N` through `rppal`, [`HalTransport`] wraps any
//! `embedded-hal` I²C bus.
//!
//! Multi-byte values must come from a single burst transaction. The sensor
//! shadows its data registers for the duration of one burst, so reading MSB,
//! LSB and XLSB as separate transactions can mix two conversions.

pub mod linux;

use std::error::Error as StdError;
use std::fmt;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

/// Failure of the underlying channel.
#[derive(Debug)]
pub enum TransportError {
    /// The bus device could not be opened
    Open { bus: u8, source: rppal::i2c::Error },
    /// The slave address could not be selected
    SelectAddress { address: u16, source: rppal::i2c::Error },
    /// An I/O error during a register transaction on a Linux bus
    Io { reg: u8, source: rppal::i2c::Error },
    /// An `embedded-hal` bus reported an error
    Bus { reg: u8, kind: ErrorKind },
    /// The transaction moved fewer bytes than requested
    ShortTransfer {
        reg: u8,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Open { bus, .. } => write!(f, "cannot open I2C bus {}", bus),
            TransportError::SelectAddress { address, .. } => {
                write!(f, "cannot select I2C device at address {:#04x}", address)
            }
            TransportError::Io { reg, source } => {
                write!(f, "I2C transfer at register {:#04x} failed: {}", reg, source)
            }
            TransportError::Bus { reg, kind } => {
                write!(f, "I2C transfer at register {:#04x} failed: {}", reg, kind)
            }
            TransportError::ShortTransfer {
                reg,
                expected,
                actual,
            } => write!(
                f,
                "short I2C transfer at register {:#04x}: {} of {} bytes",
                reg, actual, expected
            ),
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Open { source, .. }
            | TransportError::SelectAddress { source, .. }
            | TransportError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Register read/write primitives of a single device.
///
/// Implementations are not expected to be safe for interleaved use: a
/// transaction is a register select followed by a data phase. Whoever owns
/// the transport owns the device.
pub trait RegisterTransport {
    /// Reads one register.
    fn read8(&mut self, reg: u8) -> Result<u8, TransportError>;

    /// Reads `buf.len()` consecutive registers starting at `reg` in one
    /// transaction. Either the whole buffer is filled or an error is returned.
    fn read_burst(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Writes one register.
    fn write8(&mut self, reg: u8, value: u8) -> Result<(), TransportError>;

    /// Reads two registers as a big-endian word.
    fn read16(&mut self, reg: u8) -> Result<u16, TransportError> {
        let mut buf = [0u8; 2];
        self.read_burst(reg, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Reads two registers as a little-endian word.
    fn read16_le(&mut self, reg: u8) -> Result<u16, TransportError> {
        Ok(self.read16(reg)?.swap_bytes())
    }

    fn read_signed16(&mut self, reg: u8) -> Result<i16, TransportError> {
        Ok(self.read16(reg)? as i16)
    }

    fn read_signed16_le(&mut self, reg: u8) -> Result<i16, TransportError> {
        Ok(self.read16_le(reg)? as i16)
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    fn read8(&mut self, reg: u8) -> Result<u8, TransportError> {
        (**self).read8(reg)
    }

    fn read_burst(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_burst(reg, buf)
    }

    fn write8(&mut self, reg: u8, value: u8) -> Result<(), TransportError> {
        (**self).write8(reg, value)
    }
}

/// Register transport over an `embedded-hal` I²C bus.
///
/// Every read is a single `write_read` transaction (repeated start), so
/// bursts are atomic on the wire.
pub struct HalTransport<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> HalTransport<I> {
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Releases the underlying bus.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterTransport for HalTransport<I> {
    fn read8(&mut self, reg: u8) -> Result<u8, TransportError> {
        let mut buf = [0u8; 1];
        self.read_burst(reg, &mut buf)?;
        Ok(buf[0])
    }

    fn read_burst(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), TransportError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|e| TransportError::Bus { reg, kind: e.kind() })
    }

    fn write8(&mut self, reg: u8, value: u8) -> Result<(), TransportError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|e| TransportError::Bus { reg, kind: e.kind() })
    }
}
