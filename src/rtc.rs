// Copyright (c) 2026 ht1382 contributors
//
// Permission is hereby granted, free of charge, to any person obtaining a
// copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
// THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

//! Interface for the HT1382 real-time clock.
//!
//! [`Ht1382`] drives the chip over any bus implementing the `embedded-hal`
//! v1.0 [`I2c`] trait. Every register access is a single combined bus
//! transaction: reads send the register address and read back the contents
//! in one addressed transfer, writes send the register address and payload
//! in one transfer. A short or failed transfer fails the whole operation;
//! no retries happen at this layer.
//!
//! ## Write protection
//!
//! The chip rejects writes to its time registers while the write-protect
//! flag in the status register is set. [`set_time`] therefore clears the
//! flag, writes the seven time registers, and sets the flag again — three
//! separate bus transactions with no rollback between them. If the second
//! or third transaction fails, the device may be left unprotected;
//! [`Error::leaves_unprotected`] reports this condition and
//! [`set_write_protect`] can restore protection without rewriting the time.
//!
//! ## Serialized access
//!
//! All methods take `&mut self` and block until the bus transaction
//! completes. A device must not be driven from multiple handles at once;
//! with the multi-step write sequence, interleaved access from a second
//! handle can corrupt the register contents.
//!
//! [`set_time`]: struct.Ht1382.html#method.set_time
//! [`set_write_protect`]: struct.Ht1382.html#method.set_write_protect
//! [`I2c`]: https://docs.rs/embedded-hal/1/embedded_hal/i2c/trait.I2c.html

use core::error;
use core::fmt;
use core::result;

use embedded_hal::i2c::I2c;

use crate::registers;
use crate::registers::{DateTime, RegisterBlock};

/// Default I2C slave address of the HT1382.
pub const ADDR_HT1382: u8 = 0x68;

/// Steps of the [`set_time`] write sequence.
///
/// [`set_time`]: struct.Ht1382.html#method.set_time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    /// Clearing the write-protect flag. On failure the device is still
    /// protected and the time registers are unchanged.
    ClearProtect,
    /// Writing the seven time registers. On failure write protection is
    /// left cleared.
    WriteRegisters,
    /// Re-asserting the write-protect flag. On failure the protection
    /// state is unknown.
    SetProtect,
}

/// Errors that can occur when accessing the HT1382.
#[derive(Debug)]
pub enum Error<E> {
    /// Bus transaction failed.
    Bus(E),
    /// The register contents read from the device, or the fields supplied
    /// by the caller, don't form a valid calendar date and time.
    InvalidTime(registers::Error),
    /// A step of the [`set_time`] write sequence failed.
    ///
    /// `step` identifies how far the sequence got. Unless the failing step
    /// was [`WriteStep::ClearProtect`], the device may be left with write
    /// protection cleared; call [`set_write_protect`] to restore it before
    /// retrying.
    ///
    /// [`set_time`]: struct.Ht1382.html#method.set_time
    /// [`set_write_protect`]: struct.Ht1382.html#method.set_write_protect
    WriteSequence {
        /// The step that failed.
        step: WriteStep,
        /// The underlying bus error.
        cause: E,
    },
}

impl<E> Error<E> {
    /// Returns `true` if the error may have left the device with write
    /// protection cleared.
    pub fn leaves_unprotected(&self) -> bool {
        matches!(
            self,
            Error::WriteSequence { step, .. } if *step != WriteStep::ClearProtect
        )
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(err) => write!(f, "Bus error: {:?}", err),
            Error::InvalidTime(err) => write!(f, "Invalid date/time: {}", err),
            Error::WriteSequence { step, cause } => {
                write!(f, "Write sequence failed at {:?}: {:?}", step, cause)
            }
        }
    }
}

impl<E: fmt::Debug> error::Error for Error<E> {}

impl<E> From<registers::Error> for Error<E> {
    fn from(err: registers::Error) -> Error<E> {
        Error::InvalidTime(err)
    }
}

/// Result type returned from methods that can have `rtc::Error`s.
pub type Result<T, E> = result::Result<T, Error<E>>;

/// Driver for the HT1382 real-time clock.
///
/// `Ht1382` owns the bus handle it is given and holds no other state; the
/// current time lives on the chip. See the [module documentation] for the
/// write-protect and serialization requirements.
///
/// [module documentation]: index.html
#[derive(Debug)]
pub struct Ht1382<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Ht1382<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Creates a new `Ht1382` on the chip's default slave address (0x68).
    pub fn new(i2c: I2C) -> Ht1382<I2C> {
        Ht1382::with_address(i2c, ADDR_HT1382)
    }

    /// Creates a new `Ht1382` using the specified slave address.
    pub fn with_address(i2c: I2C, address: u8) -> Ht1382<I2C> {
        Ht1382 { i2c, address }
    }

    /// Consumes the driver, returning the underlying bus handle.
    pub fn into_inner(self) -> I2C {
        self.i2c
    }

    /// Prepares a freshly attached device for timekeeping.
    ///
    /// Reads the seconds register and, if the oscillator-stop flag is set,
    /// clears the flag and writes the byte back to restart the oscillator.
    /// The BCD seconds value is preserved. A device that reports a halted
    /// oscillator has lost track of time; the caller should follow up with
    /// [`set_time`].
    ///
    /// [`set_time`]: #method.set_time
    pub fn init(&mut self) -> Result<(), E> {
        let mut reg = [0u8; 1];
        self.read_registers(registers::REG_SECONDS, &mut reg)
            .map_err(Error::Bus)?;

        if reg[0] & registers::STOP != 0 {
            reg[0] &= !registers::STOP;
            self.write_registers(registers::REG_SECONDS, &reg)
                .map_err(Error::Bus)?;
        }

        Ok(())
    }

    /// Returns `true` if the timekeeping oscillator is running.
    pub fn is_running(&mut self) -> Result<bool, E> {
        let mut reg = [0u8; 1];
        self.read_registers(registers::REG_SECONDS, &mut reg)
            .map_err(Error::Bus)?;

        Ok(reg[0] & registers::STOP == 0)
    }

    /// Returns the current date and time.
    ///
    /// Reads all seven time registers in a single bus transaction and
    /// converts the contents. Returns [`Error::InvalidTime`] if the
    /// register contents don't form a valid calendar date and time.
    pub fn time(&mut self) -> Result<DateTime, E> {
        let mut bytes = [0u8; 7];
        self.read_registers(registers::REG_SECONDS, &mut bytes)
            .map_err(Error::Bus)?;

        Ok(RegisterBlock::from_bytes(bytes).decode()?)
    }

    /// Sets the date and time.
    ///
    /// `time` is validated before any bus traffic; out-of-range fields
    /// return [`Error::InvalidTime`]. The write itself takes three bus
    /// transactions: clear the write-protect flag, write the seven time
    /// registers, set the write-protect flag. A failed transaction aborts
    /// the sequence and is reported as [`Error::WriteSequence`] with the
    /// step that failed.
    pub fn set_time(&mut self, time: &DateTime) -> Result<(), E> {
        if !time.is_valid() {
            return Err(Error::InvalidTime(registers::Error::OutOfRange));
        }

        self.write_registers(registers::REG_STATUS, &[0x00])
            .map_err(|cause| Error::WriteSequence {
                step: WriteStep::ClearProtect,
                cause,
            })?;

        let block = RegisterBlock::encode(time);
        self.write_registers(registers::REG_SECONDS, &block.to_bytes())
            .map_err(|cause| Error::WriteSequence {
                step: WriteStep::WriteRegisters,
                cause,
            })?;

        self.write_registers(registers::REG_STATUS, &[registers::WP])
            .map_err(|cause| Error::WriteSequence {
                step: WriteStep::SetProtect,
                cause,
            })
    }

    /// Sets or clears the write-protect flag in the status register.
    ///
    /// [`set_time`] manages the flag on its own; this method exists to
    /// restore protection after a write sequence failed partway through.
    ///
    /// [`set_time`]: #method.set_time
    pub fn set_write_protect(&mut self, enabled: bool) -> Result<(), E> {
        let reg = if enabled { registers::WP } else { 0x00 };
        self.write_registers(registers::REG_STATUS, &[reg])
            .map_err(Error::Bus)
    }

    /// Reads `bytes.len()` registers starting at `offset` in one combined
    /// write/read transaction.
    fn read_registers(&mut self, offset: u8, bytes: &mut [u8]) -> result::Result<(), E> {
        self.i2c.write_read(self.address, &[offset], bytes)
    }

    /// Writes `bytes` to the registers starting at `offset` in one bus
    /// transaction. `bytes` holds at most the seven time registers.
    fn write_registers(&mut self, offset: u8, bytes: &[u8]) -> result::Result<(), E> {
        let mut buffer = [0u8; 8];
        buffer[0] = offset;
        buffer[1..=bytes.len()].copy_from_slice(bytes);

        self.i2c.write(self.address, &buffer[..=bytes.len()])
    }
}
