//! A platform-agnostic driver for the Holtek HT1382 I2C real-time clock.
//!
//! The HT1382 keeps the current time in seven contiguous binary-coded
//! decimal (BCD) registers, guarded by a write-protect flag in a separate
//! status register. This crate converts between the raw register contents
//! and a calendar date and time, and implements the read, write and
//! oscillator-restart sequences the chip requires.
//!
//! The driver works with any I2C bus that implements the `embedded-hal`
//! v1.0 [`I2c`] trait, such as `rppal`'s `I2c` on a Raspberry Pi or
//! `linux-embedded-hal`'s `I2cdev`. The bus is expected to be open and
//! configured before the driver is constructed; bus setup, device tree
//! registration and retry policies are left to the caller.
//!
//! [`I2c`]: https://docs.rs/embedded-hal/1/embedded_hal/i2c/trait.I2c.html

#![no_std]

pub mod registers;
pub mod rtc;
