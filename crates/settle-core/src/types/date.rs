//! Packed date type for financial calculations.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{SettleError, SettleResult};

/// First supported year.
pub const MIN_YEAR: i32 = 1900;

/// Last supported year.
pub const MAX_YEAR: i32 = 2150;

/// Ten-minute ticks per day.
pub const TICKS_PER_DAY: u32 = 144;

/// Julian day number of 01-Jan-1900.
const JULIAN_1900: i32 = 2_415_021;

const YEARS: usize = (MAX_YEAR - MIN_YEAR + 1) as usize;

/// Julian day number of 1 January for every supported year, plus one
/// trailing entry for 1 January of the year after the last.
const YEAR_START: [i32; YEARS + 1] = {
    let mut table = [0i32; YEARS + 1];
    table[0] = JULIAN_1900;
    let mut i = 0;
    while i < YEARS {
        let len = if is_leap_year(MIN_YEAR + i as i32) { 366 } else { 365 };
        table[i + 1] = table[i] + len;
        i += 1;
    }
    table
};

/// Days before the first of each month, indexed `[leap][month - 1]`.
const MONTH_START: [[u32; 13]; 2] = [
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365],
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366],
];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Returns true if `year` is a leap year.
///
/// Inside the supported window the Gregorian rule reduces to "divisible by
/// four, except 1900 and 2100".
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && year != 1900 && year != 2100
}

/// Returns the number of days in `month` of `year`, or 0 for an invalid month.
#[must_use]
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

const fn pack(year: i32, month: u32, day: u32, ticks: u32) -> u32 {
    ((year - MIN_YEAR) as u32) << 24 | month << 16 | day << 8 | ticks
}

/// A calendar date with an intraday offset in ten-minute ticks.
///
/// The value is packed into a `u32` as `year - 1900`, month, day and ticks,
/// one byte each, so equality and ordering on the integer are the
/// lexicographic order on (year, month, day, ticks). All four fields zero is
/// the distinguished [`Dt::EMPTY`] value; every other value is a real
/// Gregorian date between 01-Jan-1900 and 31-Dec-2150.
///
/// # Example
///
/// ```rust
/// use settle_core::types::Dt;
///
/// let date = Dt::new(15, 6, 2025).unwrap();
/// assert_eq!(date.to_int(), 20250615);
/// assert_eq!(date.to_string(), "15-Jun-2025");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dt(u32);

impl Dt {
    /// The empty date.
    pub const EMPTY: Dt = Dt(0);

    /// The earliest supported date, 01-Jan-1900.
    pub const MIN: Dt = Dt(pack(MIN_YEAR, 1, 1, 0));

    /// The latest supported value, 31-Dec-2150 at the last tick of the day.
    pub const MAX: Dt = Dt(pack(MAX_YEAR, 12, 31, TICKS_PER_DAY - 1));

    /// Creates a date from day, month and year.
    ///
    /// `(0, 0, 0)` yields [`Dt::EMPTY`].
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` if the triple is not a supported date.
    pub fn new(day: u32, month: u32, year: i32) -> SettleResult<Self> {
        Self::from_parts(day, month, year, 0)
    }

    /// Creates a date with a time of day. Seconds are validated and then
    /// truncated to the enclosing ten-minute tick.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` for an invalid date or time.
    pub fn with_time(
        day: u32,
        month: u32,
        year: i32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> SettleResult<Self> {
        if hour >= 24 || minute >= 60 || second >= 60 {
            return Err(SettleError::out_of_range(format!(
                "time {hour:02}:{minute:02}:{second:02}"
            )));
        }
        Self::from_parts(day, month, year, (hour * 60 + minute) / 10)
    }

    fn from_parts(day: u32, month: u32, year: i32, ticks: u32) -> SettleResult<Self> {
        if day == 0 && month == 0 && year == 0 && ticks == 0 {
            return Ok(Self::EMPTY);
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year)
            || !(1..=12).contains(&month)
            || day == 0
            || day > days_in_month(year, month)
            || ticks >= TICKS_PER_DAY
        {
            return Err(SettleError::out_of_range(format!(
                "{day:02}/{month:02}/{year} tick {ticks}"
            )));
        }
        Ok(Dt(pack(year, month, day, ticks)))
    }

    /// Creates a date from a `YYYYMMDD` integer. Zero yields [`Dt::EMPTY`].
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` if the integer is not a supported date.
    pub fn from_int(yyyymmdd: i32) -> SettleResult<Self> {
        if yyyymmdd == 0 {
            return Ok(Self::EMPTY);
        }
        if yyyymmdd < 0 {
            return Err(SettleError::out_of_range(format!("date code {yyyymmdd}")));
        }
        let year = yyyymmdd / 10_000;
        let month = (yyyymmdd / 100 % 100) as u32;
        let day = (yyyymmdd % 100) as u32;
        if year == 0 {
            return Err(SettleError::out_of_range(format!("date code {yyyymmdd}")));
        }
        Self::new(day, month, year)
    }

    /// Creates a date from a Julian day number.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` outside 1900..=2150.
    pub fn from_julian(julian: i32) -> SettleResult<Self> {
        if julian < YEAR_START[0] || julian >= YEAR_START[YEARS] {
            return Err(SettleError::out_of_range(format!("julian day {julian}")));
        }
        let index = YEAR_START.partition_point(|&start| start <= julian) - 1;
        let year = MIN_YEAR + index as i32;
        let ordinal = (julian - YEAR_START[index]) as u32;
        let table = &MONTH_START[usize::from(is_leap_year(year))];
        let month = table.partition_point(|&start| start <= ordinal) as u32;
        let day = ordinal - table[month as usize - 1] + 1;
        Ok(Dt(pack(year, month, day, 0)))
    }

    /// Creates a date from continuous time: days since 01-Jan-1900 over 365.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` for non-finite or unsupported values.
    pub fn from_time(time: f64) -> SettleResult<Self> {
        if !time.is_finite() {
            return Err(SettleError::out_of_range(format!("time {time}")));
        }
        let days = time * 365.0;
        let mut whole = days.floor();
        let mut ticks = ((days - whole) * f64::from(TICKS_PER_DAY)).round();
        if ticks >= f64::from(TICKS_PER_DAY) {
            whole += 1.0;
            ticks = 0.0;
        }
        if whole < 0.0 || whole > f64::from(YEAR_START[YEARS] - JULIAN_1900) {
            return Err(SettleError::out_of_range(format!("time {time}")));
        }
        let date = Self::from_julian(JULIAN_1900 + whole as i32)?;
        Ok(Dt(date.0 | ticks as u32))
    }

    /// Creates a date from a spreadsheet serial number.
    ///
    /// Serial 1 is 01-Jan-1900 and serial 60 is the non-existent 29-Feb-1900
    /// kept by spreadsheets for compatibility; serial 0 yields [`Dt::EMPTY`].
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` for serial 60 and unsupported values.
    pub fn from_serial(serial: i32) -> SettleResult<Self> {
        match serial {
            0 => Ok(Self::EMPTY),
            1..=59 => Self::from_julian(JULIAN_1900 + serial - 1),
            60 => Err(SettleError::out_of_range("serial 60 (29-Feb-1900)")),
            s if s > 60 => Self::from_julian(JULIAN_1900 + s - 2),
            s => Err(SettleError::out_of_range(format!("serial {s}"))),
        }
    }

    /// Converts a timestamp, clamping instead of failing: anything before
    /// 01-Jan-1900 becomes [`Dt::EMPTY`] and anything after the end of 2150
    /// becomes [`Dt::MAX`].
    #[must_use]
    pub fn from_datetime_clamped(value: NaiveDateTime) -> Self {
        if value.year() < MIN_YEAR {
            Self::EMPTY
        } else if value.year() > MAX_YEAR {
            Self::MAX
        } else {
            Self::try_from(value).unwrap_or(Self::EMPTY)
        }
    }

    /// Returns the Nth occurrence of `weekday` in a month (`nth` from 1).
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` if the month has no such occurrence.
    pub fn nth_weekday(year: i32, month: u32, nth: u32, weekday: Weekday) -> SettleResult<Self> {
        let first = Self::new(1, month, year)?;
        let offset = (7 + weekday.num_days_from_monday() - first.day_of_week().num_days_from_monday()) % 7;
        let day = 1 + offset + 7 * nth.saturating_sub(1);
        if nth == 0 || day > days_in_month(year, month) {
            return Err(SettleError::out_of_range(format!(
                "occurrence {nth} of {weekday} in {month:02}/{year}"
            )));
        }
        Self::new(day, month, year)
    }

    /// Returns the last occurrence of `weekday` in a month.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` for an invalid month.
    pub fn last_weekday(year: i32, month: u32, weekday: Weekday) -> SettleResult<Self> {
        let last = Self::new(days_in_month(year, month), month, year)?;
        let back = (7 + last.day_of_week().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
        Self::new(last.day() - back, month, year)
    }

    /// Builds a date from parts already known to be valid.
    pub(crate) const fn from_ymd_unchecked(year: i32, month: u32, day: u32) -> Self {
        Dt(pack(year, month, day, 0))
    }

    /// Returns this date carrying the intraday offset of `source`.
    pub(crate) fn with_ticks_of(self, source: Dt) -> Self {
        if self.is_empty() {
            self
        } else {
            Dt((self.0 & !0xFF) | source.ticks())
        }
    }

    /// Returns true for the empty date.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the date unchanged, or `EmptyDate` naming `operation`.
    pub(crate) fn require(self, operation: &'static str) -> SettleResult<Self> {
        if self.is_empty() {
            Err(SettleError::empty_date(operation))
        } else {
            Ok(self)
        }
    }

    /// Returns the year (0 for the empty date).
    #[must_use]
    pub fn year(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            MIN_YEAR + (self.0 >> 24) as i32
        }
    }

    /// Returns the month (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        (self.0 >> 16) & 0xFF
    }

    /// Returns the day of month (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        (self.0 >> 8) & 0xFF
    }

    /// Returns the intraday tick (0-143).
    #[must_use]
    pub fn ticks(&self) -> u32 {
        self.0 & 0xFF
    }

    /// Returns the hour of the intraday offset.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.ticks() / 6
    }

    /// Returns the minute of the intraday offset (a multiple of ten).
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.ticks() % 6 * 10
    }

    /// Returns the same date with the intraday offset removed.
    #[must_use]
    pub fn date_only(&self) -> Self {
        Dt(self.0 & !0xFF)
    }

    /// Returns the date as a `YYYYMMDD` integer (0 for the empty date).
    #[must_use]
    pub fn to_int(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.year() * 10_000 + (self.month() * 100 + self.day()) as i32
        }
    }

    /// Returns the Julian day number (0 for the empty date).
    #[must_use]
    pub fn to_julian(&self) -> i32 {
        if self.is_empty() {
            return 0;
        }
        let index = (self.year() - MIN_YEAR) as usize;
        YEAR_START[index] + self.day_of_year() as i32 - 1
    }

    /// Returns days since 01-Jan-1900 plus the intraday fraction, over 365.
    #[must_use]
    pub fn to_time(&self) -> f64 {
        let days = f64::from(self.to_julian() - JULIAN_1900);
        (days + f64::from(self.ticks()) / f64::from(TICKS_PER_DAY)) / 365.0
    }

    /// Returns the spreadsheet serial number (0 for the empty date).
    #[must_use]
    pub fn to_serial(&self) -> i32 {
        if self.is_empty() {
            return 0;
        }
        let days = self.to_julian() - JULIAN_1900;
        if days < 59 {
            days + 1
        } else {
            days + 2
        }
    }

    /// Returns the day of week.
    #[must_use]
    pub fn day_of_week(&self) -> Weekday {
        match self.to_julian().rem_euclid(7) {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    /// Returns the day of year (1-366).
    #[must_use]
    pub fn day_of_year(&self) -> u32 {
        let table = &MONTH_START[usize::from(self.is_leap_year())];
        table[(self.month().max(1) - 1) as usize] + self.day()
    }

    /// Returns true if the date's year is a leap year.
    #[must_use]
    pub fn is_leap_year(&self) -> bool {
        is_leap_year(self.year())
    }

    /// Returns the number of days in the date's month.
    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Returns the number of days in the date's year.
    #[must_use]
    pub fn days_in_year(&self) -> u32 {
        if self.is_leap_year() {
            366
        } else {
            365
        }
    }

    /// Checks if the date is the last day of its month.
    #[must_use]
    pub fn is_end_of_month(&self) -> bool {
        !self.is_empty() && self.day() == self.days_in_month()
    }

    /// Returns the last day of the date's month, keeping the intraday offset.
    #[must_use]
    pub fn end_of_month(&self) -> Self {
        if self.is_empty() {
            return *self;
        }
        Dt(pack(self.year(), self.month(), self.days_in_month(), self.ticks()))
    }

    /// Returns the first day of the date's month, keeping the intraday offset.
    #[must_use]
    pub fn start_of_month(&self) -> Self {
        if self.is_empty() {
            return *self;
        }
        Dt(pack(self.year(), self.month(), 1, self.ticks()))
    }

    /// Checks if the date falls on Saturday or Sunday.
    #[must_use]
    pub fn is_weekend(&self) -> bool {
        matches!(self.day_of_week(), Weekday::Sat | Weekday::Sun)
    }

    /// Converts to a `NaiveDate`; `None` for the empty date.
    #[must_use]
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        if self.is_empty() {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year(), self.month(), self.day())
    }

    /// Converts to a `NaiveDateTime`; `None` for the empty date.
    #[must_use]
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        self.to_naive_date()
            .and_then(|d| d.and_hms_opt(self.hour(), self.minute(), 0))
    }

    /// Formats with a chrono strftime pattern. The empty date formats as "".
    #[must_use]
    pub fn format(&self, pattern: &str) -> String {
        self.to_naive_datetime()
            .map(|dt| dt.format(pattern).to_string())
            .unwrap_or_default()
    }

    /// ISO 8601 text: `yyyy-mm-dd`, with `THH:MM` when the tick is non-zero.
    #[must_use]
    pub fn to_iso_string(&self) -> String {
        if self.ticks() == 0 {
            self.format("%Y-%m-%d")
        } else {
            self.format("%Y-%m-%dT%H:%M")
        }
    }

    /// Parses a date.
    ///
    /// Accepted forms: `YYYYMMDD`, a spreadsheet serial, `dd-MMM-yyyy`,
    /// `ddMMMyyyy`, `yyyy-mm-dd`, `yyyy-mm-ddTHH:MM[:SS]` and `dd/mm/yyyy`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::Format` if no form matches and
    /// `SettleError::OutOfRange` if the text names an unsupported date.
    pub fn parse(s: &str) -> SettleResult<Self> {
        let text = s.trim();
        if text.is_empty() {
            return Err(SettleError::format(s, "a date"));
        }

        if text.bytes().all(|b| b.is_ascii_digit()) {
            let value: i32 = text
                .parse()
                .map_err(|_| SettleError::out_of_range(format!("date value {text}")))?;
            return if text.len() == 8 {
                Self::from_int(value)
            } else {
                Self::from_serial(value)
            };
        }

        const DATETIME_FORMATS: [&str; 4] = [
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
        ];
        const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d-%b-%Y", "%d/%m/%Y", "%d%b%Y", "%d %b %Y"];

        if let Some(value) = DATETIME_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        {
            return Self::try_from(value);
        }
        if let Some(value) = DATE_FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        {
            return Self::try_from(value);
        }
        Err(SettleError::format(s, "a date"))
    }

    /// Parses a date, returning `None` instead of an error.
    #[must_use]
    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }
}

impl fmt::Display for Dt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(
            f,
            "{:02}-{}-{}",
            self.day(),
            MONTH_NAMES[(self.month() - 1) as usize],
            self.year()
        )
    }
}

impl FromStr for Dt {
    type Err = SettleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dt::parse(s)
    }
}

impl TryFrom<NaiveDate> for Dt {
    type Error = SettleError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        Dt::new(value.day(), value.month(), value.year())
    }
}

impl TryFrom<NaiveDateTime> for Dt {
    type Error = SettleError;

    fn try_from(value: NaiveDateTime) -> Result<Self, Self::Error> {
        Dt::with_time(
            value.day(),
            value.month(),
            value.year(),
            value.hour(),
            value.minute(),
            value.second().min(59),
        )
    }
}

impl Serialize for Dt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for Dt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.trim().is_empty() {
            return Ok(Dt::EMPTY);
        }
        Dt::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_date_creation() {
        let date = Dt::new(15, 6, 2025).unwrap();
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 15);
        assert_eq!(date.ticks(), 0);
        assert!(!date.is_empty());
    }

    #[test]
    fn test_invalid_date() {
        assert!(Dt::new(30, 2, 2025).unwrap_err().is_out_of_range());
        assert!(Dt::new(1, 13, 2025).is_err());
        assert!(Dt::new(31, 12, 1899).is_err());
        assert!(Dt::new(1, 1, 2151).is_err());
        assert!(Dt::new(29, 2, 1900).is_err());
        assert!(Dt::new(29, 2, 2100).is_err());
        assert!(Dt::new(29, 2, 2000).is_ok());
    }

    #[test]
    fn test_empty() {
        assert_eq!(Dt::new(0, 0, 0).unwrap(), Dt::EMPTY);
        assert_eq!(Dt::from_int(0).unwrap(), Dt::EMPTY);
        assert_eq!(Dt::default(), Dt::EMPTY);
        assert_eq!(Dt::EMPTY.to_int(), 0);
        assert_eq!(Dt::EMPTY.to_string(), "");
        assert!(Dt::EMPTY < Dt::MIN);
    }

    #[test]
    fn test_packed_ordering() {
        let a = Dt::new(31, 1, 2024).unwrap();
        let b = Dt::new(1, 2, 2024).unwrap();
        let c = Dt::with_time(1, 2, 2024, 9, 30, 0).unwrap();
        assert!(a < b);
        assert!(b < c);
        assert_eq!(c.date_only(), b);
    }

    #[test]
    fn test_with_time() {
        let date = Dt::with_time(15, 6, 2025, 14, 37, 59).unwrap();
        assert_eq!(date.ticks(), 87);
        assert_eq!(date.hour(), 14);
        assert_eq!(date.minute(), 30);
        assert!(Dt::with_time(15, 6, 2025, 24, 0, 0).is_err());
    }

    #[test]
    fn test_julian() {
        assert_eq!(Dt::MIN.to_julian(), 2_415_021);
        let y2k = Dt::new(1, 1, 2000).unwrap();
        assert_eq!(y2k.to_julian(), 2_451_545);
        assert_eq!(Dt::from_julian(2_451_545).unwrap(), y2k);
        assert_eq!(Dt::from_julian(y2k.to_julian() + 59).unwrap(), Dt::new(29, 2, 2000).unwrap());
        assert!(Dt::from_julian(2_415_020).is_err());
        let last = Dt::new(31, 12, 2150).unwrap();
        assert_eq!(Dt::from_julian(last.to_julian()).unwrap(), last);
        assert!(Dt::from_julian(last.to_julian() + 1).is_err());
    }

    #[test]
    fn test_day_of_week() {
        assert_eq!(Dt::new(1, 1, 1900).unwrap().day_of_week(), Weekday::Mon);
        assert_eq!(Dt::new(1, 1, 2000).unwrap().day_of_week(), Weekday::Sat);
        assert_eq!(Dt::new(6, 1, 2025).unwrap().day_of_week(), Weekday::Mon);
        assert!(Dt::new(4, 1, 2025).unwrap().is_weekend());
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(Dt::new(1, 3, 2024).unwrap().day_of_year(), 61);
        assert_eq!(Dt::new(1, 3, 2023).unwrap().day_of_year(), 60);
        assert_eq!(Dt::new(31, 12, 2024).unwrap().day_of_year(), 366);
    }

    #[test]
    fn test_leap_year() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2025));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2100));
        assert!(is_leap_year(2000));
    }

    #[test]
    fn test_serial() {
        assert_eq!(Dt::from_serial(1).unwrap(), Dt::MIN);
        assert_eq!(Dt::from_serial(59).unwrap(), Dt::new(28, 2, 1900).unwrap());
        assert!(Dt::from_serial(60).is_err());
        assert_eq!(Dt::from_serial(61).unwrap(), Dt::new(1, 3, 1900).unwrap());
        assert_eq!(Dt::from_serial(45_658).unwrap(), Dt::new(1, 1, 2025).unwrap());
        assert_eq!(Dt::new(1, 1, 2025).unwrap().to_serial(), 45_658);
        assert_eq!(Dt::from_serial(0).unwrap(), Dt::EMPTY);
    }

    #[test]
    fn test_time_round_trip() {
        let date = Dt::with_time(15, 6, 2025, 12, 0, 0).unwrap();
        let t = date.to_time();
        let expected = (f64::from(date.to_julian() - 2_415_021) + 0.5) / 365.0;
        assert_relative_eq!(t, expected, epsilon = 1e-12);
        assert_eq!(Dt::from_time(t).unwrap(), date);
        assert!(Dt::from_time(-1.0).is_err());
        assert!(Dt::from_time(f64::NAN).is_err());
    }

    #[test]
    fn test_clamped_conversion() {
        let early = NaiveDate::from_ymd_opt(1850, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let late = NaiveDate::from_ymd_opt(2200, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let mid = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(8, 20, 0).unwrap();
        assert_eq!(Dt::from_datetime_clamped(early), Dt::EMPTY);
        assert_eq!(Dt::from_datetime_clamped(late), Dt::MAX);
        assert_eq!(Dt::from_datetime_clamped(mid), Dt::with_time(15, 3, 2024, 8, 20, 0).unwrap());
        assert!(Dt::try_from(late).is_err());
    }

    #[test]
    fn test_nth_weekday() {
        assert_eq!(
            Dt::nth_weekday(2025, 3, 3, Weekday::Wed).unwrap(),
            Dt::new(19, 3, 2025).unwrap()
        );
        assert_eq!(
            Dt::last_weekday(2024, 5, Weekday::Mon).unwrap(),
            Dt::new(27, 5, 2024).unwrap()
        );
        assert!(Dt::nth_weekday(2025, 2, 5, Weekday::Mon).is_err());
    }

    #[test]
    fn test_month_boundaries() {
        let date = Dt::new(15, 2, 2024).unwrap();
        assert_eq!(date.end_of_month(), Dt::new(29, 2, 2024).unwrap());
        assert_eq!(date.start_of_month(), Dt::new(1, 2, 2024).unwrap());
        assert!(Dt::new(29, 2, 2024).unwrap().is_end_of_month());
        assert!(!Dt::EMPTY.is_end_of_month());
    }

    #[test]
    fn test_parse_formats() {
        let expected = Dt::new(15, 6, 2025).unwrap();
        assert_eq!(Dt::parse("20250615").unwrap(), expected);
        assert_eq!(Dt::parse("15-Jun-2025").unwrap(), expected);
        assert_eq!(Dt::parse("15jun2025").unwrap(), expected);
        assert_eq!(Dt::parse("2025-06-15").unwrap(), expected);
        assert_eq!(Dt::parse("15/06/2025").unwrap(), expected);
        assert_eq!(Dt::parse("45823").unwrap(), expected);
        assert_eq!(
            Dt::parse("2025-06-15T10:30").unwrap(),
            Dt::with_time(15, 6, 2025, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Dt::parse("not a date").unwrap_err().is_format());
        assert!(Dt::parse("").unwrap_err().is_format());
        assert!(Dt::parse("18991231").unwrap_err().is_out_of_range());
        assert!(Dt::try_parse("2025-02-30").is_none());
    }

    #[test]
    fn test_display_and_format() {
        let date = Dt::new(5, 1, 2025).unwrap();
        assert_eq!(date.to_string(), "05-Jan-2025");
        assert_eq!(date.format("%Y/%m/%d"), "2025/01/05");
        assert_eq!(Dt::EMPTY.format("%Y"), "");
    }

    #[test]
    fn test_serde() {
        let date = Dt::new(15, 6, 2025).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2025-06-15\"");
        let parsed: Dt = serde_json::from_str(&json).unwrap();
        assert_eq!(date, parsed);

        let timed = Dt::with_time(15, 6, 2025, 10, 30, 0).unwrap();
        let json = serde_json::to_string(&timed).unwrap();
        assert_eq!(json, "\"2025-06-15T10:30\"");
        assert_eq!(serde_json::from_str::<Dt>(&json).unwrap(), timed);

        assert_eq!(serde_json::from_str::<Dt>("\"\"").unwrap(), Dt::EMPTY);
    }
}
