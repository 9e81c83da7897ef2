//! Business day calendars and conventions.
//!
//! This module provides:
//! - [`Calendar`]: a cheap `Copy` handle naming a registered calendar
//! - [`CalendarRegistry`]: the thread-safe registry that resolves handles
//!   into holiday and weekend sets on first use
//! - [`CalendarSource`]: the data-loading seam behind the registry
//! - [`CalendarCalculator`]: business-day arithmetic over any settlement test
//! - [`BDConvention`]: business day adjustment conventions

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

mod builtin;
mod conventions;
mod registry;
mod rules;
mod source;

pub use conventions::BDConvention;
pub use registry::{CalendarRegistry, CalendarStatus, Resolution};
pub use rules::{easter_sunday, HolidayRules, Observance, RuleSource};
pub use source::{CalendarSource, ChainSource, EmptySource, StaticSource};

use crate::error::SettleResult;
use crate::types::{CycleRule, Dt};

/// Handle to a registered calendar.
///
/// Built-in calendars have fixed ids; composite and source-listed
/// calendars receive the next free id when first named. Resolve a name
/// with [`CalendarRegistry::calendar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Calendar(u16);

impl Calendar {
    /// Weekends (Saturday and Sunday) only, no holidays.
    pub const NONE: Calendar = Calendar(0);
    /// Saturday/Sunday weekend, no holidays.
    pub const SATSUN: Calendar = Calendar(1);
    /// Friday/Saturday weekend, no holidays.
    pub const FRISAT: Calendar = Calendar(2);
    /// Thursday/Friday weekend, no holidays.
    pub const THUFRI: Calendar = Calendar(3);
    /// Friday weekend, no holidays.
    pub const FRI: Calendar = Calendar(4);
    /// Sunday weekend, no holidays.
    pub const SUN: Calendar = Calendar(5);
    /// Every day is a business day.
    pub const NOWKND: Calendar = Calendar(6);
    /// New York banking.
    pub const NYB: Calendar = Calendar(7);
    /// US government securities.
    pub const USG: Calendar = Calendar(8);
    /// London banking.
    pub const LNB: Calendar = Calendar(9);
    /// TARGET (euro settlement).
    pub const TGT: Calendar = Calendar(10);
    /// Tokyo banking.
    pub const TKB: Calendar = Calendar(11);

    pub(crate) const fn from_id(id: u16) -> Self {
        Calendar(id)
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn id(self) -> u16 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match builtin::BUILTINS.get(self.index()) {
            Some(entry) => write!(f, "{}", entry.name),
            None => write!(f, "#{}", self.0),
        }
    }
}

/// Set of weekdays that are never business days.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekendMask(u8);

impl WeekendMask {
    /// No weekend days.
    pub const EMPTY: WeekendMask = WeekendMask(0);
    /// Saturday and Sunday.
    pub const SAT_SUN: WeekendMask = WeekendMask(0b110_0000);
    /// Friday and Saturday.
    pub const FRI_SAT: WeekendMask = WeekendMask(0b011_0000);
    /// Thursday and Friday.
    pub const THU_FRI: WeekendMask = WeekendMask(0b001_1000);
    /// Friday only.
    pub const FRI: WeekendMask = WeekendMask(0b001_0000);
    /// Sunday only.
    pub const SUN: WeekendMask = WeekendMask(0b100_0000);

    const ALL: u8 = 0b111_1111;

    /// Builds a mask from weekdays.
    pub fn from_weekdays(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(Self::EMPTY, |mask, day| mask.with(day))
    }

    /// Returns the mask with `day` added.
    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        WeekendMask(self.0 | (1 << day.num_days_from_monday()))
    }

    /// Parses an ISO weekday code, 1 (Monday) to 7 (Sunday).
    #[must_use]
    pub fn weekday_from_iso(code: i32) -> Option<Weekday> {
        match code {
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            7 => Some(Weekday::Sun),
            _ => None,
        }
    }

    /// Returns true if `day` is a weekend day.
    #[inline]
    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Union of two masks.
    #[must_use]
    pub const fn union(self, other: WeekendMask) -> Self {
        WeekendMask(self.0 | other.0)
    }

    /// Returns true if no day is a weekend day.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every day of the week is a weekend day.
    #[must_use]
    pub const fn is_full(self) -> bool {
        self.0 & Self::ALL == Self::ALL
    }

    /// Weekend days in Monday-first order.
    pub fn weekdays(self) -> impl Iterator<Item = Weekday> {
        (1..=7)
            .filter_map(WeekendMask::weekday_from_iso)
            .filter(move |day| self.contains(*day))
    }
}

impl fmt::Debug for WeekendMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.weekdays()).finish()
    }
}

impl fmt::Display for WeekendMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let days: Vec<String> = self.weekdays().map(|d| d.to_string()).collect();
        write!(f, "{}", days.join("/"))
    }
}

/// Business-day arithmetic over a settlement test.
///
/// Implementors answer one question, whether a date settles on a given
/// calendar; everything else is derived from it.
pub trait CalendarCalculator: Send + Sync {
    /// Returns true if `date` is a valid settlement date on `calendar`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarInvalid` for a calendar that failed to
    /// resolve and `SettleError::CalendarNotFound` for an unknown handle.
    fn is_valid_settlement(&self, calendar: Calendar, date: Dt) -> SettleResult<bool>;

    /// Returns true if `date` is a business day on `calendar`.
    fn is_business_day(&self, calendar: Calendar, date: Dt) -> SettleResult<bool> {
        let date = date.require("is_business_day")?;
        self.is_valid_settlement(calendar, date)
    }

    /// Moves `n` business days from `date`; negative `n` moves backwards.
    ///
    /// Zero returns the date unchanged even if it is not a business day.
    fn add_business_days(&self, date: Dt, n: i32, calendar: Calendar) -> SettleResult<Dt> {
        let mut result = date.require("add_business_days")?;
        let mut remaining = n.unsigned_abs();
        let direction: i64 = if n >= 0 { 1 } else { -1 };

        while remaining > 0 {
            result = result.add_days(direction)?;
            if self.is_valid_settlement(calendar, result)? {
                remaining -= 1;
            }
        }

        Ok(result)
    }

    /// Adjusts a date according to the given business day convention.
    fn roll(&self, date: Dt, convention: BDConvention, calendar: Calendar) -> SettleResult<Dt> {
        conventions::roll(self, date, convention, calendar)
    }

    /// Returns the next business day on or after the given date.
    fn next_business_day(&self, date: Dt, calendar: Calendar) -> SettleResult<Dt> {
        conventions::following(self, date.require("next_business_day")?, calendar)
    }

    /// Returns the previous business day on or before the given date.
    fn previous_business_day(&self, date: Dt, calendar: Calendar) -> SettleResult<Dt> {
        conventions::preceding(self, date.require("previous_business_day")?, calendar)
    }

    /// Counts business days between two dates (exclusive of start, inclusive of end).
    ///
    /// The count is negative when `end` is before `start`.
    fn business_days_between(&self, start: Dt, end: Dt, calendar: Calendar) -> SettleResult<i64> {
        let start = start.require("business_days_between")?.date_only();
        let end = end.require("business_days_between")?.date_only();
        if end < start {
            return Ok(-self.business_days_between(end, start, calendar)?);
        }

        let mut count = 0;
        let mut current = start;
        while current < end {
            current = current.add_days(1)?;
            if self.is_valid_settlement(calendar, current)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns true if `date` is the last business day of its month.
    fn is_last_business_day_of_month(&self, date: Dt, calendar: Calendar) -> SettleResult<bool> {
        let date = date.require("is_last_business_day_of_month")?;
        if !self.is_valid_settlement(calendar, date)? {
            return Ok(false);
        }
        let last = self.previous_business_day(date.end_of_month(), calendar)?;
        Ok(last.date_only() == date.date_only())
    }

    /// Adds months and rolls the result.
    ///
    /// Under [`BDConvention::Frn`], a date that is the last business day of
    /// its month maps to the last business day of the target month; other
    /// dates roll Modified Following.
    fn add_months_rolled(
        &self,
        date: Dt,
        months: i32,
        convention: BDConvention,
        calendar: Calendar,
    ) -> SettleResult<Dt> {
        let date = date.require("add_months_rolled")?;
        if convention == BDConvention::Frn && self.is_last_business_day_of_month(date, calendar)? {
            let target = date.add_months(months, CycleRule::Eom)?;
            return self.previous_business_day(target, calendar);
        }
        let target = date.add_months(months, CycleRule::None)?;
        self.roll(target, convention, calendar)
    }
}

/// Calculator that knows weekends only.
///
/// Weekend-convention calendars (`FRISAT`, `NOWKND`, ...) use their own
/// weekend; every other calendar is treated as Saturday/Sunday with no
/// holidays. Useful for testing or when holiday data is not available.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalculator;

impl CalendarCalculator for WeekendCalculator {
    fn is_valid_settlement(&self, calendar: Calendar, date: Dt) -> SettleResult<bool> {
        let date = date.require("is_valid_settlement")?;
        let mask = builtin::weekend_of(calendar).unwrap_or(WeekendMask::SAT_SUN);
        Ok(!mask.contains(date.day_of_week()))
    }
}
