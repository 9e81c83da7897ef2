//! Calendar arithmetic on [`Dt`].

use super::{CycleRule, Dt, Frequency, Tenor, TimeUnit};
use crate::calendars::{BDConvention, Calendar, CalendarCalculator};
use crate::daycounts::DayCount;
use crate::error::{SettleError, SettleResult};

impl Dt {
    /// Adds calendar days, ignoring business calendars.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` for the empty date and
    /// `SettleError::OutOfRange` if the result leaves 1900..=2150.
    pub fn add_days(&self, days: i64) -> SettleResult<Dt> {
        self.require("add_days")?;
        let julian = i64::from(self.to_julian()) + days;
        let julian = i32::try_from(julian)
            .map_err(|_| SettleError::out_of_range(format!("{self} + {days} days")))?;
        Ok(Dt::from_julian(julian)?.with_ticks_of(*self))
    }

    /// Adds whole months, then re-anchors the day with `rule`.
    ///
    /// With [`CycleRule::None`] the original day is kept and clamped to the
    /// month length, so 31-Mar + 1M is 30-Apr.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` for the empty date and
    /// `SettleError::OutOfRange` if the result leaves 1900..=2150.
    pub fn add_months(&self, months: i32, rule: CycleRule) -> SettleResult<Dt> {
        self.require("add_months")?;
        let total = i64::from(self.year()) * 12 + i64::from(self.month()) - 1 + i64::from(months);
        let year = i32::try_from(total.div_euclid(12))
            .map_err(|_| SettleError::out_of_range(format!("{self} + {months} months")))?;
        let month = (total.rem_euclid(12) + 1) as u32;
        Ok(rule.anchor(year, month, self.day())?.with_ticks_of(*self))
    }

    /// Adds whole years, clamping 29-Feb to 28-Feb in non-leap years.
    ///
    /// # Errors
    ///
    /// Same as [`Dt::add_months`].
    pub fn add_years(&self, years: i32) -> SettleResult<Dt> {
        let months = years
            .checked_mul(12)
            .ok_or_else(|| SettleError::out_of_range(format!("{years} years")))?;
        self.add_months(months, CycleRule::None)
    }

    /// Adds a tenor.
    ///
    /// # Errors
    ///
    /// Same as [`Dt::add_days`] and [`Dt::add_months`].
    pub fn add_tenor(&self, tenor: Tenor) -> SettleResult<Dt> {
        self.add_tenor_with_rule(tenor, CycleRule::None)
    }

    /// Adds a tenor, re-anchoring month and year steps with `rule`.
    ///
    /// # Errors
    ///
    /// Same as [`Dt::add_days`] and [`Dt::add_months`].
    pub fn add_tenor_with_rule(&self, tenor: Tenor, rule: CycleRule) -> SettleResult<Dt> {
        let count = tenor.count();
        match tenor.unit() {
            TimeUnit::Days => self.add_days(i64::from(count)),
            TimeUnit::Weeks => self.add_days(7 * i64::from(count)),
            TimeUnit::Months => self.add_months(count, rule),
            TimeUnit::Years => {
                let months = count
                    .checked_mul(12)
                    .ok_or_else(|| SettleError::out_of_range(format!("tenor {tenor}")))?;
                self.add_months(months, rule)
            }
        }
    }

    /// Adds a possibly composite tenor string such as `"1Y1M1W"`.
    ///
    /// Components are applied one after another in the order written, so
    /// the result is path dependent near month ends: from 31-Jan-2023,
    /// `"1Y1M"` gives 29-Feb-2024 while `"1M1Y"` gives 28-Feb-2024.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::Format` for malformed strings, otherwise the
    /// errors of [`Dt::add_tenor`].
    pub fn add_tenor_str(&self, tenor: &str) -> SettleResult<Dt> {
        Tenor::parse_components(tenor)?
            .into_iter()
            .try_fold(*self, |date, part| date.add_tenor(part))
    }

    /// Adds `n` periods of `frequency`.
    ///
    /// With `eom` set and the anchor on the last day of its month, month-based
    /// results are forced to the last day of their month.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` for [`Frequency::Zero`], otherwise
    /// the errors of [`Dt::add_tenor`].
    pub fn add_frequency(&self, frequency: Frequency, n: i32, eom: bool) -> SettleResult<Dt> {
        self.require("add_frequency")?;
        if frequency.is_zero() {
            return Err(SettleError::out_of_range("zero frequency has no period"));
        }
        let step = frequency.tenor();
        let count = step
            .count()
            .checked_mul(n)
            .ok_or_else(|| SettleError::out_of_range(format!("{n} x {step}")))?;
        let result = self.add_tenor(Tenor::new(count, step.unit()))?;
        if eom && self.is_end_of_month() && frequency.months_per_period().is_some() {
            Ok(result.end_of_month())
        } else {
            Ok(result)
        }
    }

    /// Returns the number of calendar days from `self` to `other`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` if either date is empty.
    pub fn days_until(&self, other: Dt) -> SettleResult<i64> {
        self.require("days_until")?;
        other.require("days_until")?;
        Ok(i64::from(other.to_julian()) - i64::from(self.to_julian()))
    }

    /// Returns the day count from `self` to `other` under `day_count`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` if either date is empty.
    pub fn diff(&self, other: Dt, day_count: DayCount) -> SettleResult<i64> {
        day_count.day_count(*self, other)
    }

    /// Adds `n` business days of `calendar`, as judged by `calculator`.
    ///
    /// # Errors
    ///
    /// Propagates calendar and range errors.
    pub fn add_business_days<C>(&self, n: i32, calendar: Calendar, calculator: &C) -> SettleResult<Dt>
    where
        C: CalendarCalculator + ?Sized,
    {
        calculator.add_business_days(*self, n, calendar)
    }

    /// Rolls to a business day of `calendar` under `convention`.
    ///
    /// # Errors
    ///
    /// Propagates calendar and range errors.
    pub fn roll<C>(&self, convention: BDConvention, calendar: Calendar, calculator: &C) -> SettleResult<Dt>
    where
        C: CalendarCalculator + ?Sized,
    {
        calculator.roll(*self, convention, calendar)
    }
}
