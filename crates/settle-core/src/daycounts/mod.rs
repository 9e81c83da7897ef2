//! Day count conventions for accrual and discounting.
//!
//! A [`DayCount`] turns a pair of dates into a day count and a year
//! fraction. The Act/Act family additionally needs the enclosing coupon
//! period; [`DayCount::accrual_fraction`] splits ranges that straddle
//! several periods and sums the per-period fractions.
//!
//! # Supported Conventions
//!
//! ## ACT Family (Actual numerator)
//!
//! - `ACT/360`, `ACT/365F`, `ACT/365.25`, `ACT/364`
//! - `ACT/ACT ISDA`: split at calendar year boundaries
//! - `ACT/ACT ISMA`: period based
//! - `ACT/ACT AFB`: whole years counted back from the end date
//! - `ACT/365L`: period based leap-year basis
//!
//! ## 30/360 Family
//!
//! - `30/360 US`, `30/360 ISDA`, `30E/360`, `30E/360 ISDA`, `30E+/360`
//!
//! # Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use settle_core::daycounts::DayCount;
//! use settle_core::types::Dt;
//!
//! let start = Dt::new(15, 1, 2025).unwrap();
//! let end = Dt::new(15, 7, 2025).unwrap();
//!
//! let days = DayCount::Thirty360Us.day_count(start, end).unwrap();
//! let yf = DayCount::Thirty360Us.year_fraction(start, end).unwrap();
//! assert_eq!(days, 180);
//! assert_eq!(yf, Decimal::new(5, 1));
//! ```

mod actact;
mod thirty360;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SettleError, SettleResult};
use crate::types::{CycleRule, Dt};

/// Day count convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DayCount {
    // =========================================================================
    // ACT Family
    // =========================================================================
    /// Actual/360 - money market, FRNs
    Act360,

    /// Actual/365 Fixed - GBP, AUD, NZD markets
    Act365Fixed,

    /// Actual/365.25
    Act36525,

    /// Actual/364
    Act364,

    /// Actual/Actual ISDA - swaps, split by calendar year
    ActActIsda,

    /// Actual/Actual ISMA (ICMA) - government bonds, period based
    ActActIsma,

    /// Actual/Actual AFB - French convention
    ActActAfb,

    /// Actual/365L (ISMA-Year) - period based leap-year basis
    ActAct365L,

    // =========================================================================
    // 30/360 Family
    // =========================================================================
    /// 30/360 US with February end-of-month rules
    Thirty360Us,

    /// 30/360 ISDA (bond basis)
    Thirty360Isda,

    /// 30E/360 (Eurobond basis, ISMA)
    Thirty360Isma,

    /// 30E/360 ISDA (German)
    Thirty360EIsda,

    /// 30E+/360
    Thirty360EPlus,
}

impl DayCount {
    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCount::Act360 => "ACT/360",
            DayCount::Act365Fixed => "ACT/365F",
            DayCount::Act36525 => "ACT/365.25",
            DayCount::Act364 => "ACT/364",
            DayCount::ActActIsda => "ACT/ACT ISDA",
            DayCount::ActActIsma => "ACT/ACT ISMA",
            DayCount::ActActAfb => "ACT/ACT AFB",
            DayCount::ActAct365L => "ACT/365L",
            DayCount::Thirty360Us => "30/360 US",
            DayCount::Thirty360Isda => "30/360 ISDA",
            DayCount::Thirty360Isma => "30E/360",
            DayCount::Thirty360EIsda => "30E/360 ISDA",
            DayCount::Thirty360EPlus => "30E+/360",
        }
    }

    /// Returns all conventions.
    #[must_use]
    pub fn all() -> &'static [DayCount] {
        &[
            DayCount::Act360,
            DayCount::Act365Fixed,
            DayCount::Act36525,
            DayCount::Act364,
            DayCount::ActActIsda,
            DayCount::ActActIsma,
            DayCount::ActActAfb,
            DayCount::ActAct365L,
            DayCount::Thirty360Us,
            DayCount::Thirty360Isda,
            DayCount::Thirty360Isma,
            DayCount::Thirty360EIsda,
            DayCount::Thirty360EPlus,
        ]
    }

    /// Returns the nominal days-per-year basis.
    ///
    /// Act/Act conventions report 365; their actual denominator varies.
    #[must_use]
    pub fn basis(&self) -> Decimal {
        match self {
            DayCount::Act360
            | DayCount::Thirty360Us
            | DayCount::Thirty360Isda
            | DayCount::Thirty360Isma
            | DayCount::Thirty360EIsda
            | DayCount::Thirty360EPlus => Decimal::from(360),
            DayCount::Act364 => Decimal::from(364),
            DayCount::Act36525 => Decimal::new(36525, 2),
            DayCount::Act365Fixed
            | DayCount::ActActIsda
            | DayCount::ActActIsma
            | DayCount::ActActAfb
            | DayCount::ActAct365L => Decimal::from(365),
        }
    }

    /// Returns true if the convention needs the enclosing coupon period.
    ///
    /// Without one, [`DayCount::year_fraction`] treats the range as its own
    /// period.
    #[must_use]
    pub fn requires_period(&self) -> bool {
        matches!(self, DayCount::ActActIsma | DayCount::ActAct365L)
    }

    /// Returns true for the 30/360 family.
    #[must_use]
    pub fn is_thirty360(&self) -> bool {
        matches!(
            self,
            DayCount::Thirty360Us
                | DayCount::Thirty360Isda
                | DayCount::Thirty360Isma
                | DayCount::Thirty360EIsda
                | DayCount::Thirty360EPlus
        )
    }

    /// Returns the day count from `start` to `end`.
    ///
    /// Actual conventions count calendar days; 30/360 conventions use the
    /// adjusted 30-day-month formula. A reversed range returns the negated
    /// count.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` if either date is empty.
    pub fn day_count(&self, start: Dt, end: Dt) -> SettleResult<i64> {
        self.day_count_to_maturity(start, end, None)
    }

    fn day_count_to_maturity(&self, start: Dt, end: Dt, maturity: Option<Dt>) -> SettleResult<i64> {
        start.require("day_count")?;
        end.require("day_count")?;
        if start > end {
            return Ok(-self.day_count_to_maturity(end, start, maturity)?);
        }
        Ok(match self {
            DayCount::Thirty360Us => thirty360::us_days(start, end),
            DayCount::Thirty360Isda => thirty360::isda_days(start, end),
            DayCount::Thirty360Isma => thirty360::isma_days(start, end),
            DayCount::Thirty360EIsda => thirty360::e_isda_days(start, end, maturity),
            DayCount::Thirty360EPlus => thirty360::e_plus_days(start, end),
            _ => start.days_until(end)?,
        })
    }

    /// Returns the year fraction from `start` to `end`.
    ///
    /// Period-based conventions use the range as its own coupon period.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` if either date is empty.
    pub fn year_fraction(&self, start: Dt, end: Dt) -> SettleResult<Decimal> {
        self.year_fraction_to_maturity_opt(start, end, None)
    }

    /// Returns the year fraction from `start` to `end` where `maturity` is
    /// the termination date of the instrument.
    ///
    /// Only 30E/360 ISDA uses the maturity: a final 28/29 February that is
    /// the maturity date is not moved to day 30.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` if either date is empty.
    pub fn year_fraction_to_maturity(&self, start: Dt, end: Dt, maturity: Dt) -> SettleResult<Decimal> {
        self.year_fraction_to_maturity_opt(start, end, Some(maturity))
    }

    fn year_fraction_to_maturity_opt(&self, start: Dt, end: Dt, maturity: Option<Dt>) -> SettleResult<Decimal> {
        start.require("year_fraction")?;
        end.require("year_fraction")?;
        if start == end {
            return Ok(Decimal::ZERO);
        }
        if start > end {
            return Ok(-self.year_fraction_to_maturity_opt(end, start, maturity)?);
        }
        match self {
            DayCount::ActActIsda => actact::isda_fraction(start, end),
            DayCount::ActActAfb => actact::afb_fraction(start, end),
            DayCount::ActActIsma => actact::isma_fraction(start, end, start, end),
            DayCount::ActAct365L => actact::act365l_fraction(start, end, start, end),
            _ => {
                let days = self.day_count_to_maturity(start, end, maturity)?;
                Ok(Decimal::from(days) / self.basis())
            }
        }
    }

    /// Returns the fraction for the part of `[start, end]` that lies inside
    /// the coupon period `[period_start, period_end]`; zero when the two do
    /// not overlap.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::DayCount` for an empty or reversed period.
    pub fn period_fraction(&self, start: Dt, end: Dt, period_start: Dt, period_end: Dt) -> SettleResult<Decimal> {
        check_period(period_start, period_end)?;
        start.require("period_fraction")?;
        end.require("period_fraction")?;
        if start > end {
            return Ok(-self.period_fraction(end, start, period_start, period_end)?);
        }

        let clipped_start = start.max(period_start);
        let clipped_end = end.min(period_end);
        if clipped_start >= clipped_end {
            return Ok(Decimal::ZERO);
        }

        match self {
            DayCount::ActActIsma => actact::isma_fraction(clipped_start, clipped_end, period_start, period_end),
            DayCount::ActAct365L => actact::act365l_fraction(clipped_start, clipped_end, period_start, period_end),
            _ => self.year_fraction(clipped_start, clipped_end),
        }
    }

    /// Returns the accrual fraction from `start` to `end` given one
    /// reference coupon period.
    ///
    /// Neighbouring periods are generated by stepping the reference period
    /// backwards and forwards by its own length (in months, keeping month
    /// ends, or in days for periods shorter than a month) until the whole
    /// range is covered; the result is the sum of [`DayCount::period_fraction`]
    /// over those periods. Conventions that do not depend on the period
    /// return [`DayCount::year_fraction`].
    ///
    /// # Errors
    ///
    /// Returns `SettleError::DayCount` for an empty or reversed period.
    pub fn accrual_fraction(&self, start: Dt, end: Dt, period_start: Dt, period_end: Dt) -> SettleResult<Decimal> {
        check_period(period_start, period_end)?;
        start.require("accrual_fraction")?;
        end.require("accrual_fraction")?;
        if start > end {
            return Ok(-self.accrual_fraction(end, start, period_start, period_end)?);
        }
        if !self.requires_period() {
            return self.year_fraction(start, end);
        }

        let step = PeriodStep::between(period_start, period_end)?;
        let mut total = self.period_fraction(start, end, period_start, period_end)?;

        let mut upper = period_start;
        while upper > start {
            let lower = step.apply(upper, -1)?;
            total += self.period_fraction(start, end, lower, upper)?;
            upper = lower;
        }

        let mut lower = period_end;
        while lower < end {
            let upper = step.apply(lower, 1)?;
            total += self.period_fraction(start, end, lower, upper)?;
            lower = upper;
        }

        Ok(total)
    }
}

fn check_period(period_start: Dt, period_end: Dt) -> SettleResult<()> {
    period_start.require("period_fraction")?;
    period_end.require("period_fraction")?;
    if period_start >= period_end {
        return Err(SettleError::day_count(format!(
            "coupon period {period_start} to {period_end} is empty or reversed"
        )));
    }
    Ok(())
}

/// Length of a coupon period, used to generate its neighbours.
#[derive(Debug, Clone, Copy)]
enum PeriodStep {
    Months { months: i32, eom: bool },
    Days(i64),
}

impl PeriodStep {
    fn between(period_start: Dt, period_end: Dt) -> SettleResult<Self> {
        let months = (period_end.year() - period_start.year()) * 12 + period_end.month() as i32
            - period_start.month() as i32;
        if months <= 0 {
            return Ok(PeriodStep::Days(period_start.days_until(period_end)?));
        }
        let eom = period_start.is_end_of_month() && period_end.is_end_of_month();
        Ok(PeriodStep::Months { months, eom })
    }

    fn apply(&self, anchor: Dt, direction: i32) -> SettleResult<Dt> {
        match *self {
            PeriodStep::Months { months, eom } => {
                let rule = if eom { CycleRule::Eom } else { CycleRule::None };
                anchor.add_months(months * direction, rule)
            }
            PeriodStep::Days(days) => anchor.add_days(days * i64::from(direction)),
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DayCount {
    type Err = SettleError;

    /// Parses a day count convention.
    ///
    /// Supports market names ("ACT/360", "30E/360 ISDA"), enum-style names
    /// ("Act360", "Thirty360Us") and common aliases ("BOND", "EUROBOND").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "ACT/360" | "ACTUAL/360" | "ACT360" | "A360" => Ok(DayCount::Act360),

            "ACT/365" | "ACT/365F" | "ACT/365 FIXED" | "ACTUAL/365" | "ACTUAL/365 FIXED"
            | "ACT365FIXED" | "ACT365" | "A365F" => Ok(DayCount::Act365Fixed),

            "ACT/365.25" | "ACTUAL/365.25" | "ACT36525" => Ok(DayCount::Act36525),

            "ACT/364" | "ACTUAL/364" | "ACT364" => Ok(DayCount::Act364),

            "ACT/ACT" | "ACT/ACT ISDA" | "ACTUAL/ACTUAL" | "ACTUAL/ACTUAL ISDA" | "ACTACTISDA"
            | "ACTACT" => Ok(DayCount::ActActIsda),

            "ACT/ACT ISMA" | "ACT/ACT ICMA" | "ACTUAL/ACTUAL ISMA" | "ACTUAL/ACTUAL ICMA"
            | "ACT/ACT BOND" | "ACTACTISMA" | "ACTACTICMA" | "ISMA" | "ICMA" => {
                Ok(DayCount::ActActIsma)
            }

            "ACT/ACT AFB" | "ACTUAL/ACTUAL AFB" | "ACT/ACT EURO" | "ACTACTAFB" | "AFB" => {
                Ok(DayCount::ActActAfb)
            }

            "ACT/365L" | "ACT/365 LEAP" | "ACTUAL/365L" | "ISMA-YEAR" | "ACTACT365L" => {
                Ok(DayCount::ActAct365L)
            }

            "30/360" | "30/360 US" | "30U/360" | "30/360US" | "THIRTY360US" => {
                Ok(DayCount::Thirty360Us)
            }

            "30/360 ISDA" | "360/360" | "BOND" | "BOND BASIS" | "THIRTY360ISDA" => {
                Ok(DayCount::Thirty360Isda)
            }

            "30E/360" | "30/360 ICMA" | "30/360 ISMA" | "EUROBOND" | "THIRTY360ISMA" | "30E360" => {
                Ok(DayCount::Thirty360Isma)
            }

            "30E/360 ISDA" | "30/360 GERMAN" | "GERMAN" | "THIRTY360EISDA" | "30E/360ISDA" => {
                Ok(DayCount::Thirty360EIsda)
            }

            "30E+/360" | "30E+360" | "THIRTY360EPLUS" => Ok(DayCount::Thirty360EPlus),

            _ => Err(SettleError::format(s, "a day count convention")),
        }
    }
}

impl From<DayCount> for String {
    fn from(dc: DayCount) -> Self {
        dc.name().to_string()
    }
}

impl TryFrom<String> for DayCount {
    type Error = SettleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dt(d: u32, m: u32, y: i32) -> Dt {
        Dt::new(d, m, y).unwrap()
    }

    #[test]
    fn test_act360() {
        let (start, end) = (dt(1, 1, 2025), dt(1, 7, 2025));
        assert_eq!(DayCount::Act360.day_count(start, end).unwrap(), 181);
        assert_eq!(DayCount::Act360.year_fraction(start, end).unwrap(), dec!(181) / dec!(360));
    }

    #[test]
    fn test_act365_fixed() {
        let (start, end) = (dt(1, 1, 2025), dt(1, 1, 2026));
        assert_eq!(DayCount::Act365Fixed.day_count(start, end).unwrap(), 365);
        assert_eq!(DayCount::Act365Fixed.year_fraction(start, end).unwrap(), dec!(1));
    }

    #[test]
    fn test_act36525_and_act364() {
        let (start, end) = (dt(1, 1, 2024), dt(1, 1, 2025));
        assert_eq!(
            DayCount::Act36525.year_fraction(start, end).unwrap(),
            dec!(366) / dec!(365.25)
        );
        assert_eq!(
            DayCount::Act364.year_fraction(dt(1, 1, 2025), dt(31, 12, 2025)).unwrap(),
            dec!(1)
        );
    }

    #[test]
    fn test_thirty360_year() {
        let (start, end) = (dt(1, 1, 2025), dt(1, 1, 2026));
        for dc in DayCount::all().iter().filter(|dc| dc.is_thirty360()) {
            assert_eq!(dc.day_count(start, end).unwrap(), 360, "{dc}");
            assert_eq!(dc.year_fraction(start, end).unwrap(), dec!(1), "{dc}");
        }
    }

    #[test]
    fn test_negative_range() {
        let (start, end) = (dt(15, 1, 2025), dt(15, 7, 2025));
        for dc in DayCount::all() {
            let forward = dc.year_fraction(start, end).unwrap();
            let backward = dc.year_fraction(end, start).unwrap();
            assert_eq!(backward, -forward, "{dc}");
        }
        assert_eq!(DayCount::Act360.day_count(end, start).unwrap(), -181);
    }

    #[test]
    fn test_empty_dates_rejected() {
        assert!(DayCount::Act360.day_count(Dt::EMPTY, dt(1, 1, 2025)).is_err());
        assert!(DayCount::ActActIsda.year_fraction(dt(1, 1, 2025), Dt::EMPTY).is_err());
    }

    #[test]
    fn test_all_roughly_half_year() {
        let (start, end) = (dt(1, 1, 2025), dt(1, 7, 2025));
        for dc in DayCount::all() {
            let yf = dc.year_fraction(start, end).unwrap();
            assert!(yf > dec!(0.4) && yf < dec!(0.6), "{dc}: {yf}");
        }
    }

    #[test]
    fn test_year_fraction_to_maturity() {
        let (start, maturity) = (dt(31, 8, 2024), dt(28, 2, 2025));
        let dc = DayCount::Thirty360EIsda;
        assert_eq!(dc.year_fraction(start, maturity).unwrap(), dec!(180) / dec!(360));
        assert_eq!(
            dc.year_fraction_to_maturity(start, maturity, maturity).unwrap(),
            dec!(178) / dec!(360)
        );
        assert_eq!(
            DayCount::Act360.year_fraction_to_maturity(start, maturity, maturity).unwrap(),
            DayCount::Act360.year_fraction(start, maturity).unwrap()
        );
    }

    #[test]
    fn test_period_fraction_clips() {
        let dc = DayCount::ActActIsma;
        let (ps, pe) = (dt(15, 11, 2024), dt(15, 5, 2025));
        let clipped = dc.period_fraction(dt(1, 11, 2024), dt(15, 1, 2025), ps, pe).unwrap();
        let inside = dc.period_fraction(ps, dt(15, 1, 2025), ps, pe).unwrap();
        assert_eq!(clipped, inside);
        assert_eq!(
            dc.period_fraction(dt(1, 6, 2025), dt(1, 7, 2025), ps, pe).unwrap(),
            Decimal::ZERO
        );
        assert!(dc.period_fraction(ps, pe, pe, ps).is_err());
    }

    #[test]
    fn test_accrual_fraction_spans_neighbours() {
        // Semi-annual coupon 15-Nov-2023 .. 15-May-2024 spans 29-Feb-2024.
        let dc = DayCount::ActActIsma;
        let (ps, pe) = (dt(15, 11, 2023), dt(15, 5, 2024));
        let (start, end) = (dt(15, 8, 2023), dt(15, 8, 2024));

        let before = dc.period_fraction(start, end, dt(15, 5, 2023), ps).unwrap();
        let whole = dc.period_fraction(start, end, ps, pe).unwrap();
        let after = dc.period_fraction(start, end, pe, dt(15, 11, 2024)).unwrap();
        assert_eq!(before, dec!(0.25));
        assert_eq!(whole, dec!(0.5));
        assert_eq!(after, dec!(0.25));

        let total = dc.accrual_fraction(start, end, ps, pe).unwrap();
        assert_eq!(total, before + whole + after);
        assert_eq!(total, dec!(1));
    }

    #[test]
    fn test_accrual_fraction_eom_periods() {
        let dc = DayCount::ActActIsma;
        let (ps, pe) = (dt(31, 8, 2024), dt(28, 2, 2025));
        // The next period must end on 31-Aug-2025, not 28-Aug-2025.
        let total = dc.accrual_fraction(ps, dt(31, 8, 2025), ps, pe).unwrap();
        assert_eq!(total, dec!(1));
    }

    #[test]
    fn test_accrual_fraction_simple_conventions() {
        let (ps, pe) = (dt(15, 11, 2023), dt(15, 5, 2024));
        let (start, end) = (dt(15, 8, 2023), dt(15, 8, 2024));
        assert_eq!(
            DayCount::Act360.accrual_fraction(start, end, ps, pe).unwrap(),
            DayCount::Act360.year_fraction(start, end).unwrap()
        );
    }

    #[test]
    fn test_names_and_parse() {
        for dc in DayCount::all() {
            let parsed: DayCount = dc.name().parse().unwrap();
            assert_eq!(*dc, parsed);
            assert_eq!(dc.to_string(), dc.name());
        }
        assert_eq!("act/360".parse::<DayCount>().unwrap(), DayCount::Act360);
        assert_eq!("BOND".parse::<DayCount>().unwrap(), DayCount::Thirty360Isda);
        assert_eq!("EUROBOND".parse::<DayCount>().unwrap(), DayCount::Thirty360Isma);
        assert_eq!("ACT/ACT ICMA".parse::<DayCount>().unwrap(), DayCount::ActActIsma);
        assert!("INVALID".parse::<DayCount>().unwrap_err().is_format());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&DayCount::Thirty360EIsda).unwrap();
        assert_eq!(json, "\"30E/360 ISDA\"");
        let parsed: DayCount = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, DayCount::Thirty360EIsda);
    }
}
