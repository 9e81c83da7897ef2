//! Actual/Actual day counts.
//!
//! All functions here expect `start < end`; sign handling and period
//! clipping happen in [`super::DayCount`].

use rust_decimal::Decimal;

use crate::error::SettleResult;
use crate::types::{is_leap_year, CycleRule, Dt};

/// Period length in whole months, estimated as `round(12 * days / 365)`.
pub(crate) fn period_months(period_start: Dt, period_end: Dt) -> SettleResult<i64> {
    let days = period_start.days_until(period_end)?;
    Ok((12 * days + 182) / 365)
}

/// Actual/Actual ISDA.
///
/// The range is split at each 1 January; days falling in a leap year are
/// divided by 366 and the rest by 365.
///
/// $$\text{YF} = \frac{\text{days in non-leap years}}{365} + \frac{\text{days in leap years}}{366}$$
pub(crate) fn isda_fraction(start: Dt, end: Dt) -> SettleResult<Decimal> {
    let mut total = Decimal::ZERO;
    let mut current = start.date_only();
    let end = end.date_only();

    while current.year() < end.year() {
        let next_year = Dt::new(1, 1, current.year() + 1)?;
        let days = current.days_until(next_year)?;
        total += Decimal::from(days) / Decimal::from(current.days_in_year());
        current = next_year;
    }

    let days = current.days_until(end)?;
    total += Decimal::from(days) / Decimal::from(current.days_in_year());
    Ok(total)
}

/// Actual/Actual ISMA (ICMA) for a range inside one coupon period.
///
/// $$\text{YF} = \frac{\text{months}}{12} \times \frac{\text{days}}{\text{days in period}}$$
///
/// Periods shorter than half a month are measured against the year that
/// starts on the period start.
pub(crate) fn isma_fraction(start: Dt, end: Dt, period_start: Dt, period_end: Dt) -> SettleResult<Decimal> {
    let days = start.days_until(end)?;
    let months = period_months(period_start, period_end)?;
    if months == 0 {
        let year_end = period_start.add_months(12, CycleRule::None)?;
        let year_days = period_start.days_until(year_end)?;
        return Ok(Decimal::from(days) / Decimal::from(year_days));
    }
    let period_days = period_start.days_until(period_end)?;
    Ok(Decimal::from(months * days) / Decimal::from(12 * period_days))
}

/// Actual/365L (ISMA-Year) for a range inside one coupon period.
///
/// For annual periods the basis is 366 when 29 February falls inside the
/// period (start exclusive, end inclusive); otherwise it is 366 when the
/// period ends in a leap year.
pub(crate) fn act365l_fraction(start: Dt, end: Dt, period_start: Dt, period_end: Dt) -> SettleResult<Decimal> {
    let days = start.days_until(end)?;
    let leap = if period_months(period_start, period_end)? >= 12 {
        contains_leap_day(period_start, period_end)?
    } else {
        period_end.is_leap_year()
    };
    let basis = if leap { 366 } else { 365 };
    Ok(Decimal::from(days) / Decimal::from(basis))
}

/// True if a 29 February lies in `(start, end]`.
fn contains_leap_day(start: Dt, end: Dt) -> SettleResult<bool> {
    for year in start.year()..=end.year() {
        if is_leap_year(year) {
            let leap_day = Dt::new(29, 2, year)?;
            if leap_day > start.date_only() && leap_day <= end.date_only() {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Actual/Actual AFB (Euro).
///
/// Whole years are counted back from the end date; the remaining stub is
/// divided by 366 if it contains 29 February and by 365 otherwise.
pub(crate) fn afb_fraction(start: Dt, end: Dt) -> SettleResult<Decimal> {
    let start = start.date_only();
    let mut stub_end = end.date_only();
    let mut whole_years = 0i64;

    loop {
        let mut candidate = stub_end.add_months(-12, CycleRule::None)?;
        if candidate.month() == 2 && candidate.day() == 28 && candidate.is_leap_year() {
            candidate = candidate.add_days(1)?;
        }
        if candidate < start {
            break;
        }
        whole_years += 1;
        stub_end = candidate;
        if stub_end == start {
            break;
        }
    }

    let basis = if contains_leap_day_inclusive_start(start, stub_end)? {
        366
    } else {
        365
    };
    let days = start.days_until(stub_end)?;
    Ok(Decimal::from(whole_years) + Decimal::from(days) / Decimal::from(basis))
}

/// True if a 29 February lies in `[start, end)`.
fn contains_leap_day_inclusive_start(start: Dt, end: Dt) -> SettleResult<bool> {
    for year in start.year()..=end.year() {
        if is_leap_year(year) {
            let leap_day = Dt::new(29, 2, year)?;
            if leap_day >= start && leap_day < end {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dt(d: u32, m: u32, y: i32) -> Dt {
        Dt::new(d, m, y).unwrap()
    }

    #[test]
    fn test_isda_whole_years() {
        assert_eq!(isda_fraction(dt(1, 1, 2025), dt(1, 1, 2026)).unwrap(), dec!(1));
        assert_eq!(isda_fraction(dt(1, 1, 2024), dt(1, 1, 2025)).unwrap(), dec!(1));
    }

    #[test]
    fn test_isda_split_at_year_end() {
        // 184 days of 2024 over 366 plus 181 days of 2025 over 365.
        let yf = isda_fraction(dt(1, 7, 2024), dt(1, 7, 2025)).unwrap();
        assert_eq!(yf, dec!(184) / dec!(366) + dec!(181) / dec!(365));
    }

    #[test]
    fn test_period_months() {
        assert_eq!(period_months(dt(15, 11, 2023), dt(15, 5, 2024)).unwrap(), 6);
        assert_eq!(period_months(dt(15, 1, 2025), dt(15, 4, 2025)).unwrap(), 3);
        assert_eq!(period_months(dt(1, 1, 2025), dt(1, 1, 2026)).unwrap(), 12);
    }

    #[test]
    fn test_isma_within_period() {
        let yf = isma_fraction(dt(15, 11, 2024), dt(15, 1, 2025), dt(15, 11, 2024), dt(15, 5, 2025)).unwrap();
        assert_eq!(yf, dec!(6) * dec!(61) / (dec!(12) * dec!(181)));
        let full = isma_fraction(dt(15, 11, 2024), dt(15, 5, 2025), dt(15, 11, 2024), dt(15, 5, 2025)).unwrap();
        assert_eq!(full, dec!(0.5));
    }

    #[test]
    fn test_act365l() {
        // Semi-annual period ending in a leap year.
        let yf = act365l_fraction(dt(15, 11, 2023), dt(15, 2, 2024), dt(15, 11, 2023), dt(15, 5, 2024)).unwrap();
        assert_eq!(yf, dec!(92) / dec!(366));
        // Annual period containing 29-Feb.
        let yf = act365l_fraction(dt(1, 3, 2023), dt(1, 3, 2024), dt(1, 3, 2023), dt(1, 3, 2024)).unwrap();
        assert_eq!(yf, dec!(1));
        // Annual period ending in a leap year before 29-Feb.
        let yf = act365l_fraction(dt(1, 2, 2023), dt(1, 2, 2024), dt(1, 2, 2023), dt(1, 2, 2024)).unwrap();
        assert_eq!(yf, dec!(365) / dec!(365));
    }

    #[test]
    fn test_afb() {
        assert_eq!(afb_fraction(dt(1, 1, 2024), dt(1, 1, 2025)).unwrap(), dec!(1));
        // Stub 10-Jan-2024 .. 1-Mar-2024 contains 29-Feb.
        let yf = afb_fraction(dt(10, 1, 2024), dt(1, 3, 2024)).unwrap();
        assert_eq!(yf, dec!(51) / dec!(366));
        // Two whole years counted back from 28-Feb-2026.
        let yf = afb_fraction(dt(29, 2, 2024), dt(28, 2, 2026)).unwrap();
        assert_eq!(yf, dec!(2));
    }
}
