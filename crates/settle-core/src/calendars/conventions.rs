//! Business day adjustment conventions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Calendar, CalendarCalculator};
use crate::error::{SettleError, SettleResult};
use crate::types::Dt;

/// Business day adjustment conventions.
///
/// These conventions specify how to adjust a date that falls
/// on a non-business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BDConvention {
    /// No adjustment - use the date as-is even if not a business day.
    Unadjusted,

    /// Move to the following business day.
    #[default]
    Following,

    /// Move to the following business day, unless it crosses a month boundary,
    /// in which case move to the preceding business day.
    ModifiedFollowing,

    /// Move to the preceding business day.
    Preceding,

    /// Move to the preceding business day, unless it crosses a month boundary,
    /// in which case move to the following business day.
    ModifiedPreceding,

    /// Move to the nearest business day (following on a tie).
    Nearest,

    /// Floating rate note convention.
    ///
    /// A single date rolls Modified Following; month arithmetic through
    /// [`CalendarCalculator::add_months_rolled`] keeps month-end anchors on
    /// the last business day of each month.
    Frn,
}

impl BDConvention {
    /// Short market code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            BDConvention::Unadjusted => "NONE",
            BDConvention::Following => "F",
            BDConvention::ModifiedFollowing => "MF",
            BDConvention::Preceding => "P",
            BDConvention::ModifiedPreceding => "MP",
            BDConvention::Nearest => "N",
            BDConvention::Frn => "FRN",
        }
    }
}

impl std::fmt::Display for BDConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BDConvention::Unadjusted => "Unadjusted",
            BDConvention::Following => "Following",
            BDConvention::ModifiedFollowing => "Modified Following",
            BDConvention::Preceding => "Preceding",
            BDConvention::ModifiedPreceding => "Modified Preceding",
            BDConvention::Nearest => "Nearest",
            BDConvention::Frn => "FRN",
        };
        write!(f, "{name}")
    }
}

impl FromStr for BDConvention {
    type Err = SettleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();
        match key.as_str() {
            "NONE" | "UNADJUSTED" | "U" => Ok(BDConvention::Unadjusted),
            "F" | "FOLLOWING" | "FOLL" => Ok(BDConvention::Following),
            "MF" | "MODIFIEDFOLLOWING" | "MODFOLLOWING" | "MODFOLL" => Ok(BDConvention::ModifiedFollowing),
            "P" | "PRECEDING" | "PREC" => Ok(BDConvention::Preceding),
            "MP" | "MODIFIEDPRECEDING" | "MODPRECEDING" | "MODPREC" => Ok(BDConvention::ModifiedPreceding),
            "N" | "NEAREST" => Ok(BDConvention::Nearest),
            "FRN" | "EUROBOND" => Ok(BDConvention::Frn),
            _ => Err(SettleError::format(s, "a business day convention")),
        }
    }
}

/// Adjusts a date according to the given business day convention.
pub(crate) fn roll<C: CalendarCalculator + ?Sized>(
    calculator: &C,
    date: Dt,
    convention: BDConvention,
    calendar: Calendar,
) -> SettleResult<Dt> {
    let date = date.require("roll")?;
    if convention == BDConvention::Unadjusted || calculator.is_valid_settlement(calendar, date)? {
        return Ok(date);
    }

    match convention {
        BDConvention::Unadjusted => Ok(date),

        BDConvention::Following => following(calculator, date, calendar),

        BDConvention::ModifiedFollowing | BDConvention::Frn => {
            let adjusted = following(calculator, date, calendar)?;
            if adjusted.month() != date.month() {
                // Crossed month boundary, go preceding instead
                preceding(calculator, date, calendar)
            } else {
                Ok(adjusted)
            }
        }

        BDConvention::Preceding => preceding(calculator, date, calendar),

        BDConvention::ModifiedPreceding => {
            let adjusted = preceding(calculator, date, calendar)?;
            if adjusted.month() != date.month() {
                // Crossed month boundary, go following instead
                following(calculator, date, calendar)
            } else {
                Ok(adjusted)
            }
        }

        BDConvention::Nearest => {
            let fwd = following(calculator, date, calendar)?;
            let back = preceding(calculator, date, calendar)?;

            let fwd_days = date.days_until(fwd)?;
            let back_days = back.days_until(date)?;

            if fwd_days <= back_days {
                Ok(fwd)
            } else {
                Ok(back)
            }
        }
    }
}

/// Returns the next business day on or after the given date.
pub(crate) fn following<C: CalendarCalculator + ?Sized>(
    calculator: &C,
    mut date: Dt,
    calendar: Calendar,
) -> SettleResult<Dt> {
    while !calculator.is_valid_settlement(calendar, date)? {
        date = date.add_days(1)?;
    }
    Ok(date)
}

/// Returns the previous business day on or before the given date.
pub(crate) fn preceding<C: CalendarCalculator + ?Sized>(
    calculator: &C,
    mut date: Dt,
    calendar: Calendar,
) -> SettleResult<Dt> {
    while !calculator.is_valid_settlement(calendar, date)? {
        date = date.add_days(-1)?;
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendars::WeekendCalculator;

    fn dt(d: u32, m: u32, y: i32) -> Dt {
        Dt::new(d, m, y).unwrap()
    }

    #[test]
    fn test_following() {
        let calc = WeekendCalculator;

        // Saturday should roll to Monday
        let saturday = dt(4, 1, 2025);
        let adjusted = roll(&calc, saturday, BDConvention::Following, Calendar::NONE).unwrap();

        assert_eq!(adjusted, dt(6, 1, 2025));
    }

    #[test]
    fn test_preceding() {
        let calc = WeekendCalculator;

        // Saturday should roll to Friday
        let saturday = dt(4, 1, 2025);
        let adjusted = roll(&calc, saturday, BDConvention::Preceding, Calendar::NONE).unwrap();

        assert_eq!(adjusted, dt(3, 1, 2025));
    }

    #[test]
    fn test_modified_following() {
        let calc = WeekendCalculator;

        // Sunday Jan 5 should roll to Monday Jan 6 (same month)
        let sunday = dt(5, 1, 2025);
        let adjusted = roll(&calc, sunday, BDConvention::ModifiedFollowing, Calendar::NONE).unwrap();
        assert_eq!(adjusted, dt(6, 1, 2025));

        // Saturday May 31 would cross into June, so go back to Friday May 30
        let month_end = dt(31, 5, 2025);
        assert_eq!(
            roll(&calc, month_end, BDConvention::ModifiedFollowing, Calendar::NONE).unwrap(),
            dt(30, 5, 2025)
        );
        assert_eq!(
            roll(&calc, month_end, BDConvention::Frn, Calendar::NONE).unwrap(),
            dt(30, 5, 2025)
        );
    }

    #[test]
    fn test_modified_preceding() {
        let calc = WeekendCalculator;

        // Saturday Feb 1 2025 would cross into January, so go forward to Monday Feb 3
        let adjusted = roll(&calc, dt(1, 2, 2025), BDConvention::ModifiedPreceding, Calendar::NONE).unwrap();
        assert_eq!(adjusted, dt(3, 2, 2025));
    }

    #[test]
    fn test_nearest() {
        let calc = WeekendCalculator;

        // Saturday is closer to Friday, Sunday closer to Monday
        assert_eq!(
            roll(&calc, dt(4, 1, 2025), BDConvention::Nearest, Calendar::NONE).unwrap(),
            dt(3, 1, 2025)
        );
        assert_eq!(
            roll(&calc, dt(5, 1, 2025), BDConvention::Nearest, Calendar::NONE).unwrap(),
            dt(6, 1, 2025)
        );
        // Friday/Saturday weekend: Sunday is one day ahead, Thursday two back
        assert_eq!(
            roll(&calc, dt(4, 1, 2025), BDConvention::Nearest, Calendar::FRISAT).unwrap(),
            dt(5, 1, 2025)
        );
    }

    #[test]
    fn test_nearest_tie_goes_forward() {
        let calc = WeekendCalculator;

        // Friday-only weekend: Thursday and Saturday are both one day away
        assert_eq!(
            roll(&calc, dt(3, 1, 2025), BDConvention::Nearest, Calendar::FRI).unwrap(),
            dt(4, 1, 2025)
        );
    }

    #[test]
    fn test_unadjusted() {
        let calc = WeekendCalculator;

        let saturday = dt(4, 1, 2025);
        let adjusted = roll(&calc, saturday, BDConvention::Unadjusted, Calendar::NONE).unwrap();

        assert_eq!(adjusted, saturday);
    }

    #[test]
    fn test_business_day_unchanged() {
        let calc = WeekendCalculator;

        let monday = dt(6, 1, 2025);
        for convention in [
            BDConvention::Following,
            BDConvention::ModifiedFollowing,
            BDConvention::Preceding,
            BDConvention::ModifiedPreceding,
            BDConvention::Nearest,
            BDConvention::Frn,
        ] {
            assert_eq!(roll(&calc, monday, convention, Calendar::NONE).unwrap(), monday);
        }
    }

    #[test]
    fn test_empty_date_rejected() {
        let calc = WeekendCalculator;
        assert!(roll(&calc, Dt::EMPTY, BDConvention::Following, Calendar::NONE).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("MF".parse::<BDConvention>().unwrap(), BDConvention::ModifiedFollowing);
        assert_eq!("Modified Following".parse::<BDConvention>().unwrap(), BDConvention::ModifiedFollowing);
        assert_eq!("mod_prec".parse::<BDConvention>().unwrap(), BDConvention::ModifiedPreceding);
        assert_eq!("none".parse::<BDConvention>().unwrap(), BDConvention::Unadjusted);
        assert_eq!("FRN".parse::<BDConvention>().unwrap(), BDConvention::Frn);
        assert!("sideways".parse::<BDConvention>().is_err());

        for convention in [BDConvention::Following, BDConvention::Nearest, BDConvention::Frn] {
            assert_eq!(convention.code().parse::<BDConvention>().unwrap(), convention);
            assert_eq!(convention.to_string().parse::<BDConvention>().unwrap(), convention);
        }
    }
}
