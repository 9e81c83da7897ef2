//! Time units and payment frequencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Tenor;
use crate::error::{SettleError, SettleResult};

/// Unit of a [`Tenor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Calendar days
    Days,
    /// Weeks of seven days
    Weeks,
    /// Calendar months
    Months,
    /// Years of twelve months
    Years,
}

impl TimeUnit {
    /// Returns the single-letter code used in tenor strings.
    #[must_use]
    pub fn letter(&self) -> char {
        match self {
            TimeUnit::Days => 'D',
            TimeUnit::Weeks => 'W',
            TimeUnit::Months => 'M',
            TimeUnit::Years => 'Y',
        }
    }

    /// Parses a unit letter, case-insensitively.
    ///
    /// The frequency aliases `A`, `S` and `Q` are not units; they are handled
    /// by the tenor parser because they scale the count.
    #[must_use]
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'D' => Some(TimeUnit::Days),
            'W' => Some(TimeUnit::Weeks),
            'M' => Some(TimeUnit::Months),
            'Y' => Some(TimeUnit::Years),
            _ => None,
        }
    }

    /// Returns true for units measured in days (days and weeks).
    #[must_use]
    pub fn is_day_based(&self) -> bool {
        matches!(self, TimeUnit::Days | TimeUnit::Weeks)
    }

    /// Approximate number of days in one unit (30-day months, 360-day years).
    #[must_use]
    pub fn approx_days(&self) -> i64 {
        match self {
            TimeUnit::Days => 1,
            TimeUnit::Weeks => 7,
            TimeUnit::Months => 30,
            TimeUnit::Years => 360,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Days => "Days",
            TimeUnit::Weeks => "Weeks",
            TimeUnit::Months => "Months",
            TimeUnit::Years => "Years",
        };
        write!(f, "{name}")
    }
}

/// Payment or reset frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// No periodic payments (single payment at maturity)
    Zero,
    /// Annual payments (1 per year)
    Annual,
    /// Semi-annual payments (2 per year)
    #[default]
    SemiAnnual,
    /// Every four months (3 per year)
    EveryFourMonths,
    /// Quarterly payments (4 per year)
    Quarterly,
    /// Every two months (6 per year)
    BiMonthly,
    /// Monthly payments (12 per year)
    Monthly,
    /// Every four weeks (13 per year)
    FourWeekly,
    /// Every two weeks (26 per year)
    BiWeekly,
    /// Weekly payments (52 per year)
    Weekly,
    /// Daily payments (365 per year)
    Daily,
}

impl Frequency {
    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Zero => 0,
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::EveryFourMonths => 3,
            Frequency::Quarterly => 4,
            Frequency::BiMonthly => 6,
            Frequency::Monthly => 12,
            Frequency::FourWeekly => 13,
            Frequency::BiWeekly => 26,
            Frequency::Weekly => 52,
            Frequency::Daily => 365,
        }
    }

    /// Returns the tenor of one period. [`Frequency::Zero`] maps to the empty tenor.
    #[must_use]
    pub fn tenor(&self) -> Tenor {
        match self {
            Frequency::Zero => Tenor::EMPTY,
            Frequency::Annual => Tenor::new(1, TimeUnit::Years),
            Frequency::SemiAnnual => Tenor::new(6, TimeUnit::Months),
            Frequency::EveryFourMonths => Tenor::new(4, TimeUnit::Months),
            Frequency::Quarterly => Tenor::new(3, TimeUnit::Months),
            Frequency::BiMonthly => Tenor::new(2, TimeUnit::Months),
            Frequency::Monthly => Tenor::new(1, TimeUnit::Months),
            Frequency::FourWeekly => Tenor::new(4, TimeUnit::Weeks),
            Frequency::BiWeekly => Tenor::new(2, TimeUnit::Weeks),
            Frequency::Weekly => Tenor::new(1, TimeUnit::Weeks),
            Frequency::Daily => Tenor::new(1, TimeUnit::Days),
        }
    }

    /// Returns the number of months per period, or `None` for week/day based frequencies.
    #[must_use]
    pub fn months_per_period(&self) -> Option<u32> {
        match self {
            Frequency::Annual => Some(12),
            Frequency::SemiAnnual => Some(6),
            Frequency::EveryFourMonths => Some(4),
            Frequency::Quarterly => Some(3),
            Frequency::BiMonthly => Some(2),
            Frequency::Monthly => Some(1),
            _ => None,
        }
    }

    /// Returns the frequency whose period is exactly `tenor`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` if no frequency has that period.
    pub fn from_tenor(tenor: Tenor) -> SettleResult<Self> {
        if tenor.is_empty() {
            return Ok(Frequency::Zero);
        }
        Self::all()
            .iter()
            .copied()
            .find(|f| !f.is_zero() && f.tenor() == tenor)
            .ok_or_else(|| SettleError::out_of_range(format!("no frequency has period {tenor}")))
    }

    /// Returns true if this is a zero coupon (no periodic payments).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        matches!(self, Frequency::Zero)
    }

    /// Returns all frequencies.
    #[must_use]
    pub fn all() -> &'static [Frequency] {
        &[
            Frequency::Zero,
            Frequency::Annual,
            Frequency::SemiAnnual,
            Frequency::EveryFourMonths,
            Frequency::Quarterly,
            Frequency::BiMonthly,
            Frequency::Monthly,
            Frequency::FourWeekly,
            Frequency::BiWeekly,
            Frequency::Weekly,
            Frequency::Daily,
        ]
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Zero => "Zero Coupon",
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::EveryFourMonths => "Every Four Months",
            Frequency::Quarterly => "Quarterly",
            Frequency::BiMonthly => "Bi-Monthly",
            Frequency::Monthly => "Monthly",
            Frequency::FourWeekly => "Four-Weekly",
            Frequency::BiWeekly => "Bi-Weekly",
            Frequency::Weekly => "Weekly",
            Frequency::Daily => "Daily",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Frequency {
    type Err = SettleError;

    /// Parses names ("Semi-Annual", "quarterly"), short codes ("S", "Q") or
    /// period tenors ("6M", "1W").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "Z" | "ZERO" | "ZEROCOUPON" | "NONE" | "ONCE" => Ok(Frequency::Zero),
            "A" | "ANNUAL" | "YEARLY" => Ok(Frequency::Annual),
            "S" | "SEMIANNUAL" | "SEMI" => Ok(Frequency::SemiAnnual),
            "T" | "EVERYFOURMONTHS" | "TRIANNUAL" => Ok(Frequency::EveryFourMonths),
            "Q" | "QUARTERLY" => Ok(Frequency::Quarterly),
            "B" | "BIMONTHLY" => Ok(Frequency::BiMonthly),
            "M" | "MONTHLY" => Ok(Frequency::Monthly),
            "FOURWEEKLY" | "LUNAR" => Ok(Frequency::FourWeekly),
            "BIWEEKLY" | "FORTNIGHTLY" => Ok(Frequency::BiWeekly),
            "W" | "WEEKLY" => Ok(Frequency::Weekly),
            "D" | "DAILY" => Ok(Frequency::Daily),
            _ => {
                let tenor: Tenor = s
                    .parse()
                    .map_err(|_| SettleError::format(s, "a frequency"))?;
                Frequency::from_tenor(tenor).map_err(|_| SettleError::format(s, "a frequency"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_periods() {
        assert_eq!(Frequency::Annual.periods_per_year(), 1);
        assert_eq!(Frequency::SemiAnnual.periods_per_year(), 2);
        assert_eq!(Frequency::Quarterly.periods_per_year(), 4);
        assert_eq!(Frequency::Monthly.periods_per_year(), 12);
        assert_eq!(Frequency::Zero.periods_per_year(), 0);
    }

    #[test]
    fn test_frequency_tenor() {
        assert_eq!(Frequency::SemiAnnual.tenor().to_string(), "6M");
        assert_eq!(Frequency::BiWeekly.tenor().to_string(), "2W");
        assert!(Frequency::Zero.tenor().is_empty());
    }

    #[test]
    fn test_frequency_from_tenor() {
        assert_eq!(
            Frequency::from_tenor(Tenor::new(12, TimeUnit::Months)).unwrap(),
            Frequency::Annual
        );
        assert_eq!(
            Frequency::from_tenor(Tenor::new(7, TimeUnit::Days)).unwrap(),
            Frequency::Weekly
        );
        assert!(Frequency::from_tenor(Tenor::new(5, TimeUnit::Months)).is_err());
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("S".parse::<Frequency>().unwrap(), Frequency::SemiAnnual);
        assert_eq!("quarterly".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert_eq!("Semi-Annual".parse::<Frequency>().unwrap(), Frequency::SemiAnnual);
        assert_eq!("1Y".parse::<Frequency>().unwrap(), Frequency::Annual);
        assert!("7M".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_time_unit_letters() {
        assert_eq!(TimeUnit::from_letter('m'), Some(TimeUnit::Months));
        assert_eq!(TimeUnit::Years.letter(), 'Y');
        assert_eq!(TimeUnit::from_letter('q'), None);
    }
}
