//! Cycle rules: how a rolled date is re-anchored inside its month.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::date::{days_in_month, Dt};
use crate::error::{SettleError, SettleResult};

/// A fixed day of month between 1 and 30.
///
/// Day 31 is deliberately absent: month-end anchoring is [`CycleRule::Eom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DayOfMonth(u8);

impl DayOfMonth {
    /// Creates a day of month.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` outside 1..=30.
    pub fn new(day: u32) -> SettleResult<Self> {
        if (1..=30).contains(&day) {
            Ok(Self(day as u8))
        } else {
            Err(SettleError::out_of_range(format!("day of month {day}")))
        }
    }

    /// Returns the day number.
    #[must_use]
    pub fn get(&self) -> u32 {
        u32::from(self.0)
    }
}

impl TryFrom<u32> for DayOfMonth {
    type Error = SettleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        DayOfMonth::new(value)
    }
}

impl From<DayOfMonth> for u32 {
    fn from(value: DayOfMonth) -> Self {
        value.get()
    }
}

/// Rule for re-anchoring the day after whole months have been added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CycleRule {
    /// Keep the original day, clamped to the month length.
    #[default]
    None,
    /// Pin to a fixed day, clamped to the month length.
    Day(DayOfMonth),
    /// Pin to the last day of the month.
    Eom,
    /// Third Wednesday.
    Imm,
    /// Monday before the third Wednesday (Canadian BAX).
    ImmCad,
    /// Thursday before the second Friday (Australian bank bills).
    ImmAud,
    /// First Wednesday after the ninth (New Zealand bank bills).
    ImmNzd,
    /// Second Friday (Sydney Futures Exchange).
    Sfe,
    /// Nth weekday of the month; `nth == 5` means the last one.
    NthWeekday {
        /// Occurrence, 1..=5.
        nth: u8,
        /// Weekday.
        weekday: Weekday,
    },
}

impl CycleRule {
    /// Creates an Nth-weekday rule.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` unless `nth` is 1..=5.
    pub fn nth_weekday(nth: u8, weekday: Weekday) -> SettleResult<Self> {
        if (1..=5).contains(&nth) {
            Ok(CycleRule::NthWeekday { nth, weekday })
        } else {
            Err(SettleError::out_of_range(format!("weekday occurrence {nth}")))
        }
    }

    /// Returns the anchored date in `month` of `year`.
    ///
    /// `original_day` is the day of month of the date being rolled; only
    /// [`CycleRule::None`] uses it.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` if the month is unsupported.
    pub fn anchor(&self, year: i32, month: u32, original_day: u32) -> SettleResult<Dt> {
        let last = days_in_month(year, month);
        match *self {
            CycleRule::None => Dt::new(original_day.min(last), month, year),
            CycleRule::Day(d) => Dt::new(d.get().min(last), month, year),
            CycleRule::Eom => Dt::new(last, month, year),
            CycleRule::Imm => Dt::nth_weekday(year, month, 3, Weekday::Wed),
            CycleRule::ImmCad => Dt::nth_weekday(year, month, 3, Weekday::Wed)?.add_days(-2),
            CycleRule::ImmAud => Dt::nth_weekday(year, month, 2, Weekday::Fri)?.add_days(-1),
            CycleRule::ImmNzd => {
                let ninth = Dt::new(9, month, year)?;
                let ahead = (7 + Weekday::Wed.num_days_from_monday()
                    - ninth.day_of_week().num_days_from_monday())
                    % 7;
                ninth.add_days(if ahead == 0 { 7 } else { i64::from(ahead) })
            }
            CycleRule::Sfe => Dt::nth_weekday(year, month, 2, Weekday::Fri),
            CycleRule::NthWeekday { nth: 5, weekday } => Dt::last_weekday(year, month, weekday),
            CycleRule::NthWeekday { nth, weekday } => {
                Dt::nth_weekday(year, month, u32::from(nth), weekday)
            }
        }
    }

    /// Returns true for the IMM-style rules.
    #[must_use]
    pub fn is_imm(&self) -> bool {
        matches!(
            self,
            CycleRule::Imm | CycleRule::ImmCad | CycleRule::ImmAud | CycleRule::ImmNzd | CycleRule::Sfe
        )
    }
}

impl fmt::Display for CycleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleRule::None => write!(f, "NONE"),
            CycleRule::Day(d) => write!(f, "{}", d.get()),
            CycleRule::Eom => write!(f, "EOM"),
            CycleRule::Imm => write!(f, "IMM"),
            CycleRule::ImmCad => write!(f, "IMMCAD"),
            CycleRule::ImmAud => write!(f, "IMMAUD"),
            CycleRule::ImmNzd => write!(f, "IMMNZD"),
            CycleRule::Sfe => write!(f, "SFE"),
            CycleRule::NthWeekday { nth, weekday } => {
                write!(f, "{nth}{}", weekday.to_string().to_uppercase())
            }
        }
    }
}

impl FromStr for CycleRule {
    type Err = SettleError;

    /// Parses `NONE`, `EOM`, `IMM`, `IMMCAD`, `IMMAUD`, `IMMNZD`, `SFE`, a
    /// day number `1`..`30`, or an Nth-weekday code such as `3WED` or `5FRI`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "" | "NONE" => return Ok(CycleRule::None),
            "EOM" | "END" => return Ok(CycleRule::Eom),
            "IMM" => return Ok(CycleRule::Imm),
            "IMMCAD" => return Ok(CycleRule::ImmCad),
            "IMMAUD" => return Ok(CycleRule::ImmAud),
            "IMMNZD" => return Ok(CycleRule::ImmNzd),
            "SFE" => return Ok(CycleRule::Sfe),
            _ => {}
        }

        let split = upper
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(upper.len());
        let (digits, rest) = upper.split_at(split);
        let n: u32 = digits
            .parse()
            .map_err(|_| SettleError::format(s, "a cycle rule"))?;
        if rest.is_empty() {
            return DayOfMonth::new(n).map(CycleRule::Day);
        }
        let weekday: Weekday = rest
            .parse()
            .map_err(|_| SettleError::format(s, "a cycle rule"))?;
        let nth = u8::try_from(n).map_err(|_| SettleError::out_of_range(format!("weekday occurrence {n}")))?;
        CycleRule::nth_weekday(nth, weekday)
    }
}

impl From<CycleRule> for String {
    fn from(rule: CycleRule) -> Self {
        rule.to_string()
    }
}

impl TryFrom<String> for CycleRule {
    type Error = SettleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
