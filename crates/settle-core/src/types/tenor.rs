//! Tenors: symbolic lengths of time such as `3M` or `5Y`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Mul, Neg};
use std::str::FromStr;

use super::{Frequency, TimeUnit};
use crate::error::{SettleError, SettleResult};

/// Largest absolute count accepted when parsing a tenor component.
const MAX_COUNT: i64 = 100_000;

/// A length of time expressed as a count of a [`TimeUnit`].
///
/// Equality compares magnitudes within a unit family: `7D == 1W` and
/// `12M == 1Y`, but `30D != 1M`. Ordering and [`Tenor::approx_days`] use
/// 30-day months and 360-day years; they are estimates only. Exact day
/// counts always go through date arithmetic.
///
/// # Example
///
/// ```rust
/// use settle_core::types::{Tenor, TimeUnit};
///
/// let t: Tenor = "1Y6M".parse().unwrap();
/// assert_eq!(t, Tenor::new(18, TimeUnit::Months));
/// assert_eq!(Tenor::new(7, TimeUnit::Days), Tenor::new(1, TimeUnit::Weeks));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Tenor {
    count: i32,
    unit: TimeUnit,
}

impl Tenor {
    /// The empty tenor (zero days).
    pub const EMPTY: Tenor = Tenor {
        count: 0,
        unit: TimeUnit::Days,
    };

    /// Creates a tenor.
    #[must_use]
    pub const fn new(count: i32, unit: TimeUnit) -> Self {
        Self { count, unit }
    }

    /// Creates a tenor of `n` days.
    #[must_use]
    pub const fn days(n: i32) -> Self {
        Self::new(n, TimeUnit::Days)
    }

    /// Creates a tenor of `n` weeks.
    #[must_use]
    pub const fn weeks(n: i32) -> Self {
        Self::new(n, TimeUnit::Weeks)
    }

    /// Creates a tenor of `n` months.
    #[must_use]
    pub const fn months(n: i32) -> Self {
        Self::new(n, TimeUnit::Months)
    }

    /// Creates a tenor of `n` years.
    #[must_use]
    pub const fn years(n: i32) -> Self {
        Self::new(n, TimeUnit::Years)
    }

    /// Returns the count.
    #[must_use]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Returns the unit.
    #[must_use]
    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Returns true if the tenor has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total length in days for day/week tenors, `None` otherwise.
    #[must_use]
    pub fn total_days(&self) -> Option<i64> {
        match self.unit {
            TimeUnit::Days => Some(i64::from(self.count)),
            TimeUnit::Weeks => Some(7 * i64::from(self.count)),
            _ => None,
        }
    }

    /// Total length in months for month/year tenors, `None` otherwise.
    #[must_use]
    pub fn total_months(&self) -> Option<i64> {
        match self.unit {
            TimeUnit::Months => Some(i64::from(self.count)),
            TimeUnit::Years => Some(12 * i64::from(self.count)),
            _ => None,
        }
    }

    /// Approximate length in days, using 30-day months and 360-day years.
    #[must_use]
    pub fn approx_days(&self) -> i64 {
        i64::from(self.count) * self.unit.approx_days()
    }

    /// Approximate length in years (approximate days over 360).
    #[must_use]
    pub fn approx_years(&self) -> f64 {
        self.approx_days() as f64 / 360.0
    }

    /// Returns the frequency whose period is this tenor.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` if no frequency has this period.
    pub fn to_frequency(&self) -> SettleResult<Frequency> {
        Frequency::from_tenor(*self)
    }

    /// Parses a tenor string.
    ///
    /// A composite string is accepted as long as every component belongs to
    /// the same unit family: `"1Y6M"` is eighteen months, `"1W3D"` ten days.
    /// Use [`Tenor::parse_components`] for strings such as `"1Y1M1W"` that
    /// mix families.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::Format` for malformed or mixed-family strings and
    /// `SettleError::OutOfRange` for magnitudes that do not fit.
    pub fn parse(s: &str) -> SettleResult<Self> {
        let parts = Self::parse_components(s)?;
        if let [single] = parts.as_slice() {
            return Ok(*single);
        }

        let day_based = parts[0].unit.is_day_based();
        if parts.iter().any(|p| p.unit.is_day_based() != day_based) {
            return Err(SettleError::format(s, "a single-family tenor"));
        }

        let same_unit = parts.iter().all(|p| p.unit == parts[0].unit);
        let (total, unit) = if same_unit {
            let total: i64 = parts.iter().map(|p| i64::from(p.count)).sum();
            (total, parts[0].unit)
        } else if day_based {
            let total: i64 = parts.iter().filter_map(Tenor::total_days).sum();
            (total, TimeUnit::Days)
        } else {
            let total: i64 = parts.iter().filter_map(Tenor::total_months).sum();
            (total, TimeUnit::Months)
        };

        let count = i32::try_from(total)
            .map_err(|_| SettleError::out_of_range(format!("tenor magnitude {total}")))?;
        Ok(Tenor::new(count, unit))
    }

    /// Multiplies the count, returning `None` on `i32` overflow.
    #[must_use]
    pub fn checked_mul(self, rhs: i32) -> Option<Self> {
        self.count.checked_mul(rhs).map(|count| Tenor::new(count, self.unit))
    }

    /// Parses a tenor string, returning `None` instead of an error.
    #[must_use]
    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// Splits a composite tenor string into its ordered components.
    ///
    /// Each component is `<integer><letter>` where the letter is one of
    /// `D W M Y` or the aliases `A` (years), `S` (six months) and `Q`
    /// (three months). A leading sign applies to every component.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::Format` for malformed strings and
    /// `SettleError::OutOfRange` for magnitudes that do not fit.
    pub fn parse_components(s: &str) -> SettleResult<Vec<Tenor>> {
        let trimmed = s.trim();
        let (sign, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (-1i64, &trimmed[1..]),
            Some(b'+') => (1i64, &trimmed[1..]),
            _ => (1i64, trimmed),
        };
        if body.is_empty() {
            return Err(SettleError::format(s, "a tenor"));
        }

        let mut parts = Vec::new();
        let mut chars = body.chars().peekable();
        while chars.peek().is_some() {
            let mut digits = String::new();
            while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(c);
                chars.next();
            }
            let letter = chars.next().ok_or_else(|| SettleError::format(s, "a tenor"))?;
            if digits.is_empty() {
                return Err(SettleError::format(s, "a tenor"));
            }

            let n: i64 = digits
                .parse()
                .map_err(|_| SettleError::out_of_range(format!("tenor magnitude {digits}")))?;
            let (factor, unit) = match letter.to_ascii_uppercase() {
                'A' => (1, TimeUnit::Years),
                'S' => (6, TimeUnit::Months),
                'Q' => (3, TimeUnit::Months),
                other => {
                    let unit = TimeUnit::from_letter(other)
                        .ok_or_else(|| SettleError::format(s, "a tenor"))?;
                    (1, unit)
                }
            };
            let count = n
                .checked_mul(factor)
                .filter(|count| *count <= MAX_COUNT)
                .ok_or_else(|| SettleError::out_of_range(format!("tenor magnitude {digits}{letter} in '{s}'")))?;
            parts.push(Tenor::new((sign * count) as i32, unit));
        }
        Ok(parts)
    }

    /// Family and magnitude used for equality and hashing.
    fn key(&self) -> (u8, i64) {
        if self.count == 0 {
            return (0, 0);
        }
        match self.unit {
            TimeUnit::Days | TimeUnit::Weeks => (1, self.total_days().unwrap_or_default()),
            TimeUnit::Months | TimeUnit::Years => (2, self.total_months().unwrap_or_default()),
        }
    }
}

impl Default for Tenor {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl PartialEq for Tenor {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Tenor {}

impl Hash for Tenor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Tenor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tenor {
    /// Orders by approximate days; ties between families (`30D` vs `1M`)
    /// put the day family first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.approx_days()
            .cmp(&other.approx_days())
            .then_with(|| self.key().0.cmp(&other.key().0))
    }
}

impl Neg for Tenor {
    type Output = Tenor;

    fn neg(self) -> Self::Output {
        Tenor::new(self.count.saturating_neg(), self.unit)
    }
}

/// Saturates at the `i32` bounds; use [`Tenor::checked_mul`] to detect overflow.
impl Mul<i32> for Tenor {
    type Output = Tenor;

    fn mul(self, rhs: i32) -> Self::Output {
        Tenor::new(self.count.saturating_mul(rhs), self.unit)
    }
}

impl From<Frequency> for Tenor {
    fn from(freq: Frequency) -> Self {
        freq.tenor()
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.letter())
    }
}

impl FromStr for Tenor {
    type Err = SettleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tenor::parse(s)
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

impl TryFrom<String> for Tenor {
    type Error = SettleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Tenor::parse(&value)
    }
}
