//! IMM and CDS standard dates.
//!
//! IMM dates are the third Wednesday of March, June, September and December.
//! CDS dates are the 20th of those months; which of them a contract rolls to
//! depends on whether the trade date falls before or after the configured
//! cutover to the semi-annual roll cycle.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::{CycleRule, Dt, Tenor};
use crate::error::{SettleError, SettleResult};

/// Futures month codes, January to December.
const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Start of the semi-annual CDS roll cycle under the 2015 ISDA convention.
pub const DEFAULT_CDS_CUTOVER: Dt = Dt::from_ymd_unchecked(2015, 12, 20);

/// Rules for CDS maturity and roll dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdsRules {
    /// Trade dates on or after the cutover use the semi-annual roll cycle;
    /// earlier dates use the quarterly cycle.
    pub cutover: Dt,
}

impl CdsRules {
    /// Creates rules with the given cutover.
    #[must_use]
    pub fn new(cutover: Dt) -> Self {
        Self { cutover }
    }

    /// Returns true if `date` falls under the semi-annual roll cycle.
    #[must_use]
    pub fn is_semiannual(&self, date: Dt) -> bool {
        date.date_only() >= self.cutover.date_only()
    }
}

impl Default for CdsRules {
    fn default() -> Self {
        Self::new(DEFAULT_CDS_CUTOVER)
    }
}

fn is_quarter_month(month: u32) -> bool {
    month % 3 == 0
}

impl Dt {
    /// Returns the third Wednesday of `month` in `year`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` for an unsupported month.
    pub fn imm_date(year: i32, month: u32) -> SettleResult<Dt> {
        CycleRule::Imm.anchor(year, month, 1)
    }

    /// Returns true for a quarterly IMM date.
    #[must_use]
    pub fn is_imm_date(&self) -> bool {
        !self.is_empty()
            && is_quarter_month(self.month())
            && self.day_of_week() == Weekday::Wed
            && (15..=21).contains(&self.day())
    }

    /// Returns the first quarterly IMM date strictly after this date.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` for the empty date and
    /// `SettleError::OutOfRange` past the end of 2150.
    pub fn imm_next(&self) -> SettleResult<Dt> {
        let date = self.require("imm_next")?.date_only();
        let quarter_end = date.add_months(2 - ((date.month() as i32 + 2) % 3), CycleRule::Imm)?;
        if quarter_end > date {
            Ok(quarter_end)
        } else {
            quarter_end.add_months(3, CycleRule::Imm)
        }
    }

    /// Returns the last quarterly IMM date strictly before this date.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` for the empty date and
    /// `SettleError::OutOfRange` before 1900.
    pub fn imm_prev(&self) -> SettleResult<Dt> {
        let date = self.require("imm_prev")?.date_only();
        let quarter_start = date.add_months(-(date.month() as i32 % 3), CycleRule::Imm)?;
        if quarter_start < date {
            Ok(quarter_start)
        } else {
            quarter_start.add_months(-3, CycleRule::Imm)
        }
    }

    /// Returns the IMM code (e.g. `"H5"` for March 2025), or `None` if this
    /// is not a quarterly IMM date.
    #[must_use]
    pub fn imm_code(&self) -> Option<String> {
        if !self.is_imm_date() {
            return None;
        }
        let letter = MONTH_CODES[(self.month() - 1) as usize];
        Some(format!("{letter}{}", self.year() % 10))
    }

    /// Returns the first IMM date on or after `reference` matching `code`
    /// (a month letter followed by the last digit of the year).
    ///
    /// # Errors
    ///
    /// Returns `SettleError::Format` for a malformed code.
    pub fn from_imm_code(code: &str, reference: Dt) -> SettleResult<Dt> {
        let reference = reference.require("from_imm_code")?.date_only();
        let mut chars = code.trim().chars();
        let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(SettleError::format(code, "an IMM code"));
        };
        let month = MONTH_CODES
            .iter()
            .position(|&c| c == letter.to_ascii_uppercase())
            .ok_or_else(|| SettleError::format(code, "an IMM code"))? as u32
            + 1;
        let digit = digit
            .to_digit(10)
            .ok_or_else(|| SettleError::format(code, "an IMM code"))? as i32;

        let decade = reference.year() - reference.year() % 10;
        let candidate = Dt::imm_date(decade + digit, month)?;
        if candidate >= reference {
            Ok(candidate)
        } else {
            Dt::imm_date(decade + digit + 10, month)
        }
    }

    /// Returns true for the 20th of March, June, September or December.
    #[must_use]
    pub fn is_cds_date(&self) -> bool {
        !self.is_empty() && is_quarter_month(self.month()) && self.day() == 20
    }

    /// Returns the first quarterly CDS date strictly after this date.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` for the empty date.
    pub fn cds_next_date(&self) -> SettleResult<Dt> {
        let date = self.require("cds_next_date")?.date_only();
        let (mut year, mut month) = (date.year(), date.month());
        loop {
            if is_quarter_month(month) {
                let candidate = Dt::new(20, month, year)?;
                if candidate > date {
                    return Ok(candidate);
                }
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
    }

    /// Returns the CDS roll date that anchors a contract traded on this date.
    ///
    /// Before the cutover this is the next quarterly CDS date. From the
    /// cutover on, trades roll twice a year: 20-Mar to 19-Sep anchor on
    /// 20-Jun, 20-Sep to 19-Mar anchor on the preceding 20-Dec.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` for the empty date.
    pub fn cds_roll(&self, rules: &CdsRules) -> SettleResult<Dt> {
        let date = self.require("cds_roll")?.date_only();
        if !rules.is_semiannual(date) {
            return date.cds_next_date();
        }

        let year = date.year();
        let march_roll = Dt::new(20, 3, year)?;
        let september_roll = Dt::new(20, 9, year)?;
        if date < march_roll {
            Dt::new(20, 12, year - 1)
        } else if date < september_roll {
            Dt::new(20, 6, year)
        } else {
            Dt::new(20, 12, year)
        }
    }

    /// Returns the standard maturity of a CDS of `tenor` traded on this date.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::EmptyDate` for the empty date and range errors
    /// from the tenor arithmetic.
    pub fn cds_maturity(&self, tenor: Tenor, rules: &CdsRules) -> SettleResult<Dt> {
        self.cds_roll(rules)?.add_tenor(tenor)
    }
}
