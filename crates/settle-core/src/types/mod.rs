//! Date and period types.
//!
//! - [`Dt`]: packed calendar date with a ten-minute intraday offset
//! - [`Tenor`]: symbolic length of time ("3M", "1Y6M")
//! - [`TimeUnit`] and [`Frequency`]: tenor units and payment frequencies
//! - [`CycleRule`] and [`DayOfMonth`]: day-of-month anchoring for rolls
//! - [`CdsRules`]: CDS roll-cycle cutover

mod cycle;
mod date;
mod date_math;
mod frequency;
mod imm;
mod tenor;

pub use cycle::{CycleRule, DayOfMonth};
pub use date::{days_in_month, is_leap_year, Dt, MAX_YEAR, MIN_YEAR, TICKS_PER_DAY};
pub use frequency::{Frequency, TimeUnit};
pub use imm::{CdsRules, DEFAULT_CDS_CUTOVER};
pub use tenor::Tenor;
