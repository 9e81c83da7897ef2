//! # Settle Core
//!
//! Calendar-aware date arithmetic for fixed income analytics.
//!
//! This crate provides the date building blocks used when scheduling and
//! accruing cash flows:
//!
//! - **Types**: the packed [`Dt`] date, [`Tenor`], [`Frequency`] and [`CycleRule`]
//! - **Calendars**: a thread-safe registry of holiday calendars, composite
//!   calendars such as `"NYB+LNB"`, and business-day rolling
//! - **Day Count Conventions**: raw day counts and accrual fractions, including
//!   Act/Act coupon-period splitting
//! - **IMM and CDS dates**: quarterly futures dates and CDS roll dates
//!
//! ## Example
//!
//! ```rust
//! use settle_core::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let registry = CalendarRegistry::default();
//! let london = registry.calendar("LNB").unwrap();
//!
//! // 25-Dec-2027 is a Saturday: the substitute days are 27 and 28 December.
//! let start = Dt::new(24, 12, 2027).unwrap();
//! let next = registry.add_business_days(start, 1, london).unwrap();
//! assert_eq!(next, Dt::new(29, 12, 2027).unwrap());
//!
//! let end = start.add_tenor("6M".parse().unwrap()).unwrap();
//! let yf = DayCount::Act360.year_fraction(start, end).unwrap();
//! assert_eq!(yf, Decimal::from(183) / Decimal::from(360));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::manual_div_ceil)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::if_not_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::single_match)]
#![allow(clippy::unused_self)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::if_same_then_else)]
#![allow(clippy::unnecessary_map_or)]
#![allow(clippy::cast_possible_truncation)]

pub mod calendars;
pub mod config;
pub mod daycounts;
pub mod error;
pub mod types;


/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calendars::{BDConvention, Calendar, CalendarCalculator, CalendarRegistry, WeekendCalculator};
    pub use crate::config::EngineConfig;
    pub use crate::daycounts::DayCount;
    pub use crate::error::{SettleError, SettleResult};
    pub use crate::types::{CdsRules, CycleRule, Dt, Frequency, Tenor, TimeUnit};
}

// Re-export commonly used types at crate root
pub use calendars::{BDConvention, Calendar, CalendarCalculator, CalendarRegistry};
pub use daycounts::DayCount;
pub use error::{SettleError, SettleResult};
pub use types::{Dt, Frequency, Tenor};
