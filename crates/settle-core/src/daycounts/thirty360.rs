//! 30/360 day counts.
//!
//! Every variant computes
//!
//! $$\text{Days} = 360 \times (Y_2 - Y_1) + 30 \times (M_2 - M_1) + (D_2 - D_1)$$
//!
//! and differs only in how `D1` and `D2` are adjusted at month end.

use crate::types::Dt;

/// Adjusted day-month-year triple.
#[derive(Debug, Clone, Copy)]
struct Ymd {
    y: i64,
    m: i64,
    d: i64,
}

impl From<Dt> for Ymd {
    fn from(date: Dt) -> Self {
        Self {
            y: i64::from(date.year()),
            m: i64::from(date.month()),
            d: i64::from(date.day()),
        }
    }
}

fn days(start: Ymd, end: Ymd) -> i64 {
    360 * (end.y - start.y) + 30 * (end.m - start.m) + (end.d - start.d)
}

#[inline]
fn is_last_day_of_february(date: Dt) -> bool {
    date.month() == 2 && date.is_end_of_month()
}

/// 30/360 US with the February end-of-month rules.
///
/// 1. If D1 is the last day of February, D1 = 30
/// 2. If D1 is 31, D1 = 30
/// 3. If D2 is the last day of February and D1 was too, D2 = 30
/// 4. If D2 is 31 and D1 is now >= 30, D2 = 30
pub(crate) fn us_days(start: Dt, end: Dt) -> i64 {
    let (mut a, mut b) = (Ymd::from(start), Ymd::from(end));
    let start_feb_eom = is_last_day_of_february(start);

    if start_feb_eom || a.d == 31 {
        a.d = 30;
    }
    if (start_feb_eom && is_last_day_of_february(end)) || (b.d == 31 && a.d >= 30) {
        b.d = 30;
    }
    days(a, b)
}

/// 30/360 ISDA (bond basis).
///
/// 1. If D1 is 31, D1 = 30
/// 2. If D2 is 31 and D1 is now 30, D2 = 30
pub(crate) fn isda_days(start: Dt, end: Dt) -> i64 {
    let (mut a, mut b) = (Ymd::from(start), Ymd::from(end));
    if a.d == 31 {
        a.d = 30;
    }
    if b.d == 31 && a.d >= 30 {
        b.d = 30;
    }
    days(a, b)
}

/// 30E/360 (Eurobond basis, ISMA): day 31 becomes 30 on either end,
/// independently of the other date.
pub(crate) fn isma_days(start: Dt, end: Dt) -> i64 {
    let (mut a, mut b) = (Ymd::from(start), Ymd::from(end));
    a.d = a.d.min(30);
    b.d = b.d.min(30);
    days(a, b)
}

/// 30E/360 ISDA (German).
///
/// 1. If D1 is the last day of the month, D1 = 30
/// 2. If D2 is 31, D2 = 30
/// 3. If D2 is the last day of February and not the maturity date, D2 = 30
pub(crate) fn e_isda_days(start: Dt, end: Dt, maturity: Option<Dt>) -> i64 {
    let (mut a, mut b) = (Ymd::from(start), Ymd::from(end));
    if start.is_end_of_month() {
        a.d = 30;
    }
    let is_maturity = maturity.is_some_and(|m| m.date_only() == end.date_only());
    if b.d == 31 || (is_last_day_of_february(end) && !is_maturity) {
        b.d = 30;
    }
    days(a, b)
}

/// 30E+/360: D1 31 becomes 30; D2 31 rolls to day 1 of the next month.
pub(crate) fn e_plus_days(start: Dt, end: Dt) -> i64 {
    let (mut a, mut b) = (Ymd::from(start), Ymd::from(end));
    if a.d == 31 {
        a.d = 30;
    }
    if b.d == 31 {
        b.d = 1;
        b.m += 1;
    }
    days(a, b)
}
