//! Built-in calendar identities.
//!
//! Ids are the positions in [`BUILTINS`]; the first entries match the
//! `Calendar` constants. Weekend-convention calendars carry their weekend
//! and never touch the data source; centre codes resolve through it.
//!
//! Only these are built in. Any other centre is registered on first
//! use when the data source lists it, typically from a `<NAME>.dat` file.

use super::{Calendar, WeekendMask};

pub(crate) struct Builtin {
    pub(crate) name: &'static str,
    pub(crate) description: &'static str,
    /// Weekend of a calendar resolved without the data source.
    pub(crate) weekend: Option<WeekendMask>,
}

const fn weekend(name: &'static str, description: &'static str, mask: WeekendMask) -> Builtin {
    Builtin {
        name,
        description,
        weekend: Some(mask),
    }
}

const fn centre(name: &'static str, description: &'static str) -> Builtin {
    Builtin {
        name,
        description,
        weekend: None,
    }
}

pub(crate) const BUILTINS: &[Builtin] = &[
    weekend("NONE", "Weekends only", WeekendMask::SAT_SUN),
    weekend("SATSUN", "Saturday/Sunday weekend", WeekendMask::SAT_SUN),
    weekend("FRISAT", "Friday/Saturday weekend", WeekendMask::FRI_SAT),
    weekend("THUFRI", "Thursday/Friday weekend", WeekendMask::THU_FRI),
    weekend("FRI", "Friday weekend", WeekendMask::FRI),
    weekend("SUN", "Sunday weekend", WeekendMask::SUN),
    weekend("NOWKND", "No weekend", WeekendMask::EMPTY),
    centre("NYB", "New York banking"),
    centre("USG", "US government securities"),
    centre("LNB", "London banking"),
    centre("TGT", "TARGET euro settlement"),
    centre("TKB", "Tokyo banking"),
    centre("ZUB", "Zurich banking"),
    centre("FRB", "Frankfurt banking"),
    centre("PAB", "Paris banking"),
    centre("AMB", "Amsterdam banking"),
    centre("BRB", "Brussels banking"),
    centre("MIB", "Milan banking"),
    centre("MAB", "Madrid banking"),
    centre("STB", "Stockholm banking"),
    centre("OSB", "Oslo banking"),
    centre("COB", "Copenhagen banking"),
    centre("TOB", "Toronto banking"),
    centre("MOB", "Montreal banking"),
    centre("SYB", "Sydney banking"),
    centre("MEB", "Melbourne banking"),
    centre("WEB", "Wellington banking"),
    centre("AUB", "Auckland banking"),
    centre("HKB", "Hong Kong banking"),
    centre("SIB", "Singapore banking"),
    centre("SEB", "Seoul banking"),
    centre("BEB", "Beijing banking"),
    centre("MUB", "Mumbai banking"),
    centre("JOB", "Johannesburg banking"),
    centre("MXB", "Mexico City banking"),
    centre("SPB", "Sao Paulo banking"),
];

/// Weekend of a weekend-convention calendar, `None` for every other handle.
pub(crate) fn weekend_of(calendar: Calendar) -> Option<WeekendMask> {
    BUILTINS.get(calendar.index()).and_then(|entry| entry.weekend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_match_table() {
        for (calendar, name) in [
            (Calendar::NONE, "NONE"),
            (Calendar::SATSUN, "SATSUN"),
            (Calendar::FRISAT, "FRISAT"),
            (Calendar::THUFRI, "THUFRI"),
            (Calendar::FRI, "FRI"),
            (Calendar::SUN, "SUN"),
            (Calendar::NOWKND, "NOWKND"),
            (Calendar::NYB, "NYB"),
            (Calendar::USG, "USG"),
            (Calendar::LNB, "LNB"),
            (Calendar::TGT, "TGT"),
            (Calendar::TKB, "TKB"),
        ] {
            assert_eq!(BUILTINS[calendar.index()].name, name);
            assert_eq!(calendar.to_string(), name);
        }
    }

    #[test]
    fn test_names_unique() {
        for (i, a) in BUILTINS.iter().enumerate() {
            assert!(!a.name.contains(['+', ',']));
            for b in &BUILTINS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_weekend_of() {
        assert_eq!(weekend_of(Calendar::NONE), Some(WeekendMask::SAT_SUN));
        assert_eq!(weekend_of(Calendar::NOWKND), Some(WeekendMask::EMPTY));
        assert_eq!(weekend_of(Calendar::NYB), None);
        assert_eq!(weekend_of(Calendar::from_id(999)), None);
    }
}
