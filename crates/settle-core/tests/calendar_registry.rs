//! Integration tests for the calendar registry.
//!
//! Exercises the rule-generated centre calendars, composite merging and
//! concurrent first resolution through the public API only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use settle_core::calendars::{
    BDConvention, Calendar, CalendarCalculator, CalendarRegistry, CalendarSource, CalendarStatus, RuleSource,
    StaticSource,
};
use settle_core::{Dt, SettleError, SettleResult};

fn dt(d: u32, m: u32, y: i32) -> Dt {
    Dt::new(d, m, y).unwrap()
}

/// Static source that counts how often each load happens.
struct CountingSource {
    inner: StaticSource,
    loads: AtomicUsize,
}

impl CountingSource {
    fn new() -> Self {
        Self {
            inner: StaticSource::new()
                .with_calendar("AAA", vec![20250101, 20250102])
                .with_calendar("BBB", vec![20250106]),
            loads: AtomicUsize::new(0),
        }
    }
}

impl CalendarSource for CountingSource {
    fn load_calendar(&self, name: &str) -> SettleResult<Vec<i32>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Widen the race window for concurrent first lookups
        thread::yield_now();
        self.inner.load_calendar(name)
    }

    fn calendar_names(&self) -> Vec<String> {
        self.inner.calendar_names()
    }
}

// ============================================================================
// Rule-generated centres
// ============================================================================

#[test]
fn test_centres_resolve_from_rules() {
    let registry = CalendarRegistry::default();
    for calendar in [Calendar::NYB, Calendar::USG, Calendar::LNB, Calendar::TGT, Calendar::TKB] {
        let resolution = registry.lookup(calendar).unwrap();
        assert_eq!(resolution.status(), &CalendarStatus::Valid, "{calendar}");
        assert!(!resolution.holidays().is_empty(), "{calendar}");
    }
}

#[test]
fn test_centre_without_rules_is_invalid() {
    let registry = CalendarRegistry::default();
    let zurich = registry.calendar("ZUB").unwrap();
    assert!(!registry.lookup(zurich).unwrap().is_valid());
    assert!(matches!(
        registry.is_business_day(zurich, dt(2, 1, 2025)),
        Err(SettleError::CalendarInvalid { .. })
    ));
}

#[test]
fn test_christmas_and_new_year() {
    let registry = CalendarRegistry::default();
    for calendar in [Calendar::NYB, Calendar::LNB, Calendar::TGT] {
        assert!(!registry.is_business_day(calendar, dt(25, 12, 2024)).unwrap(), "{calendar}");
        assert!(!registry.is_business_day(calendar, dt(1, 1, 2025)).unwrap(), "{calendar}");
        assert!(registry.is_business_day(calendar, dt(2, 1, 2025)).unwrap(), "{calendar}");
    }
}

// ============================================================================
// Composites
// ============================================================================

#[test]
fn test_composite_is_union_of_bases() {
    let registry = CalendarRegistry::default();
    let joint = registry.calendar("NYB+TGT").unwrap();

    let mut date = dt(1, 1, 2025);
    while date < dt(1, 1, 2026) {
        let expected = registry.is_business_day(Calendar::NYB, date).unwrap()
            && registry.is_business_day(Calendar::TGT, date).unwrap();
        assert_eq!(registry.is_business_day(joint, date).unwrap(), expected, "{date}");
        date = date.add_days(1).unwrap();
    }
}

#[test]
fn test_composite_names_are_canonical() {
    let registry = CalendarRegistry::default();
    let joint = registry.calendar(" nyb , lnb ").unwrap();
    assert_eq!(registry.name_of(joint).as_deref(), Some("NYB+LNB"));
    assert_eq!(registry.calendar("NYB+LNB+nyb").unwrap(), joint);
    assert_ne!(registry.calendar("LNB+NYB").unwrap(), joint);
    assert!(registry.names().contains(&"NYB+LNB".to_string()));
}

#[test]
fn test_composite_roll_and_spot() {
    let registry = CalendarRegistry::default();
    let joint = registry.calendar("NYB+LNB").unwrap();

    // Friday 4-Jul-2025 is closed in New York only
    assert_eq!(
        registry.add_business_days(dt(2, 7, 2025), 2, joint).unwrap(),
        dt(7, 7, 2025)
    );
    assert_eq!(
        registry.roll(dt(4, 7, 2025), BDConvention::Preceding, joint).unwrap(),
        dt(3, 7, 2025)
    );
}

#[test]
fn test_reset_retires_handles() {
    let registry = CalendarRegistry::new(
        StaticSource::new()
            .with_calendar("AAA", vec![20250101])
            .with_calendar("BBB", vec![20250107]),
    );
    let stale = registry.calendar("AAA").unwrap();
    let stale_joint = registry.calendar("AAA+BBB").unwrap();
    registry.reset();

    let bbb = registry.calendar("BBB").unwrap();
    assert_ne!(bbb, stale);
    assert_ne!(bbb, stale_joint);
    assert_eq!(registry.name_of(stale), None);
    assert!(matches!(
        registry.is_business_day(stale, dt(7, 1, 2025)),
        Err(SettleError::CalendarNotFound { .. })
    ));
    assert!(!registry.is_business_day(bbb, dt(7, 1, 2025)).unwrap());

    // The name comes back under a fresh id
    let aaa = registry.calendar("AAA").unwrap();
    assert_ne!(aaa, stale);
    assert!(!registry.is_business_day(aaa, dt(1, 1, 2025)).unwrap());
    assert!(registry.is_business_day(aaa, dt(7, 1, 2025)).unwrap());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_first_resolution_loads_once() {
    const THREADS: usize = 8;

    let source = Arc::new(CountingSource::new());
    let registry = Arc::new(CalendarRegistry::with_shared_source(source.clone()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let name = if i % 2 == 0 { "AAA+BBB" } else { "aaa,bbb" };
                let joint = registry.calendar(name).unwrap();
                let open = registry.is_business_day(joint, dt(6, 1, 2025)).unwrap();
                (joint, open)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = results[0].0;
    for (joint, open) in results {
        assert_eq!(joint, first);
        assert!(!open);
    }
    // One load per base calendar
    assert_eq!(source.loads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_registration_of_distinct_names() {
    let registry = Arc::new(CalendarRegistry::default());
    let names = ["NYB+LNB", "LNB+TGT", "TGT+TKB", "NYB+TKB", "USG+LNB"];

    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            let registry = Arc::clone(&registry);
            let name = name.to_string();
            thread::spawn(move || {
                let calendar = registry.calendar(&name).unwrap();
                registry.lookup(calendar).unwrap();
                (name, calendar)
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        let (name, calendar) = handle.join().unwrap();
        assert_eq!(registry.name_of(calendar), Some(name));
        ids.push(calendar.id());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), names.len());
}
