//! Calendar registry.
//!
//! The registry maps names to [`Calendar`] handles and resolves each handle,
//! on first use, into a sorted holiday set and a weekend mask. Resolution
//! happens once per entry under that entry's own lock; afterwards the
//! result is shared read-only.
//!
//! Composite names list base calendars separated by `+` or `,`
//! (`"NYB+LNB"`). A composite settles on a date only if every base does:
//! its holidays and weekend days are the unions of the bases'.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};

use super::builtin::BUILTINS;
use super::{Calendar, CalendarCalculator, CalendarSource, RuleSource, WeekendMask};
use crate::error::{SettleError, SettleResult};
use crate::types::Dt;

/// Outcome of resolving a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarStatus {
    /// The calendar answers settlement queries.
    Valid,
    /// Resolution failed; settlement queries return an error.
    Invalid(String),
}

/// Resolved holiday and weekend sets of a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    status: CalendarStatus,
    /// Sorted, deduplicated `YYYYMMDD` codes.
    holidays: Vec<u32>,
    weekend: WeekendMask,
}

impl Resolution {
    fn valid(mut holidays: Vec<u32>, weekend: WeekendMask) -> Self {
        holidays.sort_unstable();
        holidays.dedup();
        Self {
            status: CalendarStatus::Valid,
            holidays,
            weekend,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            status: CalendarStatus::Invalid(reason.into()),
            holidays: Vec::new(),
            weekend: WeekendMask::SAT_SUN,
        }
    }

    /// Resolution status.
    #[must_use]
    pub fn status(&self) -> &CalendarStatus {
        &self.status
    }

    /// Returns true if the calendar resolved successfully.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == CalendarStatus::Valid
    }

    /// Holidays as sorted `YYYYMMDD` codes.
    #[must_use]
    pub fn holidays(&self) -> &[u32] {
        &self.holidays
    }

    /// Weekend days.
    #[must_use]
    pub fn weekend(&self) -> WeekendMask {
        self.weekend
    }

    /// Returns true if `date` is in the holiday set.
    #[must_use]
    pub fn is_holiday(&self, date: Dt) -> bool {
        u32::try_from(date.to_int()).is_ok_and(|code| self.holidays.binary_search(&code).is_ok())
    }

    /// Returns true if `date` is neither a weekend day nor a holiday.
    #[inline]
    #[must_use]
    pub fn settles(&self, date: Dt) -> bool {
        !self.weekend.contains(date.day_of_week()) && !self.is_holiday(date)
    }
}

enum EntryKind {
    /// Weekend-convention calendar, no data source involved.
    Weekend(WeekendMask),
    /// Loaded from the data source under the entry name.
    Source,
    /// Union of base calendars.
    Composite(Vec<Calendar>),
}

struct CalendarEntry {
    name: String,
    kind: EntryKind,
    resolution: OnceCell<Arc<Resolution>>,
    lock: Mutex<()>,
}

impl CalendarEntry {
    fn new(name: String, kind: EntryKind) -> Self {
        Self {
            name,
            kind,
            resolution: OnceCell::new(),
            lock: Mutex::new(()),
        }
    }
}

struct Entries {
    /// Indexed by id; slots of names dropped by `reset` stay `None` so
    /// their ids are never handed out again.
    list: Vec<Option<Arc<CalendarEntry>>>,
    by_name: HashMap<String, Calendar>,
}

impl Entries {
    fn builtin() -> Self {
        let mut entries = Entries {
            list: Vec::with_capacity(BUILTINS.len()),
            by_name: HashMap::with_capacity(BUILTINS.len()),
        };
        for (id, builtin) in BUILTINS.iter().enumerate() {
            let kind = builtin.weekend.map_or(EntryKind::Source, EntryKind::Weekend);
            entries.list.push(Some(Arc::new(CalendarEntry::new(builtin.name.to_string(), kind))));
            entries.by_name.insert(builtin.name.to_string(), Calendar::from_id(id as u16));
        }
        debug!("registered {} built-in calendars", BUILTINS.len());
        entries
    }
}

/// Thread-safe calendar registry.
///
/// Share it behind an `Arc`. Lookups of known names take a shared read
/// lock; registering a new name takes the registry-wide write lock.
/// Resolution of each entry is serialized by that entry's lock only, so
/// different calendars resolve in parallel.
///
/// # Example
///
/// ```
/// use settle_core::calendars::{CalendarCalculator, CalendarRegistry, RuleSource};
/// use settle_core::types::Dt;
///
/// let registry = CalendarRegistry::new(RuleSource::new());
/// let joint = registry.calendar("nyb+lnb").unwrap();
/// assert_eq!(registry.name_of(joint).as_deref(), Some("NYB+LNB"));
///
/// // 26-May-2025 is Memorial Day and the UK spring bank holiday.
/// let date = Dt::new(26, 5, 2025).unwrap();
/// assert!(!registry.is_business_day(joint, date).unwrap());
/// ```
pub struct CalendarRegistry {
    source: Arc<dyn CalendarSource>,
    entries: RwLock<Entries>,
}

impl CalendarRegistry {
    /// Creates a registry backed by `source`.
    pub fn new<S: CalendarSource + 'static>(source: S) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    /// Creates a registry backed by a shared source.
    pub fn with_shared_source(source: Arc<dyn CalendarSource>) -> Self {
        Self {
            source,
            entries: RwLock::new(Entries::builtin()),
        }
    }

    /// Returns the handle for `name`, registering it if needed.
    ///
    /// Names are case-insensitive. A name listing several calendars
    /// separated by `+` or `,` registers a composite under the canonical
    /// `+`-joined name; empty and repeated segments are dropped, order is
    /// kept, and a single remaining segment yields that calendar itself.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarNotFound` if a simple name is neither
    /// registered nor listed by the data source.
    pub fn calendar(&self, name: &str) -> SettleResult<Calendar> {
        let segments = canonical_segments(name);
        match segments.as_slice() {
            [] => Err(SettleError::calendar_not_found(name)),
            [single] => self.simple(single),
            _ => {
                let bases = segments
                    .iter()
                    .map(|segment| self.simple(segment))
                    .collect::<SettleResult<Vec<_>>>()?;
                self.register(segments.join("+"), EntryKind::Composite(bases))
            }
        }
    }

    /// Canonical name of a handle.
    #[must_use]
    pub fn name_of(&self, calendar: Calendar) -> Option<String> {
        self.entries
            .read()
            .list
            .get(calendar.index())
            .and_then(Option::as_ref)
            .map(|entry| entry.name.clone())
    }

    /// Names of all registered calendars in id order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.read().list.iter().flatten().map(|entry| entry.name.clone()).collect()
    }

    /// Human-readable description of a calendar.
    #[must_use]
    pub fn description(&self, calendar: Calendar) -> Option<String> {
        let entry = self.entry(calendar).ok()?;
        match &entry.kind {
            EntryKind::Weekend(_) => BUILTINS.get(calendar.index()).map(|b| b.description.to_string()),
            EntryKind::Source => self
                .source
                .description(&entry.name)
                .or_else(|| BUILTINS.get(calendar.index()).map(|b| b.description.to_string())),
            EntryKind::Composite(bases) => {
                let parts: Vec<String> = bases
                    .iter()
                    .map(|base| {
                        self.description(*base)
                            .or_else(|| self.name_of(*base))
                            .unwrap_or_default()
                    })
                    .collect();
                Some(parts.join(" + "))
            }
        }
    }

    /// Resolves a calendar, loading its data on first use.
    ///
    /// An entry whose data is malformed or cannot be loaded resolves to an
    /// [`CalendarStatus::Invalid`] resolution rather than an error.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarNotFound` for an unknown handle.
    pub fn lookup(&self, calendar: Calendar) -> SettleResult<Arc<Resolution>> {
        let entry = self.entry(calendar)?;
        Ok(self.resolve(&entry))
    }

    /// Returns true if the date settles on `calendar`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::OutOfRange` for an invalid date,
    /// `SettleError::CalendarInvalid` for an invalid calendar and
    /// `SettleError::CalendarNotFound` for an unknown handle.
    pub fn is_valid_settlement_dmy(&self, calendar: Calendar, day: u32, month: u32, year: i32) -> SettleResult<bool> {
        let date = Dt::new(day, month, year)?;
        self.is_valid_settlement(calendar, date)
    }

    /// Registers and resolves calendars eagerly.
    ///
    /// Calendars that resolve invalid are kept; they fail when queried.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarNotFound` for the first unknown name.
    pub fn preload<I, S>(&self, names: I) -> SettleResult<Vec<Calendar>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                let calendar = self.calendar(name.as_ref())?;
                self.lookup(calendar)?;
                Ok(calendar)
            })
            .collect()
    }

    /// Drops every composite and source-listed registration and all
    /// resolved data; built-in calendars keep their ids.
    ///
    /// Ids of dropped names are retired: handles obtained before the reset
    /// fail with `CalendarNotFound`, and names registered afterwards get
    /// fresh ids.
    pub fn reset(&self) {
        let mut entries = self.entries.write();
        let allocated = entries.list.len();
        *entries = Entries::builtin();
        entries.list.resize_with(allocated, || None);
        debug!("calendar registry reset, {} ids retired", allocated - BUILTINS.len());
    }

    fn entry(&self, calendar: Calendar) -> SettleResult<Arc<CalendarEntry>> {
        self.entries
            .read()
            .list
            .get(calendar.index())
            .and_then(Option::clone)
            .ok_or_else(|| SettleError::calendar_not_found(calendar.to_string()))
    }

    fn simple(&self, name: &str) -> SettleResult<Calendar> {
        if let Some(calendar) = self.entries.read().by_name.get(name) {
            return Ok(*calendar);
        }
        if !self.source.knows(name) {
            return Err(SettleError::calendar_not_found(name));
        }
        self.register(name.to_string(), EntryKind::Source)
    }

    fn register(&self, name: String, kind: EntryKind) -> SettleResult<Calendar> {
        let mut entries = self.entries.write();
        if let Some(calendar) = entries.by_name.get(&name) {
            return Ok(*calendar);
        }
        let id = u16::try_from(entries.list.len())
            .map_err(|_| SettleError::out_of_range(format!("calendar registry is full, cannot add {name}")))?;
        let calendar = Calendar::from_id(id);
        debug!("registered calendar {name} as #{id}");
        entries.by_name.insert(name.clone(), calendar);
        entries.list.push(Some(Arc::new(CalendarEntry::new(name, kind))));
        Ok(calendar)
    }

    fn resolve(&self, entry: &CalendarEntry) -> Arc<Resolution> {
        if let Some(resolution) = entry.resolution.get() {
            return Arc::clone(resolution);
        }
        let _guard = entry.lock.lock();
        Arc::clone(entry.resolution.get_or_init(|| {
            let resolution = match &entry.kind {
                EntryKind::Weekend(mask) => Resolution::valid(Vec::new(), *mask),
                EntryKind::Source => self.load(&entry.name),
                EntryKind::Composite(bases) => self.merge(&entry.name, bases),
            };
            match resolution.status() {
                CalendarStatus::Valid => debug!(
                    "resolved calendar {}: {} holidays, weekend {}",
                    entry.name,
                    resolution.holidays.len(),
                    resolution.weekend
                ),
                CalendarStatus::Invalid(reason) => warn!("calendar {} is invalid: {reason}", entry.name),
            }
            Arc::new(resolution)
        }))
    }

    fn load(&self, name: &str) -> Resolution {
        let values = match self.source.load_calendar(name) {
            Ok(values) => values,
            Err(err) => return Resolution::invalid(err.to_string()),
        };

        let mut weekend: Option<WeekendMask> = None;
        let mut holidays = Vec::with_capacity(values.len());
        for value in values {
            if value == 0 {
                weekend = Some(weekend.unwrap_or(WeekendMask::EMPTY));
            } else if let Some(day) = (value < 8).then(|| WeekendMask::weekday_from_iso(value)).flatten() {
                weekend = Some(weekend.unwrap_or(WeekendMask::EMPTY).with(day));
            } else {
                match Dt::from_int(value).ok().and_then(|date| u32::try_from(date.to_int()).ok()) {
                    Some(code) => holidays.push(code),
                    None => return Resolution::invalid(format!("malformed holiday date {value}")),
                }
            }
        }

        let weekend = weekend.unwrap_or(WeekendMask::SAT_SUN);
        if weekend.is_full() {
            return Resolution::invalid("every weekday is a weekend day");
        }
        Resolution::valid(holidays, weekend)
    }

    fn merge(&self, name: &str, bases: &[Calendar]) -> Resolution {
        let mut holidays = Vec::new();
        let mut weekend = WeekendMask::EMPTY;
        for base in bases {
            let resolution = match self.entry(*base) {
                Ok(entry) => self.resolve(&entry),
                Err(err) => return Resolution::invalid(err.to_string()),
            };
            if let CalendarStatus::Invalid(reason) = resolution.status() {
                let base_name = self.name_of(*base).unwrap_or_else(|| base.to_string());
                return Resolution::invalid(format!("base calendar {base_name} of {name} is invalid: {reason}"));
            }
            holidays.extend_from_slice(resolution.holidays());
            weekend = weekend.union(resolution.weekend());
        }
        if weekend.is_full() {
            return Resolution::invalid("every weekday is a weekend day");
        }
        Resolution::valid(holidays, weekend)
    }
}

impl Default for CalendarRegistry {
    /// Registry backed by the rule-generated centre calendars.
    fn default() -> Self {
        Self::new(RuleSource::new())
    }
}

impl fmt::Debug for CalendarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        let resolved = entries.list.iter().flatten().filter(|e| e.resolution.get().is_some()).count();
        f.debug_struct("CalendarRegistry")
            .field("calendars", &entries.by_name.len())
            .field("resolved", &resolved)
            .finish()
    }
}

impl CalendarCalculator for CalendarRegistry {
    fn is_valid_settlement(&self, calendar: Calendar, date: Dt) -> SettleResult<bool> {
        let date = date.require("is_valid_settlement")?;
        let entry = self.entry(calendar)?;
        let resolution = self.resolve(&entry);
        match resolution.status() {
            CalendarStatus::Valid => Ok(resolution.settles(date)),
            CalendarStatus::Invalid(reason) => Err(SettleError::calendar_invalid(entry.name.clone(), reason.clone())),
        }
    }
}

/// Splits a calendar name on `+` and `,` into trimmed, upper-cased,
/// distinct segments in their original order.
fn canonical_segments(name: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for segment in name.split(['+', ',']) {
        let segment = segment.trim().to_ascii_uppercase();
        if !segment.is_empty() && !segments.contains(&segment) {
            segments.push(segment);
        }
    }
    segments
}
