//! Calendar data sources.
//!
//! A source turns a calendar name into a flat list of integers. Values
//! below 8 are ISO weekday codes (1 = Monday .. 7 = Sunday, 0 = no weekend
//! days) overriding the default Saturday/Sunday weekend; larger values are
//! holiday dates encoded as `YYYYMMDD`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{SettleError, SettleResult};

/// Loads holiday and weekend data for simple calendars.
pub trait CalendarSource: Send + Sync {
    /// Returns the weekend codes and holiday dates of calendar `name`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarSource` if the data cannot be loaded.
    fn load_calendar(&self, name: &str) -> SettleResult<Vec<i32>>;

    /// Names of the calendars this source can load.
    fn calendar_names(&self) -> Vec<String>;

    /// Human-readable description of calendar `name`.
    fn description(&self, _name: &str) -> Option<String> {
        None
    }

    /// Returns true if this source lists `name`.
    fn knows(&self, name: &str) -> bool {
        self.calendar_names().iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

/// Source without any data.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl CalendarSource for EmptySource {
    fn load_calendar(&self, name: &str) -> SettleResult<Vec<i32>> {
        Err(SettleError::calendar_source(name, "no calendar data configured"))
    }

    fn calendar_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// In-memory source, mostly for tests and embedded data.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    calendars: HashMap<String, Vec<i32>>,
    descriptions: HashMap<String, String>,
}

impl StaticSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a calendar.
    #[must_use]
    pub fn with_calendar(mut self, name: &str, values: impl Into<Vec<i32>>) -> Self {
        self.insert(name, values);
        self
    }

    /// Adds a description for a calendar.
    #[must_use]
    pub fn with_description(mut self, name: &str, description: impl Into<String>) -> Self {
        self.descriptions.insert(name.to_ascii_uppercase(), description.into());
        self
    }

    /// Adds or replaces a calendar in place.
    pub fn insert(&mut self, name: &str, values: impl Into<Vec<i32>>) {
        self.calendars.insert(name.to_ascii_uppercase(), values.into());
    }
}

impl CalendarSource for StaticSource {
    fn load_calendar(&self, name: &str) -> SettleResult<Vec<i32>> {
        self.calendars
            .get(&name.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| SettleError::calendar_source(name, "not in static source"))
    }

    fn calendar_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.calendars.keys().cloned().collect();
        names.sort();
        names
    }

    fn description(&self, name: &str) -> Option<String> {
        self.descriptions.get(&name.to_ascii_uppercase()).cloned()
    }
}

/// Sources consulted in order; the first that lists a name serves it.
#[derive(Clone, Default)]
pub struct ChainSource {
    sources: Vec<Arc<dyn CalendarSource>>,
}

impl ChainSource {
    /// Creates a chain from sources in priority order.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn CalendarSource>>) -> Self {
        Self { sources }
    }

    /// Appends a lower-priority source.
    #[must_use]
    pub fn then(mut self, source: Arc<dyn CalendarSource>) -> Self {
        self.sources.push(source);
        self
    }

    fn provider(&self, name: &str) -> Option<&Arc<dyn CalendarSource>> {
        self.sources.iter().find(|source| source.knows(name))
    }
}

impl std::fmt::Debug for ChainSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSource")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl CalendarSource for ChainSource {
    fn load_calendar(&self, name: &str) -> SettleResult<Vec<i32>> {
        match self.provider(name) {
            Some(source) => source.load_calendar(name),
            None => Err(SettleError::calendar_source(name, "not provided by any source")),
        }
    }

    fn calendar_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for source in &self.sources {
            for name in source.calendar_names() {
                if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn description(&self, name: &str) -> Option<String> {
        self.provider(name).and_then(|source| source.description(name))
    }
}
