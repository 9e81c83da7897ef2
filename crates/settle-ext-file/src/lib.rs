//! # Settle Ext File
//!
//! File-based holiday calendar data for the Settle date engine.
//!
//! - [`DatFileSource`]: a [`CalendarSource`] over a directory of
//!   `<NAME>.dat` files
//! - [`registry_from_config`]: a [`CalendarRegistry`] built from an
//!   [`EngineConfig`], reading `calendar_dir` when it is set

#![warn(missing_docs)]
#![warn(clippy::all)]

mod dat_source;

pub use dat_source::*;

use std::path::Path;
use std::sync::Arc;

use settle_core::calendars::{CalendarSource, RuleSource};
use settle_core::config::EngineConfig;
use settle_core::{CalendarRegistry, SettleResult};

/// Create a calendar registry from a loaded configuration.
///
/// Files in `calendar_dir` take precedence over the rule-generated centres.
///
/// # Errors
///
/// Returns `SettleError::CalendarNotFound` for an unknown preload name.
pub fn registry_from_config(config: &EngineConfig) -> SettleResult<CalendarRegistry> {
    let files = config
        .calendar_dir
        .as_ref()
        .map(|dir| Arc::new(DatFileSource::new(dir)) as Arc<dyn CalendarSource>);
    config.registry_with_source(files)
}

/// Create a calendar registry reading only the files in `dir`.
pub fn create_file_registry(dir: impl AsRef<Path>) -> CalendarRegistry {
    CalendarRegistry::new(DatFileSource::new(dir))
}

/// Write the rule-generated centre calendars into `dir` as `.dat` files.
///
/// # Errors
///
/// Returns `SettleError::CalendarSource` if a file cannot be written.
pub fn export_rule_calendars(dir: impl AsRef<Path>, rules: &RuleSource) -> SettleResult<Vec<String>> {
    let target = DatFileSource::new(dir);
    let names = rules.calendar_names();
    for name in &names {
        target.export_from(rules, name)?;
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_core::calendars::{Calendar, CalendarCalculator};
    use settle_core::{Dt, SettleError};
    use std::fs;
    use tempfile::TempDir;

    fn dt(d: u32, m: u32, y: i32) -> Dt {
        Dt::new(d, m, y).unwrap()
    }

    #[test]
    fn test_file_registry() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("XYZ.dat"), "# Test centre\n5\n6\n20250105\n").unwrap();

        let registry = create_file_registry(dir.path());
        let xyz = registry.calendar("xyz").unwrap();
        assert_eq!(registry.description(xyz).as_deref(), Some("Test centre"));
        // Friday/Saturday weekend, Sunday 5-Jan-2025 is a holiday
        assert!(!registry.is_business_day(xyz, dt(3, 1, 2025)).unwrap());
        assert!(!registry.is_business_day(xyz, dt(5, 1, 2025)).unwrap());
        assert!(registry.is_business_day(xyz, dt(12, 1, 2025)).unwrap());
        // No file and no rules for New York
        assert!(matches!(
            registry.is_business_day(Calendar::NYB, dt(2, 1, 2025)),
            Err(SettleError::CalendarInvalid { .. })
        ));
    }

    #[test]
    fn test_registry_from_config_files_override_rules() {
        let dir = TempDir::new().unwrap();
        // Christmas only: 1-Jan-2025 is a business day in this NYB
        fs::write(dir.path().join("NYB.dat"), "20251225\n").unwrap();

        let config = EngineConfig {
            calendar_dir: Some(dir.path().to_path_buf()),
            preload: vec!["NYB".to_string(), "LNB".to_string()],
            ..EngineConfig::default()
        };
        let registry = registry_from_config(&config).unwrap();
        assert!(registry.is_business_day(Calendar::NYB, dt(1, 1, 2025)).unwrap());
        assert!(!registry.is_business_day(Calendar::NYB, dt(25, 12, 2025)).unwrap());
        // London still comes from the rules
        assert!(!registry.is_business_day(Calendar::LNB, dt(1, 1, 2025)).unwrap());
    }

    #[test]
    fn test_registry_from_config_without_dir() {
        let registry = registry_from_config(&EngineConfig::default()).unwrap();
        assert!(!registry.is_business_day(Calendar::TGT, dt(1, 5, 2025)).unwrap());
    }

    #[test]
    fn test_export_rule_calendars() {
        let dir = TempDir::new().unwrap();
        let rules = RuleSource::with_year_range(2024, 2026);
        let names = export_rule_calendars(dir.path(), &rules).unwrap();
        assert_eq!(names, vec!["NYB", "USG", "LNB", "TGT", "TKB"]);

        let from_files = create_file_registry(dir.path());
        let from_rules = CalendarRegistry::new(rules);
        let mut date = dt(1, 1, 2025);
        while date < dt(1, 1, 2026) {
            for calendar in [Calendar::NYB, Calendar::LNB, Calendar::TKB] {
                assert_eq!(
                    from_files.is_business_day(calendar, date).unwrap(),
                    from_rules.is_business_day(calendar, date).unwrap(),
                    "{calendar} {date}"
                );
            }
            date = date.add_days(1).unwrap();
        }
        assert_eq!(
            from_files.description(Calendar::LNB),
            from_rules.description(Calendar::LNB)
        );
    }
}
