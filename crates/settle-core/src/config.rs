//! Engine configuration.
//!
//! ```toml
//! calendar_dir = "/var/lib/settle/calendars"
//! cds_cutover = "2015-12-20"
//! default_calendar = "NYB+LNB"
//! preload = ["NYB", "LNB", "TGT"]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::calendars::{Calendar, CalendarRegistry, CalendarSource, ChainSource, EmptySource, RuleSource};
use crate::error::{SettleError, SettleResult};
use crate::types::{CdsRules, Dt, DEFAULT_CDS_CUTOVER};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory of `<NAME>.dat` holiday files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_dir: Option<PathBuf>,

    /// First trade date on the semi-annual CDS roll cycle
    #[serde(default = "default_cds_cutover")]
    pub cds_cutover: Dt,

    /// Calendar used when none is given
    #[serde(default = "default_calendar")]
    pub default_calendar: String,

    /// Calendars to register and resolve at start-up
    #[serde(default)]
    pub preload: Vec<String>,

    /// Serve the major centres from built-in holiday rules when no file
    /// provides them
    #[serde(default = "default_true")]
    pub rule_holidays: bool,
}

fn default_cds_cutover() -> Dt {
    DEFAULT_CDS_CUTOVER
}

fn default_calendar() -> String {
    "NONE".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calendar_dir: None,
            cds_cutover: default_cds_cutover(),
            default_calendar: default_calendar(),
            preload: Vec::new(),
            rule_holidays: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> SettleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettleError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::Config` for malformed TOML or field values.
    pub fn from_toml_str(content: &str) -> SettleResult<Self> {
        toml::from_str(content).map_err(|e| SettleError::config(e.to_string()))
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::Config` if serialization fails.
    pub fn to_toml_string(&self) -> SettleResult<String> {
        toml::to_string(self).map_err(|e| SettleError::config(e.to_string()))
    }

    /// CDS rules for the configured cutover.
    #[must_use]
    pub fn cds_rules(&self) -> CdsRules {
        CdsRules::new(self.cds_cutover)
    }

    /// Builds a registry over `files` (if any), backed by the holiday rules
    /// when `rule_holidays` is set, and preloads the configured calendars.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarNotFound` for an unknown preload name.
    pub fn registry_with_source(&self, files: Option<Arc<dyn CalendarSource>>) -> SettleResult<CalendarRegistry> {
        let mut chain: Vec<Arc<dyn CalendarSource>> = Vec::new();
        chain.extend(files);
        if self.rule_holidays {
            chain.push(Arc::new(RuleSource::new()));
        }
        let source: Arc<dyn CalendarSource> = match chain.len() {
            0 => Arc::new(EmptySource),
            1 => chain.remove(0),
            _ => Arc::new(ChainSource::new(chain)),
        };

        let registry = CalendarRegistry::with_shared_source(source);
        registry.preload(&self.preload)?;
        Ok(registry)
    }

    /// Resolves the default calendar name in `registry`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarNotFound` for an unknown name.
    pub fn resolve_default_calendar(&self, registry: &CalendarRegistry) -> SettleResult<Calendar> {
        registry.calendar(&self.default_calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.cds_cutover, Dt::new(20, 12, 2015).unwrap());
        assert_eq!(config.default_calendar, "NONE");
        assert!(config.rule_holidays);
        assert_eq!(config.cds_rules(), CdsRules::default());
    }

    #[test]
    fn test_parse() {
        let config = EngineConfig::from_toml_str(
            r#"
            calendar_dir = "/tmp/calendars"
            cds_cutover = "2016-01-01"
            default_calendar = "NYB+LNB"
            preload = ["NYB", "LNB"]
            rule_holidays = false
            "#,
        )
        .unwrap();
        assert_eq!(config.calendar_dir, Some(PathBuf::from("/tmp/calendars")));
        assert_eq!(config.cds_cutover, Dt::new(1, 1, 2016).unwrap());
        assert_eq!(config.preload, vec!["NYB", "LNB"]);
        assert!(!config.rule_holidays);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            EngineConfig::from_toml_str("cds_cutover = \"soon\""),
            Err(SettleError::Config { .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("preload = 3"),
            Err(SettleError::Config { .. })
        ));
        assert!(matches!(
            EngineConfig::from_file("/definitely/not/here.toml"),
            Err(SettleError::Config { .. })
        ));
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig {
            default_calendar: "TGT".to_string(),
            preload: vec!["TGT".to_string()],
            ..EngineConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_registry() {
        let config = EngineConfig {
            default_calendar: "nyb+tgt".to_string(),
            preload: vec!["LNB".to_string()],
            ..EngineConfig::default()
        };
        let registry = config.registry_with_source(None).unwrap();
        let calendar = config.resolve_default_calendar(&registry).unwrap();
        assert_eq!(registry.name_of(calendar).as_deref(), Some("NYB+TGT"));

        let no_rules = EngineConfig {
            rule_holidays: false,
            preload: vec!["XYZ".to_string()],
            ..EngineConfig::default()
        };
        assert!(no_rules.registry_with_source(None).is_err());
    }
}
