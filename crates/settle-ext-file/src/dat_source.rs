//! Holiday calendars stored as `<NAME>.dat` files.
//!
//! One value per line: ISO weekday codes (0 for no weekend, 1 = Monday ..
//! 7 = Sunday) followed by holiday dates as `YYYYMMDD`. Blank lines are
//! ignored; the first `#` comment line is the calendar description.
//!
//! ```text
//! # London banking
//! 20250101
//! 20250418
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, warn};

use settle_core::calendars::CalendarSource;
use settle_core::{SettleError, SettleResult};

const EXTENSION: &str = "dat";

// =============================================================================
// CALENDAR FILE
// =============================================================================

/// Parsed contents of a calendar file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarFile {
    /// Text of the first comment line.
    pub description: Option<String>,
    /// Weekend codes and holiday dates in file order.
    pub values: Vec<i32>,
}

impl CalendarFile {
    /// Creates a calendar file from raw values.
    pub fn new(description: Option<String>, values: Vec<i32>) -> Self {
        Self { description, values }
    }

    /// Parses file text for calendar `name`.
    ///
    /// Lines may hold several values separated by whitespace or commas.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarSource` naming the first line that is
    /// not a comment and does not parse as integers.
    pub fn parse(name: &str, content: &str) -> SettleResult<Self> {
        let mut file = Self::default();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if let Some(comment) = line.strip_prefix('#') {
                let comment = comment.trim();
                if file.description.is_none() && !comment.is_empty() {
                    file.description = Some(comment.to_string());
                }
                continue;
            }
            for token in line.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
                let value = token.parse::<i32>().map_err(|_| {
                    SettleError::calendar_source(name, format!("line {}: invalid value '{token}'", number + 1))
                })?;
                file.values.push(value);
            }
        }
        Ok(file)
    }

    /// Renders the file in the format [`CalendarFile::parse`] reads.
    pub fn to_dat_string(&self) -> String {
        let mut out = String::new();
        if let Some(description) = &self.description {
            let _ = writeln!(out, "# {description}");
        }
        for value in &self.values {
            let _ = writeln!(out, "{value}");
        }
        out
    }
}

// =============================================================================
// DAT FILE SOURCE
// =============================================================================

/// Calendar source reading `<NAME>.dat` files from a directory.
///
/// The directory is listed once and files are read on first request; both
/// are cached until [`DatFileSource::reload`]. File names match calendar
/// names case-insensitively.
pub struct DatFileSource {
    dir: PathBuf,
    /// Upper-cased calendar name to file path.
    paths: DashMap<String, PathBuf>,
    listed: AtomicBool,
    files: DashMap<String, Arc<CalendarFile>>,
}

impl DatFileSource {
    /// Creates a source over `dir`. The directory is not read until needed.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            paths: DashMap::new(),
            listed: AtomicBool::new(false),
            files: DashMap::new(),
        }
    }

    /// Directory holding the calendar files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Drops the cached directory listing and every cached file.
    pub fn reload(&self) {
        self.listed.store(false, Ordering::Release);
        self.paths.clear();
        self.files.clear();
        debug!("calendar file cache cleared for {}", self.dir.display());
    }

    /// Returns the parsed file for calendar `name`.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarSource` if the name is not a plain file
    /// name, no file exists for it, or the file cannot be read or parsed.
    pub fn file(&self, name: &str) -> SettleResult<Arc<CalendarFile>> {
        let key = checked_name(name)?;
        if let Some(file) = self.files.get(&key) {
            return Ok(Arc::clone(file.value()));
        }

        let path = self
            .path_of(&key)
            .ok_or_else(|| SettleError::calendar_source(name, format!("no {key}.{EXTENSION} in {}", self.dir.display())))?;
        let content = fs::read_to_string(&path)
            .map_err(|e| SettleError::calendar_source(name, format!("cannot read {}: {e}", path.display())))?;
        let file = Arc::new(CalendarFile::parse(&key, &content)?);
        debug!("read calendar {key} from {} ({} values)", path.display(), file.values.len());

        Ok(Arc::clone(self.files.entry(key).or_insert(file).value()))
    }

    /// Writes calendar `name` to `<dir>/<NAME>.dat` and caches it.
    ///
    /// # Errors
    ///
    /// Returns `SettleError::CalendarSource` for an unusable name or a
    /// failed write.
    pub fn write_calendar(&self, name: &str, file: CalendarFile) -> SettleResult<PathBuf> {
        let key = checked_name(name)?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| SettleError::calendar_source(name, format!("cannot create {}: {e}", self.dir.display())))?;
        let path = self.dir.join(format!("{key}.{EXTENSION}"));
        fs::write(&path, file.to_dat_string())
            .map_err(|e| SettleError::calendar_source(name, format!("cannot write {}: {e}", path.display())))?;
        debug!("wrote calendar {key} to {}", path.display());
        self.paths.insert(key.clone(), path.clone());
        self.files.insert(key, Arc::new(file));
        Ok(path)
    }

    /// Copies calendar `name` from `source` into this directory.
    ///
    /// # Errors
    ///
    /// Propagates load errors from `source` and write errors from
    /// [`DatFileSource::write_calendar`].
    pub fn export_from(&self, source: &dyn CalendarSource, name: &str) -> SettleResult<PathBuf> {
        let values = source.load_calendar(name)?;
        self.write_calendar(name, CalendarFile::new(source.description(name), values))
    }

    fn path_of(&self, key: &str) -> Option<PathBuf> {
        self.list();
        self.paths.get(key).map(|path| path.value().clone())
    }

    /// Fills the name-to-path cache from the directory once per reload.
    fn list(&self) {
        if self.listed.load(Ordering::Acquire) {
            return;
        }
        match fs::read_dir(&self.dir) {
            Ok(read) => {
                for path in read.filter_map(Result::ok).map(|entry| entry.path()) {
                    let is_dat = path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION));
                    if !is_dat || !path.is_file() {
                        continue;
                    }
                    let Some(key) = path.file_stem().and_then(|stem| stem.to_str()).and_then(|stem| checked_name(stem).ok())
                    else {
                        continue;
                    };
                    self.paths.entry(key).or_insert(path);
                }
                debug!("listed {} calendar files in {}", self.paths.len(), self.dir.display());
            }
            Err(e) => warn!("cannot list calendar directory {}: {e}", self.dir.display()),
        }
        self.listed.store(true, Ordering::Release);
    }
}

impl std::fmt::Debug for DatFileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatFileSource")
            .field("dir", &self.dir)
            .field("cached", &self.files.len())
            .finish()
    }
}

impl CalendarSource for DatFileSource {
    fn load_calendar(&self, name: &str) -> SettleResult<Vec<i32>> {
        Ok(self.file(name)?.values.clone())
    }

    fn calendar_names(&self) -> Vec<String> {
        self.list();
        let mut names: Vec<String> = self.paths.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    fn knows(&self, name: &str) -> bool {
        self.list();
        checked_name(name).is_ok_and(|key| self.paths.contains_key(&key))
    }

    fn description(&self, name: &str) -> Option<String> {
        self.file(name).ok().and_then(|file| file.description.clone())
    }
}

/// Upper-cased calendar name, rejecting anything that is not a plain file stem.
fn checked_name(name: &str) -> SettleResult<String> {
    let name = name.trim();
    let plain = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if plain {
        Ok(name.to_ascii_uppercase())
    } else {
        Err(SettleError::calendar_source(name, "not a plain calendar file name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, content: &str) {
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn test_parse() {
        let file = CalendarFile::parse("XYZ", "# Test calendar\n# more\n\n5, 6\n20250101\n  20251225  \n").unwrap();
        assert_eq!(file.description.as_deref(), Some("Test calendar"));
        assert_eq!(file.values, vec![5, 6, 20250101, 20251225]);
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = CalendarFile::parse("XYZ", "20250101\n2025-12-25\n").unwrap_err();
        match err {
            SettleError::CalendarSource { name, reason } => {
                assert_eq!(name, "XYZ");
                assert!(reason.contains("line 2"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_dat_string_round_trip() {
        let file = CalendarFile::new(Some("Sample".to_string()), vec![0, 20250101]);
        assert_eq!(CalendarFile::parse("S", &file.to_dat_string()).unwrap(), file);
    }

    #[test]
    fn test_names_and_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "AAA.dat", "# Calendar A\n20250101\n");
        write(dir.path(), "bbb.DAT", "20250102\n");
        write(dir.path(), "notes.txt", "ignored");

        let source = DatFileSource::new(dir.path());
        assert_eq!(source.calendar_names(), vec!["AAA", "BBB"]);
        assert!(source.knows("aaa"));
        assert_eq!(source.load_calendar("aaa").unwrap(), vec![20250101]);
        assert_eq!(source.load_calendar("BBB").unwrap(), vec![20250102]);
        assert_eq!(source.description("AAA").as_deref(), Some("Calendar A"));
        assert_eq!(source.description("BBB"), None);
    }

    #[test]
    fn test_missing_and_unsafe_names() {
        let dir = TempDir::new().unwrap();
        let source = DatFileSource::new(dir.path());
        assert!(matches!(
            source.load_calendar("XYZ"),
            Err(SettleError::CalendarSource { .. })
        ));
        assert!(source.load_calendar("../etc/passwd").is_err());
        assert!(source.load_calendar("").is_err());
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let source = DatFileSource::new("/definitely/not/a/calendar/dir");
        assert!(source.calendar_names().is_empty());
    }

    #[test]
    fn test_cache_and_reload() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "AAA.dat", "20250101\n");
        let source = DatFileSource::new(dir.path());
        assert_eq!(source.load_calendar("AAA").unwrap(), vec![20250101]);

        write(dir.path(), "AAA.dat", "20250102\n");
        assert_eq!(source.load_calendar("AAA").unwrap(), vec![20250101]);

        source.reload();
        assert_eq!(source.load_calendar("AAA").unwrap(), vec![20250102]);
    }

    #[test]
    fn test_listing_cached_until_reload() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "AAA.dat", "20250101\n");
        let source = DatFileSource::new(dir.path());
        assert!(source.knows("aaa"));
        assert!(!source.knows("BBB"));

        // New files stay invisible until the listing is refreshed
        write(dir.path(), "BBB.dat", "20250102\n");
        assert!(!source.knows("BBB"));
        assert_eq!(source.calendar_names(), vec!["AAA"]);
        assert!(source.load_calendar("BBB").is_err());

        source.reload();
        assert!(source.knows("bbb"));
        assert_eq!(source.calendar_names(), vec!["AAA", "BBB"]);
        assert_eq!(source.load_calendar("BBB").unwrap(), vec![20250102]);
        assert!(!source.knows("../AAA"));
    }

    #[test]
    fn test_write_calendar() {
        let dir = TempDir::new().unwrap();
        let source = DatFileSource::new(dir.path().join("nested"));
        let path = source
            .write_calendar("new", CalendarFile::new(Some("New".to_string()), vec![20250101]))
            .unwrap();
        assert!(path.ends_with("NEW.dat"));

        let fresh = DatFileSource::new(dir.path().join("nested"));
        assert_eq!(fresh.load_calendar("NEW").unwrap(), vec![20250101]);
        assert_eq!(fresh.description("new").as_deref(), Some("New"));
    }
}
