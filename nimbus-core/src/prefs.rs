//! Persisted user preferences: recent searches and the colour theme.
//!
//! Values live in a string-keyed store ([`KeyValueStore`]). The on-disk
//! implementation is a single JSON object file in the platform data directory.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Debug},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::warn;

use crate::error::PrefsError;

pub const HISTORY_KEY: &str = "weatherSearchHistory";
pub const THEME_KEY: &str = "weatherAppTheme";

/// Most entries kept in [`SearchHistory`].
pub const HISTORY_CAPACITY: usize = 5;

/// String-keyed persistent storage.
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// Store backed by a JSON object file. Every `set` rewrites the whole file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `preferences.json` in the platform data directory.
    pub fn open_default() -> Result<Self, PrefsError> {
        let dirs =
            ProjectDirs::from("dev", "nimbus", "nimbus-cli").ok_or(PrefsError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir().join("preferences.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PrefsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut entries = self.read_all().unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "discarding unreadable preference file");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// In-process store, used by tests and when no data directory exists.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Recently searched city names, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory(Vec<String>);

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `city` at the front, dropping any case-insensitive duplicate and
    /// anything past [`HISTORY_CAPACITY`].
    pub fn record(&mut self, city: &str) {
        let lower = city.to_lowercase();
        self.0.retain(|item| item.to_lowercase() != lower);
        self.0.insert(0, city.to_string());
        self.0.truncate(HISTORY_CAPACITY);
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for SearchHistory {
    /// Normalises an arbitrary list (e.g. from an older or hand-edited file)
    /// so the capacity and dedup rules hold.
    fn from(items: Vec<String>) -> Self {
        let mut history = Self::new();
        for item in items.iter().rev() {
            history.record(item);
        }
        history
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label for the toggle control; names the theme it switches *to*.
    pub fn control_label(self) -> &'static str {
        match self {
            Theme::Light => "🌙 Dark Mode",
            Theme::Dark => "☀️ Light Mode",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'. Supported themes: light, dark.")),
        }
    }
}

/// Typed access to the two preference values.
#[derive(Debug)]
pub struct PreferenceStore {
    store: Box<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Never fails: a missing, unreadable or malformed entry yields an empty history.
    pub fn load_history(&self) -> SearchHistory {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SearchHistory::new(),
            Err(err) => {
                warn!(error = %err, "failed to read search history");
                return SearchHistory::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(items) => SearchHistory::from(items),
            Err(err) => {
                warn!(error = %err, "ignoring malformed search history");
                SearchHistory::new()
            }
        }
    }

    pub fn save_history(&mut self, history: &SearchHistory) -> Result<(), PrefsError> {
        let raw = serde_json::to_string(history)?;
        self.store.set(HISTORY_KEY, &raw)
    }

    /// Falls back to [`Theme::Light`] when absent or not a known value.
    pub fn load_theme(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|err| {
                warn!(error = %err, "ignoring invalid theme preference");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!(error = %err, "failed to read theme preference");
                Theme::default()
            }
        }
    }

    pub fn save_theme(&mut self, theme: Theme) -> Result<(), PrefsError> {
        self.store.set(THEME_KEY, theme.as_str())
    }
}
