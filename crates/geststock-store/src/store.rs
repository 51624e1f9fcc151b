//! # Key-Value Stores
//!
//! The persistence contract and its two implementations.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      KeyValueStore                                      │
//! │                                                                         │
//! │   get(key) → Option<JSON>     set(key, JSON)     clear()                │
//! │   set_many([(key, JSON)])     remove(key)                               │
//! │                                                                         │
//! │   ┌──────────────────────┐          ┌──────────────────────────────┐   │
//! │   │     MemoryStore      │          │        JsonFileStore         │   │
//! │   │  BTreeMap in memory  │          │  one file per key:           │   │
//! │   │  tests, dry runs     │          │  <dir>/geststock-products.json│  │
//! │   └──────────────────────┘          └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Commit Protocol (JsonFileStore)
//! ```text
//! 1. stage    every value → <target>.tmp        (any failure: drop the .tmp files)
//! 2. install  each target → <target>.bak
//!             each .tmp   → <target>            (any failure: roll back 2 in reverse)
//! 3. cleanup  remove the .bak files
//! ```
//! A commit either replaces every file or none of them. Opening a store
//! puts back any `.bak` whose target is missing (a crash during step 2).

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

/// Prefix put in front of every key on disk.
pub const DEFAULT_KEY_PREFIX: &str = "geststock-";

// =============================================================================
// Contract
// =============================================================================

/// Synchronous key → JSON storage with a single writer.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.set_many(vec![(key.to_string(), value)])
    }

    /// Stores several values as one commit.
    ///
    /// All or nothing: on `Err` every key still holds its previous value.
    fn set_many(&mut self, entries: Vec<(String, Value)>) -> StoreResult<()>;

    /// Deletes `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;

    /// Deletes every key owned by this store.
    fn clear(&mut self) -> StoreResult<()>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store for tests and dry runs.
///
/// ## Example
/// ```rust
/// use geststock_store::{KeyValueStore, MemoryStore};
/// use serde_json::json;
///
/// let mut store = MemoryStore::new();
/// store.set("language", json!("en")).unwrap();
/// assert_eq!(store.get("language").unwrap(), Some(json!("en")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_many(&mut self, entries: Vec<(String, Value)>) -> StoreResult<()> {
        let mut staged = self.entries.clone();
        staged.extend(entries);
        self.entries = staged;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.entries.clear();
        Ok(())
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// File store configuration.
///
/// ## Example
/// ```rust
/// use geststock_store::StoreConfig;
///
/// let config = StoreConfig::new("/var/lib/geststock")
///     .key_prefix("boutique-")
///     .pretty(false);
/// assert_eq!(config.key_prefix, "boutique-");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one JSON file per key.
    pub data_dir: PathBuf,

    /// Prefix of every file name.
    /// Default: "geststock-"
    pub key_prefix: String,

    /// Pretty-print files so they can be read and diffed by hand.
    /// Default: true
    pub pretty: bool,
}

impl StoreConfig {
    /// Creates a configuration for the given directory.
    ///
    /// ## Arguments
    /// * `data_dir` - Created on open if it doesn't exist.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            data_dir: data_dir.into(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            pretty: true,
        }
    }

    /// Sets the file name prefix.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets whether files are pretty-printed.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

// =============================================================================
// JsonFileStore
// =============================================================================

/// Stores each key as a JSON file in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    config: StoreConfig,
}

impl JsonFileStore {
    /// Opens (and creates if needed) the data directory.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.data_dir)
            .map_err(|e| StoreError::io(&config.data_dir, e))?;

        let store = JsonFileStore { config };
        let restored = store.restore_backups()?;

        info!(
            path = %store.config.data_dir.display(),
            prefix = %store.config.key_prefix,
            restored,
            "Opened JSON file store"
        );
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn file_name(&self, key: &str) -> String {
        format!("{}{}.json", self.config.key_prefix, key)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.config.data_dir.join(self.file_name(key))
    }

    /// Puts back `.bak` files left by an interrupted commit.
    ///
    /// A backup whose target exists is stale and removed. Returns how many
    /// files were restored.
    fn restore_backups(&self) -> StoreResult<usize> {
        let dir = &self.config.data_dir;
        let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;

        let mut restored = 0;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(target_name) = name.strip_suffix(BACKUP_SUFFIX) else {
                continue;
            };
            if !target_name.starts_with(&self.config.key_prefix) {
                continue;
            }

            let backup = entry.path();
            let target = dir.join(target_name);
            if target.exists() {
                fs::remove_file(&backup).map_err(|e| StoreError::io(&backup, e))?;
            } else {
                warn!(path = %target.display(), "Restoring file from interrupted commit");
                fs::rename(&backup, &target).map_err(|e| StoreError::io(&target, e))?;
                restored += 1;
            }
        }
        Ok(restored)
    }

    fn render(&self, value: &Value) -> StoreResult<String> {
        let text = if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

const TEMP_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".bak";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn temp_path(path: &Path) -> PathBuf {
    with_suffix(path, TEMP_SUFFIX)
}

fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, BACKUP_SUFFIX)
}

/// A target file replaced during a commit.
#[derive(Debug)]
struct Installed {
    target: PathBuf,
    /// Previous content, `None` if the target did not exist.
    backup: Option<PathBuf>,
}

/// Moves `temp` over `target`, keeping the previous file as a backup.
///
/// On `Err` the target is back to what it was.
fn install(temp: &Path, target: &Path) -> StoreResult<Installed> {
    let backup = if target.exists() {
        let backup = backup_path(target);
        fs::rename(target, &backup).map_err(|e| StoreError::io(target, e))?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(temp, target) {
        if let Some(backup) = &backup {
            if let Err(restore) = fs::rename(backup, target) {
                warn!(path = %target.display(), error = %restore, "Could not restore previous file");
            }
        }
        return Err(StoreError::io(target, e));
    }

    Ok(Installed {
        target: target.to_path_buf(),
        backup,
    })
}

/// Undoes `installed`, newest first.
fn roll_back(installed: &[Installed]) {
    for entry in installed.iter().rev() {
        let undone = match &entry.backup {
            Some(backup) => fs::rename(backup, &entry.target),
            None => fs::remove_file(&entry.target),
        };
        if let Err(e) = undone {
            warn!(path = %entry.target.display(), error = %e, "Could not roll back file");
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StoreError::corrupt(self.file_name(key), e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn set_many(&mut self, entries: Vec<(String, Value)>) -> StoreResult<()> {
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(entries.len());

        for (key, value) in &entries {
            let target = self.path_for(key);
            let temp = temp_path(&target);
            let written = self
                .render(value)
                .and_then(|text| fs::write(&temp, text).map_err(|e| StoreError::io(&temp, e)));

            if let Err(err) = written {
                warn!(key = %key, error = %err, "Write failed, discarding staged files");
                let _ = fs::remove_file(&temp);
                for (temp, _) in &staged {
                    let _ = fs::remove_file(temp);
                }
                return Err(err);
            }
            staged.push((temp, target));
        }

        let mut installed: Vec<Installed> = Vec::with_capacity(staged.len());
        for (index, (temp, target)) in staged.iter().enumerate() {
            match install(temp, target) {
                Ok(entry) => installed.push(entry),
                Err(err) => {
                    warn!(path = %target.display(), error = %err, "Rename failed, rolling back commit");
                    for (temp, _) in &staged[index..] {
                        let _ = fs::remove_file(temp);
                    }
                    roll_back(&installed);
                    return Err(err);
                }
            }
        }

        for entry in installed {
            if let Some(backup) = entry.backup {
                let _ = fs::remove_file(backup);
            }
        }

        debug!(keys = entries.len(), "Committed entries");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn clear(&mut self) -> StoreResult<()> {
        let dir = &self.config.data_dir;
        let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(&self.config.key_prefix) && name.ends_with(".json") {
                fs::remove_file(entry.path()).map_err(|e| StoreError::io(entry.path(), e))?;
                removed += 1;
            }
        }

        info!(removed, "Cleared JSON file store");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_roundtrip_and_clear() {
        let mut store = MemoryStore::new();
        store
            .set_many(vec![
                ("products".to_string(), json!([])),
                ("language".to_string(), json!("fr")),
            ])
            .unwrap();
        assert_eq!(store.len(), 2);

        store.remove("language").unwrap();
        store.remove("language").unwrap();
        assert_eq!(store.get("language").unwrap(), None);

        store.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("/tmp/geststock").key_prefix("test-").pretty(false);

        assert_eq!(config.key_prefix, "test-");
        assert!(!config.pretty);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/geststock"));
    }

    #[test]
    fn test_temp_and_backup_paths_append_suffix() {
        let target = Path::new("/data/geststock-sales.json");
        assert_eq!(temp_path(target), PathBuf::from("/data/geststock-sales.json.tmp"));
        assert_eq!(backup_path(target), PathBuf::from("/data/geststock-sales.json.bak"));
    }

    #[test]
    fn test_failed_rename_rolls_back_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(StoreConfig::new(dir.path())).unwrap();
        store
            .set_many(vec![
                ("products".to_string(), json!(["riz"])),
                ("sales".to_string(), json!([])),
            ])
            .unwrap();

        // A non-empty directory cannot be renamed onto another non-empty one
        let sales = dir.path().join("geststock-sales.json");
        std::fs::remove_file(&sales).unwrap();
        for blocked in [sales.clone(), backup_path(&sales)] {
            std::fs::create_dir(&blocked).unwrap();
            std::fs::write(blocked.join("keep"), "x").unwrap();
        }

        let err = store
            .set_many(vec![
                ("products".to_string(), json!(["riz", "huile"])),
                ("sales".to_string(), json!([{ "id": "s-1" }])),
                ("movements".to_string(), json!([])),
            ])
            .unwrap_err();

        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.get("products").unwrap(), Some(json!(["riz"])));
        assert_eq!(store.get("movements").unwrap(), None);
        assert!(!dir.path().join("geststock-products.json.bak").exists());
        assert!(!dir.path().join("geststock-products.json.tmp").exists());
        assert!(!dir.path().join("geststock-movements.json.tmp").exists());
    }

    #[test]
    fn test_open_restores_backup_of_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("geststock-products.json.bak"), "[\"riz\"]").unwrap();
        std::fs::write(dir.path().join("geststock-sales.json"), "[]").unwrap();
        std::fs::write(dir.path().join("geststock-sales.json.bak"), "[1]").unwrap();

        let store = JsonFileStore::open(StoreConfig::new(dir.path())).unwrap();

        assert_eq!(store.get("products").unwrap(), Some(json!(["riz"])));
        assert_eq!(store.get("sales").unwrap(), Some(json!([])));
        assert!(!dir.path().join("geststock-sales.json.bak").exists());
    }
}
