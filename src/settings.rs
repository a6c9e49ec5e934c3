use std::{
    collections::{BTreeMap, BTreeSet},
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

pub const KEY_PROFILES: &str = "profiles";
pub const KEY_CURRENT_PROFILE: &str = "current-profile";
pub const KEY_EXPERT_MODE: &str = "expert-mode";
pub const KEY_SHOW_PROFILE_DESCRIPTION: &str = "show-profile-description";
pub const KEY_SHOW_DISPLAYS_SETTINGS: &str = "show-displays-settings";
pub const KEY_SHOW_MANAGER_SETTINGS: &str = "show-display-profile-manager-settings";
const KEYBINDING_PREFIX: &str = "keybinding-profile-";

/// Number of profiles that can be bound to a key.
pub const KEYBINDING_SLOTS: usize = 9;

/// Settings key of keybinding slot `slot` (1-based).
pub fn keybinding_key(slot: usize) -> String {
    format!("{KEYBINDING_PREFIX}{slot}")
}

fn default_boolean(key: &str) -> bool {
    key == KEY_SHOW_DISPLAYS_SETTINGS
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not locate the user config directory")]
    NoConfigDir,

    #[error("failed to read settings file: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write settings file: {0}")]
    Write(#[source] io::Error),

    #[error("failed to deserialize settings: {0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Key/value storage the profile list and toggles live in.
///
/// Every effective change is announced on the channel returned by
/// [`SettingsStore::subscribe`] with the key that changed.
pub trait SettingsStore {
    fn get_string(&self, key: &str) -> String;

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;

    fn get_boolean(&self, key: &str) -> bool;

    fn set_boolean(&mut self, key: &str, value: bool) -> Result<(), SettingsError>;

    fn subscribe(&self) -> broadcast::Receiver<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    strings: BTreeMap<String, String>,
    #[serde(default)]
    booleans: BTreeMap<String, bool>,
}

impl SettingsDocument {
    fn get_string(&self, key: &str) -> String {
        self.strings.get(key).cloned().unwrap_or_default()
    }

    fn get_boolean(&self, key: &str) -> bool {
        self.booleans
            .get(key)
            .copied()
            .unwrap_or_else(|| default_boolean(key))
    }

    /// Returns whether the stored value changed.
    fn set_string(&mut self, key: &str, value: &str) -> bool {
        if self.strings.get(key).map(String::as_str) == Some(value) {
            return false;
        }
        self.strings.insert(key.to_owned(), value.to_owned());
        true
    }

    fn set_boolean(&mut self, key: &str, value: bool) -> bool {
        if self.booleans.get(key) == Some(&value) {
            return false;
        }
        self.booleans.insert(key.to_owned(), value);
        true
    }
}

fn notify(changes: &broadcast::Sender<String>, key: &str) {
    // No receivers is fine: nobody is watching.
    let _ = changes.send(key.to_owned());
}

/// In-process store, nothing is persisted.
#[derive(Debug)]
pub struct MemorySettings {
    document: SettingsDocument,
    changes: broadcast::Sender<String>,
}

impl MemorySettings {
    pub fn new() -> MemorySettings {
        let (changes, _) = broadcast::channel(16);
        MemorySettings {
            document: SettingsDocument::default(),
            changes,
        }
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for MemorySettings {
    fn get_string(&self, key: &str) -> String {
        self.document.get_string(key)
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        if self.document.set_string(key, value) {
            notify(&self.changes, key);
        }
        Ok(())
    }

    fn get_boolean(&self, key: &str) -> bool {
        self.document.get_boolean(key)
    }

    fn set_boolean(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        if self.document.set_boolean(key, value) {
            notify(&self.changes, key);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}

/// TOML file store, rewritten on every change.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    document: SettingsDocument,
    changes: broadcast::Sender<String>,
}

impl FileSettings {
    /// `<config dir>/display-profiles/settings.toml`
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(dir.join("display-profiles").join("settings.toml"))
    }

    pub fn load_or_create() -> Result<FileSettings, SettingsError> {
        Self::open(Self::default_path()?)
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<FileSettings, SettingsError> {
        let path = path.into();
        let (changes, _) = broadcast::channel(16);
        let document = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No settings at {}, starting empty", path.display());
                SettingsDocument::default()
            }
            Err(e) => return Err(SettingsError::Read(e)),
        };
        Ok(FileSettings {
            path,
            document,
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file, announcing every key whose value differs.
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        let fresh = Self::open(self.path.clone())?.document;
        let changed: BTreeSet<String> = fresh
            .strings
            .keys()
            .chain(self.document.strings.keys())
            .filter(|key| fresh.get_string(key) != self.document.get_string(key))
            .chain(
                fresh
                    .booleans
                    .keys()
                    .chain(self.document.booleans.keys())
                    .filter(|key| fresh.get_boolean(key) != self.document.get_boolean(key)),
            )
            .cloned()
            .collect();
        self.document = fresh;
        for key in changed {
            notify(&self.changes, &key);
        }
        Ok(())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(SettingsError::Write)?;
        }
        let contents = toml::to_string_pretty(&self.document)?;
        fs::write(&self.path, contents).map_err(SettingsError::Write)?;
        debug!("Wrote settings to {}", self.path.display());
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get_string(&self, key: &str) -> String {
        self.document.get_string(key)
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        if self.document.set_string(key, value) {
            self.save()?;
            notify(&self.changes, key);
        }
        Ok(())
    }

    fn get_boolean(&self, key: &str) -> bool {
        self.document.get_boolean(key)
    }

    fn set_boolean(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        if self.document.set_boolean(key, value) {
            self.save()?;
            notify(&self.changes, key);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.changes.subscribe()
    }
}
