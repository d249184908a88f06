//! Profile catalog persistence
//!
//! Owns the in-memory configuration document and its JSON file on disk.
//! Loading tolerates missing or wrong-typed fields by falling back to
//! defaults per field; saving always rewrites the full document.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants;

/// A named set of UHD image content. While a profile is active its content
/// lives in the images folder; while idle it lives under `folder_name`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub folder_name: String,
    pub is_official: bool,
}

/// Top-level configuration document
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AppConfig {
    pub schema_version: i64,
    pub uhd_dir: PathBuf,
    pub images_folder_name: String,
    pub idle_profile_prefix: String,
    pub official_profile_folder: String,
    pub backup_profile_folder: String,
    pub active_profile_id: String,
    pub profiles: Vec<Profile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: constants::config::SCHEMA_VERSION,
            uhd_dir: default_uhd_dir(),
            images_folder_name: constants::folders::IMAGES.to_string(),
            idle_profile_prefix: constants::folders::IDLE_PREFIX.to_string(),
            official_profile_folder: constants::folders::OFFICIAL.to_string(),
            backup_profile_folder: constants::folders::BACKUP.to_string(),
            active_profile_id: String::new(),
            profiles: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn find_profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn find_profile_mut(&mut self, id: &str) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|p| p.id == id)
    }

    /// Make sure the reserved official profile exists and is authoritative
    /// for its own folder mapping. An existing entry has its folder forced
    /// back to the configured official folder; a missing one is synthesized.
    pub fn ensure_official_profile(&mut self) {
        let folder_name = self.official_profile_folder.clone();
        match self.find_profile_mut(constants::identity::OFFICIAL_ID) {
            Some(official) => {
                official.folder_name = folder_name;
                official.is_official = true;
                if official.display_name.is_empty() {
                    official.display_name =
                        constants::identity::OFFICIAL_DISPLAY_NAME.to_string();
                }
            }
            None => self.profiles.push(Profile {
                id: constants::identity::OFFICIAL_ID.to_string(),
                display_name: constants::identity::OFFICIAL_DISPLAY_NAME.to_string(),
                folder_name,
                is_official: true,
            }),
        }
    }

    /// Restore the profile-list invariants: drop empty ids, keep the first
    /// occurrence of each id, fill missing display and folder names.
    /// Idempotent.
    pub fn normalize_profiles(&mut self) {
        let mut seen_ids = HashSet::new();
        let mut normalized = Vec::with_capacity(self.profiles.len());

        for mut profile in std::mem::take(&mut self.profiles) {
            if profile.id.is_empty() {
                continue;
            }
            if !seen_ids.insert(profile.id.clone()) {
                continue;
            }
            if profile.display_name.is_empty() {
                profile.display_name = profile.id.clone();
            }
            if profile.folder_name.is_empty() {
                profile.folder_name = if profile.is_official {
                    self.official_profile_folder.clone()
                } else {
                    format!("{}{}", self.idle_profile_prefix, profile.id)
                };
            }
            normalized.push(profile);
        }

        self.profiles = normalized;
    }
}

/// Loads and saves the configuration document at a fixed path.
pub struct ConfigManager {
    path: PathBuf,
    config: AppConfig,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: AppConfig::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// Load the document from disk, or create and persist a default one if
    /// no file exists yet. Parse failures leave the in-memory state
    /// untouched.
    pub fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Config file not found, creating defaults");
            let mut cfg = AppConfig::default();
            cfg.ensure_official_profile();
            cfg.normalize_profiles();
            if cfg.active_profile_id.is_empty() {
                cfg.active_profile_id = constants::identity::OFFICIAL_ID.to_string();
            }
            self.config = cfg;
            return self.save();
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {}", self.path.display()))?;
        let root: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON from {}", self.path.display()))?;
        let root = root
            .as_object()
            .context("Config JSON root is not an object")?;

        let defaults = AppConfig::default();
        let mut cfg = AppConfig {
            schema_version: get_i64(root, "schema_version", defaults.schema_version),
            uhd_dir: PathBuf::from(get_string(
                root,
                "uhd_dir",
                &defaults.uhd_dir.to_string_lossy(),
            )),
            images_folder_name: get_string(
                root,
                "images_folder_name",
                &defaults.images_folder_name,
            ),
            idle_profile_prefix: get_string(
                root,
                "idle_profile_prefix",
                &defaults.idle_profile_prefix,
            ),
            official_profile_folder: get_string(
                root,
                "official_profile_folder",
                &defaults.official_profile_folder,
            ),
            backup_profile_folder: get_string(
                root,
                "backup_profile_folder",
                &defaults.backup_profile_folder,
            ),
            active_profile_id: get_string(root, "active_profile_id", ""),
            profiles: Vec::new(),
        };

        if let Some(items) = root.get("profiles").and_then(Value::as_array) {
            for item in items {
                let Some(obj) = item.as_object() else {
                    warn!("Skipping non-object profile entry");
                    continue;
                };
                let id = get_string(obj, "id", "");
                if id.is_empty() {
                    warn!("Skipping profile entry with empty id");
                    continue;
                }
                let folder_fallback = format!("{}{}", cfg.idle_profile_prefix, id);
                cfg.profiles.push(Profile {
                    display_name: get_string(obj, "display_name", &id),
                    folder_name: get_string(obj, "folder_name", &folder_fallback),
                    is_official: get_bool(obj, "is_official", false),
                    id,
                });
            }
        }

        cfg.ensure_official_profile();
        cfg.normalize_profiles();
        if cfg.active_profile_id.is_empty() {
            cfg.active_profile_id = constants::identity::OFFICIAL_ID.to_string();
        }

        info!(
            path = %self.path.display(),
            profiles = cfg.profiles.len(),
            active = %cfg.active_profile_id,
            "Loaded config"
        );
        self.config = cfg;
        Ok(())
    }

    /// Rewrite the full document to disk, creating the parent directory if
    /// absent. The write is a plain overwrite with no temp-file-plus-rename
    /// step.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let mut json =
            serde_json::to_string_pretty(&self.config).context("Failed to serialize config")?;
        json.push('\n');
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write config to {}", self.path.display()))?;
        info!(path = %self.path.display(), "Saved config");
        Ok(())
    }
}

/// Default config file location: user config dir (XDG_CONFIG_HOME, falling
/// back to ~/.config) or the current directory when neither is available.
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(constants::config::APP_DIR);
    path.push(constants::config::FILENAME);
    path
}

/// Default UHD asset root for this platform.
pub fn default_uhd_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        PathBuf::from("/usr/share/uhd")
    } else {
        PathBuf::from(".")
    }
}

fn get_string(obj: &Map<String, Value>, key: &str, fallback: &str) -> String {
    match obj.get(key).and_then(Value::as_str) {
        Some(value) => value.to_string(),
        None => fallback.to_string(),
    }
}

fn get_i64(obj: &Map<String, Value>, key: &str, fallback: i64) -> i64 {
    obj.get(key).and_then(Value::as_i64).unwrap_or(fallback)
}

fn get_bool(obj: &Map<String, Value>, key: &str, fallback: bool) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(fallback)
}
