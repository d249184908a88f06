//! Profile activation, lifecycle, and disk reconciliation
//!
//! The manager keeps exactly one profile's content materialized in the
//! images folder at a time. Activation is a directory swap: the current
//! active content is parked under its owner's idle folder (or the backup
//! slot when no owner is recorded), then the target's folder is moved into
//! the active slot. The multi-step sequence is not atomic; an interruption
//! between steps is surfaced as an error and resolved on the next load.

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{ConfigManager, Profile};
use crate::constants::identity;
use crate::fs_utils;

pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    pub fn new(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Load the catalog and fold in whatever is already on disk.
    pub fn initialize(&mut self) -> Result<()> {
        self.config_manager.load()?;
        self.refresh_from_disk()
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.config_manager.config().profiles
    }

    pub fn active_profile_id(&self) -> &str {
        &self.config_manager.config().active_profile_id
    }

    pub fn uhd_dir(&self) -> &Path {
        &self.config_manager.config().uhd_dir
    }

    /// Path of the active slot holding the currently materialized content.
    pub fn images_path(&self) -> PathBuf {
        let cfg = self.config_manager.config();
        cfg.uhd_dir.join(&cfg.images_folder_name)
    }

    pub fn config_path(&self) -> &Path {
        self.config_manager.path()
    }

    /// Materialize the given profile's content in the active slot.
    pub fn apply_profile(&mut self, profile_id: &str) -> Result<()> {
        self.ensure_uhd_dir()?;

        let images_path = self.images_path();
        let cfg = self.config_manager.config();
        let Some(target) = cfg.find_profile(profile_id) else {
            bail!("Unknown profile id: {profile_id}");
        };

        let target_path = cfg.uhd_dir.join(&target.folder_name);
        if !target_path.is_dir() {
            // The active profile's content lives in the images folder, not
            // its idle folder, so re-applying it is a no-op.
            if profile_id == cfg.active_profile_id && images_path.is_dir() {
                info!(profile = %profile_id, "Profile already active");
                return Ok(());
            }
            bail!("Profile folder does not exist: {}", target_path.display());
        }

        let target_id = target.id.clone();
        self.rename_active_to_idle()?;
        fs_utils::rename(&target_path, &images_path)?;

        info!(profile = %target_id, "Activated profile");
        self.config_manager.config_mut().active_profile_id = target_id;
        self.config_manager.save()
    }

    /// Snapshot the official baseline into a new idle profile.
    ///
    /// The source is always the official content, never whichever profile
    /// happens to be active, so creation is reproducible regardless of
    /// activation history.
    pub fn add_profile_from_active(&mut self, display_name: &str) -> Result<()> {
        self.ensure_uhd_dir()?;

        let id = self.generate_profile_id(display_name);
        let images_path = self.images_path();
        let cfg = self.config_manager.config();
        let Some(official) = cfg.find_profile(identity::OFFICIAL_ID) else {
            bail!("Official profile is missing");
        };

        let mut source_path = cfg.uhd_dir.join(&official.folder_name);
        if !source_path.is_dir() {
            // Before the first swap the official content may still sit in
            // the active slot, not yet split out into its own folder.
            if cfg.active_profile_id == identity::OFFICIAL_ID && images_path.is_dir() {
                source_path = images_path;
            } else {
                bail!(
                    "Official profile folder does not exist: {}",
                    source_path.display()
                );
            }
        }

        let profile = Profile {
            display_name: if display_name.is_empty() {
                id.clone()
            } else {
                display_name.to_string()
            },
            folder_name: format!("{}{}", cfg.idle_profile_prefix, id),
            is_official: false,
            id,
        };

        let dest = cfg.uhd_dir.join(&profile.folder_name);
        if dest.is_dir() {
            bail!("Profile folder already exists: {}", dest.display());
        }

        fs_utils::copy_dir_recursive(&source_path, &dest)?;
        info!(
            profile = %profile.id,
            folder = %profile.folder_name,
            "Created profile from official baseline"
        );

        self.config_manager.config_mut().profiles.push(profile);
        self.config_manager.save()
    }

    /// Delete a profile and its on-disk folder. The active and official
    /// profiles are protected. A folder removal failure aborts the whole
    /// operation and leaves the catalog entry intact.
    pub fn delete_profile(&mut self, profile_id: &str) -> Result<()> {
        let cfg = self.config_manager.config();
        if profile_id.is_empty() {
            bail!("Profile id is empty");
        }
        if profile_id == cfg.active_profile_id {
            bail!("Cannot delete the active profile");
        }
        let Some(index) = cfg.profiles.iter().position(|p| p.id == profile_id) else {
            bail!("Profile not found: {profile_id}");
        };
        if cfg.profiles[index].is_official {
            bail!("Cannot delete the official profile");
        }

        let target_path = cfg.uhd_dir.join(&cfg.profiles[index].folder_name);
        if target_path.is_dir() {
            fs_utils::remove_dir_all(&target_path)?;
        }

        self.config_manager.config_mut().profiles.remove(index);
        info!(profile = %profile_id, "Deleted profile");
        self.config_manager.save()
    }

    /// Re-activate the official baseline.
    pub fn reset_to_official(&mut self) -> Result<()> {
        self.apply_profile(identity::OFFICIAL_ID)
    }

    /// Fold on-disk profile folders not yet present in the catalog into it,
    /// seeding the official folder from the active slot on a first run.
    pub fn refresh_from_disk(&mut self) -> Result<()> {
        self.ensure_uhd_dir()?;

        let images_path = self.images_path();
        let cfg = self.config_manager.config();

        let official_path = cfg.uhd_dir.join(&cfg.official_profile_folder);
        if !official_path.is_dir() && images_path.is_dir() {
            // First run: whatever is in the active slot is assumed to be the
            // official baseline. This is unverified; a non-official profile
            // active at this point mis-seeds the baseline.
            info!(dest = %official_path.display(), "Seeding official folder from active slot");
            fs_utils::copy_dir_recursive(&images_path, &official_path)?;
        }

        let known_folders: HashSet<&str> =
            cfg.profiles.iter().map(|p| p.folder_name.as_str()).collect();

        let mut discovered = Vec::new();
        for dir in fs_utils::list_subdirs(&cfg.uhd_dir) {
            let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name == cfg.images_folder_name {
                continue;
            }
            if known_folders.contains(name) {
                continue;
            }
            if name == cfg.backup_profile_folder {
                continue;
            }
            let Some(stripped) = name.strip_prefix(cfg.idle_profile_prefix.as_str()) else {
                continue;
            };
            let id = stripped.to_ascii_lowercase();
            if id.is_empty() {
                continue;
            }
            info!(profile = %id, folder = %name, "Discovered profile folder");
            discovered.push(Profile {
                display_name: id.clone(),
                folder_name: name.to_string(),
                is_official: false,
                id,
            });
        }

        let cfg = self.config_manager.config_mut();
        cfg.profiles.extend(discovered);
        cfg.normalize_profiles();
        self.config_manager.save()
    }

    fn ensure_uhd_dir(&self) -> Result<()> {
        fs_utils::ensure_dir(&self.config_manager.config().uhd_dir)
    }

    /// Park the active slot's content out of the way: under the active
    /// profile's idle folder when one is recorded, otherwise in the single
    /// backup slot. The destination is cleared first, so the newest content
    /// always wins.
    fn rename_active_to_idle(&self) -> Result<()> {
        let images_path = self.images_path();
        if !images_path.is_dir() {
            return Ok(());
        }

        let cfg = self.config_manager.config();
        if !cfg.active_profile_id.is_empty() {
            if let Some(active) = cfg.find_profile(&cfg.active_profile_id) {
                if !active.folder_name.is_empty() {
                    let dest = cfg.uhd_dir.join(&active.folder_name);
                    if dest.is_dir() {
                        fs_utils::remove_dir_all(&dest)?;
                    }
                    info!(profile = %cfg.active_profile_id, dest = %dest.display(), "Parking active content");
                    return fs_utils::rename(&images_path, &dest);
                }
            }
        }

        let backup_dest = cfg.uhd_dir.join(&cfg.backup_profile_folder);
        if backup_dest.is_dir() {
            // Best effort: the backup slot holds only the most recent
            // orphaned snapshot.
            let _ = fs::remove_dir_all(&backup_dest);
        }
        warn!(dest = %backup_dest.display(), "No active profile recorded, moving content to backup slot");
        fs_utils::rename(&images_path, &backup_dest)
    }

    /// Derive a unique profile id from a display name. Numeric suffixes are
    /// probed on collision; past the last suffix the id is no longer
    /// guaranteed unique.
    fn generate_profile_id(&self, display_name: &str) -> String {
        let mut base = slugify(display_name);
        if base.is_empty() {
            base = identity::FALLBACK_ID.to_string();
        }

        let existing: HashSet<&str> = self
            .config_manager
            .config()
            .profiles
            .iter()
            .map(|p| p.id.as_str())
            .collect();

        if !existing.contains(base.as_str()) {
            return base;
        }
        for i in 2..=identity::MAX_ID_SUFFIX {
            let candidate = format!("{base}_{i}");
            if !existing.contains(candidate.as_str()) {
                return candidate;
            }
        }
        format!("{base}_x")
    }
}

/// Lowercase ASCII alphanumerics; runs of space/hyphen/underscore collapse
/// into a single underscore; everything else is dropped. No leading or
/// trailing underscore.
fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if matches!(c, ' ' | '-' | '_') && !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    if out.ends_with('_') {
        out.pop();
    }
    out
}
