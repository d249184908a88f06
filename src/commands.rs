//! Command handlers over the profile manager's public operations
//!
//! Each handler performs one catalog operation and prints a result line.
//! Handlers know nothing about argument parsing or rendering beyond stdout,
//! so a different front end can drive the same operations.

use anyhow::Result;

use crate::config::Profile;
use crate::profiles::ProfileManager;

/// Label a profile the way the interactive listing shows it.
fn profile_label(profile: &Profile, active_id: &str) -> String {
    let mut label = profile.display_name.clone();
    if profile.id == active_id {
        label.push_str(" [active]");
    }
    if profile.is_official {
        label.push_str(" (official)");
    }
    label
}

pub fn list(manager: &ProfileManager) {
    let active_id = manager.active_profile_id().to_string();
    if manager.profiles().is_empty() {
        println!("No profiles found");
        return;
    }
    for profile in manager.profiles() {
        println!("{:<24} {}", profile.id, profile_label(profile, &active_id));
    }
}

pub fn status(manager: &ProfileManager) {
    println!("Active profile: {}", manager.active_profile_id());
    println!("Asset root:     {}", manager.uhd_dir().display());
    println!("Images path:    {}", manager.images_path().display());
    println!("Config path:    {}", manager.config_path().display());
}

pub fn apply(manager: &mut ProfileManager, id: &str) -> Result<()> {
    manager.apply_profile(id)?;
    println!("Applied profile '{id}'");
    Ok(())
}

pub fn add(manager: &mut ProfileManager, display_name: &str) -> Result<()> {
    manager.add_profile_from_active(display_name)?;
    println!("Profile created");
    Ok(())
}

pub fn delete(manager: &mut ProfileManager, id: &str) -> Result<()> {
    manager.delete_profile(id)?;
    println!("Deleted profile '{id}'");
    Ok(())
}

pub fn reset(manager: &mut ProfileManager) -> Result<()> {
    manager.reset_to_official()?;
    println!("Official profile applied");
    Ok(())
}

pub fn refresh(manager: &mut ProfileManager) -> Result<()> {
    manager.refresh_from_disk()?;
    println!("Profiles refreshed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, display: &str, official: bool) -> Profile {
        Profile {
            id: id.to_string(),
            display_name: display.to_string(),
            folder_name: format!("I_P_{id}"),
            is_official: official,
        }
    }

    #[test]
    fn profile_label_marks_active_and_official() {
        let official = profile("official", "NI Official", true);
        let theme = profile("theme", "My Theme", false);

        assert_eq!(
            profile_label(&official, "official"),
            "NI Official [active] (official)"
        );
        assert_eq!(profile_label(&official, "theme"), "NI Official (official)");
        assert_eq!(profile_label(&theme, "theme"), "My Theme [active]");
        assert_eq!(profile_label(&theme, "official"), "My Theme");
    }
}
