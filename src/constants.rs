//! Application-wide constants
//!
//! Single source of truth for folder names, config locations, and the
//! reserved profile identity used throughout the application.

/// Config file location constants
pub mod config {
    /// Subdirectory under the user config dir holding our files
    pub const APP_DIR: &str = "uhd-helper";

    /// Config file name inside APP_DIR
    pub const FILENAME: &str = "config.json";

    /// Current config schema version
    pub const SCHEMA_VERSION: i64 = 1;
}

/// Folder names under the UHD asset root
pub mod folders {
    /// Directory holding the currently active profile content
    pub const IMAGES: &str = "images";

    /// Prefix marking idle (non-official) profile folders
    pub const IDLE_PREFIX: &str = "I_P_";

    /// Folder holding the official baseline content while idle
    pub const OFFICIAL: &str = "R_NI";

    /// Single-slot backup for displaced active content with no recorded owner
    pub const BACKUP: &str = "I_P__backup";
}

/// Reserved profile identity constants
pub mod identity {
    /// Reserved id of the official profile
    pub const OFFICIAL_ID: &str = "official";

    /// Display name given to a synthesized official profile
    pub const OFFICIAL_DISPLAY_NAME: &str = "NI Official";

    /// Fallback id when a display name slugifies to nothing
    pub const FALLBACK_ID: &str = "profile";

    /// Highest numeric suffix probed when generating unique ids
    pub const MAX_ID_SUFFIX: u32 = 9999;
}
