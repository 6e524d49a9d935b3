//! Application-wide constants.

/// The display name of the application.
pub const APP_NAME: &str = "altkeys";

/// Directory name under the platform config dir.
pub const APP_DATA_DIR: &str = "altkeys";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "ALTKEYS_CONFIG_DIR";
