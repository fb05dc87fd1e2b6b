use std::path::PathBuf;

use crate::settings::persist::SETTINGS_KEY;
use crate::util::expand_tilde;

/// Environment variable that overrides where settings are stored.
pub const SETTINGS_PATH_ENV: &str = "SKETCHQUEST_SETTINGS_PATH";

const APP_DIR: &str = "sketchquest";

/// Settings file location, honouring [`SETTINGS_PATH_ENV`].
pub fn settings_path() -> PathBuf {
    resolve_settings_path(std::env::var(SETTINGS_PATH_ENV).ok().as_deref())
}

/// `override_path` wins when set and non-blank; `~` is expanded.
pub fn resolve_settings_path(override_path: Option<&str>) -> PathBuf {
    match override_path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => expand_tilde(path),
        None => default_settings_path(),
    }
}

/// `<config dir>/sketchquest/sketchQuestSettings.json`, falling back to
/// `~/.sketchquest/` and then the working directory.
pub fn default_settings_path() -> PathBuf {
    let file_name = format!("{SETTINGS_KEY}.json");
    if let Some(config) = dirs::config_dir() {
        return config.join(APP_DIR).join(file_name);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(format!(".{APP_DIR}")).join(file_name);
    }
    PathBuf::from(file_name)
}
