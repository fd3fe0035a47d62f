use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = ".weather_chat";

/// Record holding the JSON message array.
pub const MESSAGES_KEY: &str = "weather-agent-messages";
/// Record holding the plain-string thread id.
pub const THREAD_KEY: &str = "weather-agent-thread";

#[must_use]
pub fn data_root(cwd: &Path) -> PathBuf {
    cwd.join(DATA_DIR)
}

/// Maps a storage key to its file name, or `None` when the key is unsafe as a path.
#[must_use]
pub fn key_file_name(key: &str) -> Option<String> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    valid.then(|| format!("{key}.record"))
}
