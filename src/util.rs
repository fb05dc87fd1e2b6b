use std::path::PathBuf;

/// Expands a leading `~` in a path to the user's home directory.
/// Paths without one, or with no resolvable home, are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => {
            match dirs::home_dir() {
                Some(home) => home.join(rest.trim_start_matches(&['/', '\\'][..])),
                None => PathBuf::from(path),
            }
        }
        _ => PathBuf::from(path),
    }
}
