//! Runtime configuration
//!
//! Settings come from the environment; everything has a default so the
//! server starts with no setup.

use std::path::{Path, PathBuf};

/// Overrides the SQLite database location
pub const DATABASE_PATH_ENV: &str = "CALDA_DATABASE_PATH";

/// Log directive added on top of `RUST_LOG`
pub const DEFAULT_LOG_DIRECTIVE: &str = "calda=info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));

        Self {
            database_path: resolve_database_path(std::env::var(DATABASE_PATH_ENV).ok(), exe_dir),
        }
    }
}

/// Pick the database path: an explicit, non-blank setting wins; otherwise
/// `data/calda.db` under the project root the binary was built in.
pub fn resolve_database_path(configured: Option<String>, exe_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = configured.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }

    let mut root = exe_dir.unwrap_or_else(|| PathBuf::from("."));
    // target/debug and target/release live two levels below the project
    if root.ends_with("release") || root.ends_with("debug") {
        if let Some(project) = root.parent().and_then(Path::parent) {
            root = project.to_path_buf();
        }
    }

    root.join("data").join("calda.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_wins() {
        let path = resolve_database_path(
            Some("/var/lib/calda/mix.db".to_string()),
            Some(PathBuf::from("/opt/calda/target/release")),
        );
        assert_eq!(path, PathBuf::from("/var/lib/calda/mix.db"));
    }

    #[test]
    fn test_blank_setting_is_ignored() {
        let path = resolve_database_path(Some("  ".to_string()), Some(PathBuf::from("/srv/calda")));
        assert_eq!(path, PathBuf::from("/srv/calda/data/calda.db"));
    }

    #[test]
    fn test_default_path_from_cargo_target() {
        let release = resolve_database_path(None, Some(PathBuf::from("/home/u/calda/target/release")));
        assert_eq!(release, PathBuf::from("/home/u/calda/data/calda.db"));

        let debug = resolve_database_path(None, Some(PathBuf::from("/home/u/calda/target/debug")));
        assert_eq!(debug, PathBuf::from("/home/u/calda/data/calda.db"));
    }

    #[test]
    fn test_default_path_without_exe_dir() {
        assert_eq!(resolve_database_path(None, None), PathBuf::from("./data/calda.db"));
    }
}
