//! Build and schema identification
//!
//! `build.rs` stamps every compile with a build number and UTC timestamp;
//! together with the package version and schema version they identify
//! exactly which calculator answered a request.

use serde::Serialize;

use crate::db::migrations::SCHEMA_VERSION;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Raw build number as stamped by `build.rs`
const BUILD_NUMBER_RAW: Option<&str> = option_env!("CALDA_BUILD_NUMBER");
const BUILD_TIMESTAMP_RAW: Option<&str> = option_env!("CALDA_BUILD_TIMESTAMP");

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// 0 when the binary was built without `build.rs` stamping
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub schema_version: i32,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self::from_stamp(BUILD_NUMBER_RAW, BUILD_TIMESTAMP_RAW)
    }

    fn from_stamp(number: Option<&str>, timestamp: Option<&'static str>) -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: number.and_then(|n| n.trim().parse().ok()).unwrap_or(0),
            build_timestamp: timestamp.unwrap_or("unknown"),
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Short identifier, e.g. `calda 1.0.0+build.42`
    pub fn label(&self) -> String {
        format!("{} {}+build.{}", self.name, self.version, self.build_number)
    }

    pub fn banner_lines(&self) -> Vec<String> {
        vec![
            "Calda - spray-mix calculator".to_string(),
            self.label(),
            format!("Compiled {} | schema v{}", self.build_timestamp, self.schema_version),
        ]
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let lines = BuildInfo::current().banner_lines();
    let width = lines.iter().map(String::len).max().unwrap_or(0) + 4;
    let rule = "=".repeat(width);

    eprintln!("{}", rule);
    for line in &lines {
        eprintln!("  {}", line);
    }
    eprintln!("{}", rule);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamped_build() {
        let info = BuildInfo::from_stamp(Some("42"), Some("2026-03-01T08:00:00Z"));
        assert_eq!(info.build_number, 42);
        assert_eq!(info.label(), format!("calda {}+build.42", VERSION));
        assert_eq!(info.banner_lines()[2], "Compiled 2026-03-01T08:00:00Z | schema v1");
    }

    #[test]
    fn test_unstamped_build() {
        let info = BuildInfo::from_stamp(None, None);
        assert_eq!(info.build_number, 0);
        assert_eq!(info.build_timestamp, "unknown");

        assert_eq!(BuildInfo::from_stamp(Some("4a"), None).build_number, 0);
    }

    #[test]
    fn test_status_json_fields() {
        let json = serde_json::to_value(BuildInfo::current()).unwrap();
        assert_eq!(json["name"], "calda");
        assert_eq!(json["schema_version"], SCHEMA_VERSION);
    }
}
