//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [dataset] section
    if let Some(section) = ini.section(Some("dataset")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("dataset", "url", v, "must be an http(s) URL"));
            }
            config.dataset.url = v.to_string();
        }
        if let Some(v) = section.get("timeout") {
            config.dataset.timeout =
                parse_positive(v, "dataset", "timeout", "must be a positive integer (seconds)")?;
        }
        if let Some(v) = section.get("refresh_interval") {
            config.dataset.refresh_interval = parse_positive(
                v,
                "dataset",
                "refresh_interval",
                "must be a positive integer (seconds)",
            )?;
        }
        if let Some(v) = section.get("refresh_on_start") {
            config.dataset.refresh_on_start = parse_bool(v).ok_or_else(|| {
                invalid("dataset", "refresh_on_start", v, "must be 'true' or 'false'")
            })?;
        }
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        if let Some(v) = section.get("radius") {
            let radius = parse_value::<f64>(v, "search", "radius", "must be a number of meters")?;
            if !radius.is_finite() || radius < 0.0 {
                return Err(invalid(
                    "search",
                    "radius",
                    v,
                    "must be a non-negative number of meters",
                ));
            }
            config.search.radius = radius;
        }
    }

    // [store] section
    if let Some(section) = ini.section(Some("store")) {
        if let Some(v) = section.get("namespace") {
            let v = v.trim();
            if v.is_empty() || v.contains(':') {
                return Err(invalid(
                    "store",
                    "namespace",
                    v,
                    "must be non-empty and contain no ':'",
                ));
            }
            config.store.namespace = v.to_string();
        }
        if let Some(v) = section.get("retained_generations") {
            config.store.retained_generations = parse_positive(
                v,
                "store",
                "retained_generations",
                "must be a positive integer",
            )?;
        }
        if let Some(v) = section.get("snapshot") {
            let v = v.trim();
            config.store.snapshot = (!v.is_empty()).then(|| expand_tilde(v));
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("logging", "file", v, "must not be empty"));
            }
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<u64, ConfigFileError> {
    match parse_value::<u64>(value, section, key, reason)? {
        0 => Err(invalid(section, key, value, reason)),
        n => Ok(n),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        parse_ini(&Ini::load_from_str(content).unwrap())
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parses_all_sections() {
        let config = parse(
            r#"
[dataset]
url = https://example.com/benches.json
timeout = 30
refresh_interval = 3600
refresh_on_start = no

[search]
radius = 125.5

[store]
namespace = bcn
retained_generations = 2
snapshot = /var/lib/benchfinder/benches.snapshot

[logging]
directory = /var/log/benchfinder
file = bf.log
"#,
        )
        .unwrap();

        assert_eq!(config.dataset.url, "https://example.com/benches.json");
        assert_eq!(config.dataset.timeout, 30);
        assert_eq!(config.dataset.refresh_interval, 3600);
        assert!(!config.dataset.refresh_on_start);
        assert_eq!(config.search.radius, 125.5);
        assert_eq!(config.store.namespace, "bcn");
        assert_eq!(config.store.retained_generations, 2);
        assert_eq!(
            config.store.snapshot,
            Some(PathBuf::from("/var/lib/benchfinder/benches.snapshot"))
        );
        assert_eq!(config.logging.directory, PathBuf::from("/var/log/benchfinder"));
        assert_eq!(config.logging.file, "bf.log");
    }

    #[test]
    fn test_empty_snapshot_disables_persistence() {
        let config = parse("[store]\nsnapshot =\n").unwrap();
        assert!(config.store.snapshot.is_none());
    }

    #[test]
    fn test_rejects_negative_radius() {
        let err = parse("[search]\nradius = -5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref section, ref key, .. }
                if section == "search" && key == "radius"
        ));
    }

    #[test]
    fn test_rejects_zero_interval() {
        assert!(parse("[dataset]\nrefresh_interval = 0\n").is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse("[dataset]\ntimeout = soon\n").is_err());
        assert!(parse("[dataset]\nurl = ftp://example.com\n").is_err());
        assert!(parse("[dataset]\nrefresh_on_start = maybe\n").is_err());
        assert!(parse("[store]\nnamespace = a:b\n").is_err());
        assert!(parse("[store]\nretained_generations = -1\n").is_err());
        assert!(parse("[store]\nretained_generations = 0\n").is_err());
    }

    #[test]
    fn test_invalid_value_message() {
        let err = parse("[search]\nradius = far\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: search.radius = 'far' - must be a number of meters"
        );
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/logs"), home.join("logs"));
        }
    }
}
