//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::{ConfigFile, ServerSettings};
use crate::cache::DEFAULT_TILE_EXTENSION;

/// Prefix of per-server section names, as in `[server.osm]`.
pub(super) const SERVER_SECTION_PREFIX: &str = "server.";

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("enabled") {
            config.cache.enabled = parse_bool(v);
        }
        if let Some(v) = section.get("offline_mode") {
            config.cache.offline_mode = parse_bool(v);
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("cache_map_tiles") {
            config.cache.cache_map_tiles = parse_bool(v);
        }
        if let Some(v) = section.get("cache_layer_tiles") {
            config.cache.cache_layer_tiles = parse_bool(v);
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout = parse_positive(v).ok_or_else(|| {
                invalid("download", "timeout", v, "must be a positive integer (seconds)")
            })?;
        }
    }

    // [ledger] section
    if let Some(section) = ini.section(Some("ledger")) {
        if let Some(v) = section.get("capacity") {
            let capacity = parse_positive(v)
                .ok_or_else(|| invalid("ledger", "capacity", v, "must be a positive integer"))?;
            config.ledger.capacity = usize::try_from(capacity)
                .map_err(|_| invalid("ledger", "capacity", v, "value too large"))?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    // [server.<name>] sections
    for (name, section) in ini.iter() {
        let Some(server_name) = name.and_then(|n| n.strip_prefix(SERVER_SECTION_PREFIX)) else {
            continue;
        };
        config.upsert_server(parse_server(server_name, section)?);
    }

    Ok(config)
}

fn parse_server(name: &str, section: &Properties) -> Result<ServerSettings, ConfigFileError> {
    let section_name = format!("{}{}", SERVER_SECTION_PREFIX, name);

    let name = name.trim();
    if name.is_empty() {
        return Err(invalid(&section_name, "name", name, "server name must not be empty"));
    }

    let url = section.get("url").map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return Err(invalid(&section_name, "url", url, "a URL template is required"));
    }

    let format = match section.get("format").map(str::trim) {
        None | Some("") => DEFAULT_TILE_EXTENSION.to_string(),
        Some(v) if v.chars().all(|c| c.is_ascii_alphanumeric()) => v.to_lowercase(),
        Some(v) => {
            return Err(invalid(
                &section_name,
                "format",
                v,
                "must be a file extension such as png, jpg or webp",
            ));
        }
    };

    let subdomains = section
        .get("subdomains")
        .map(parse_list)
        .unwrap_or_default();

    Ok(ServerSettings {
        name: name.to_string(),
        url: url.to_string(),
        format,
        subdomains,
    })
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

/// Split a comma-separated list, dropping empty items.
pub(super) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a boolean value from config.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
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
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_cache_section() {
        let config = load(
            r#"
[cache]
enabled = false
offline_mode = yes
directory = /srv/tiles
cache_map_tiles = true
cache_layer_tiles = 0
"#,
        )
        .unwrap();

        assert!(!config.cache.enabled);
        assert!(config.cache.offline_mode);
        assert_eq!(config.cache.directory, PathBuf::from("/srv/tiles"));
        assert!(config.cache.cache_map_tiles);
        assert!(!config.cache.cache_layer_tiles);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load("[download]\ntimeout = 0\n").unwrap_err();
        assert!(err.to_string().contains("download.timeout"));
    }

    #[test]
    fn test_non_numeric_capacity_rejected() {
        let err = load("[ledger]\ncapacity = lots\n").unwrap_err();
        assert!(err.to_string().contains("ledger.capacity"));
    }

    #[test]
    fn test_server_sections() {
        let config = load(
            r#"
[server.topo]
url = https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png
subdomains = a, b, c

[server.sat]
url = https://sat.example/{z}/{x}/{y}.jpg
format = JPG
"#,
        )
        .unwrap();

        // Default osm server is kept alongside configured ones
        assert!(config.server("osm").is_some());

        let topo = config.server("topo").unwrap();
        assert_eq!(topo.format, "png");
        assert_eq!(topo.subdomains, vec!["a", "b", "c"]);

        let sat = config.server("sat").unwrap();
        assert_eq!(sat.format, "jpg");
        assert!(sat.subdomains.is_empty());
    }

    #[test]
    fn test_server_section_overrides_default() {
        let config = load("[server.osm]\nurl = https://mirror.example/{z}/{x}/{y}.png\n").unwrap();

        assert_eq!(config.servers.len(), 1);
        assert_eq!(
            config.server("osm").unwrap().url,
            "https://mirror.example/{z}/{x}/{y}.png"
        );
    }

    #[test]
    fn test_server_without_url_rejected() {
        let err = load("[server.empty]\nformat = png\n").unwrap_err();
        assert!(err.to_string().contains("server.empty.url"));
    }

    #[test]
    fn test_server_with_unsafe_format_rejected() {
        let err = load("[server.x]\nurl = https://x/{z}/{x}/{y}\nformat = ../png\n").unwrap_err();
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_parse_bool() {
        for v in ["true", "TRUE", "1", "yes", "on", " on "] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["false", "0", "no", "off", "maybe"] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        // Non-tilde paths should be unchanged
        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }
}
