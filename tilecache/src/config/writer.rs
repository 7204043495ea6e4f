//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::fmt::Write;
use std::path::Path;

use super::parser::SERVER_SECTION_PREFIX;
use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let mut out = format!(
        r#"[cache]
; Serve tiles through the cache (default: true)
; When false every request is answered as disabled and nothing is fetched
enabled = {}
; Never contact upstream servers; only cached tiles are served (default: false)
offline_mode = {}
; Directory holding cached tiles, laid out as <server>/<zoom>/<x>/<y>[@2x].<ext>
; If empty, defaults to the platform cache directory (e.g. ~/.cache/tilecache)
directory = {}
; Cache base map tiles (default: true)
cache_map_tiles = {}
; Cache overlay tiles (default: true)
cache_layer_tiles = {}

[download]
; Seconds to wait for an upstream tile before giving up (default: 10)
timeout = {}

[ledger]
; Number of recent requests kept for monitoring (default: 200)
capacity = {}

[logging]
; Log file path (default: ~/.tilecache/tilecache.log)
file = {}
"#,
        config.cache.enabled,
        config.cache.offline_mode,
        path_to_string(&config.cache.directory),
        config.cache.cache_map_tiles,
        config.cache.cache_layer_tiles,
        config.download.timeout,
        config.ledger.capacity,
        path_to_string(&config.logging.file),
    );

    out.push_str(
        r#"
; Upstream tile servers, one [server.<name>] section each.
; url placeholders: {z} {x} {y}, {-y} (TMS row), {r} (@2x for retina), {s} (subdomain)
; format is the cache file extension (default: png)
; subdomains is a comma-separated list used for {s} (default: a, b, c)
"#,
    );

    for server in &config.servers {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "\n[{}{}]\nurl = {}\nformat = {}\n",
            SERVER_SECTION_PREFIX, server.name, server.url, server.format
        );
        if !server.subdomains.is_empty() {
            let _ = writeln!(out, "subdomains = {}", server.subdomains.join(", "));
        }
    }

    out
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerSettings;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.cache.offline_mode = true;
        config.cache.directory = PathBuf::from("/srv/tiles");
        config.cache.cache_layer_tiles = false;
        config.download.timeout = 3;
        config.ledger.capacity = 42;
        config.upsert_server(ServerSettings {
            name: "topo".to_string(),
            url: "https://{s}.topo.example/{z}/{x}/{y}.png".to_string(),
            format: "png".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string()],
        });

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_output_is_commented() {
        let content = to_config_string(&ConfigFile::default());

        assert!(content.contains("; Seconds to wait for an upstream tile"));
        assert!(content.contains("[server.osm]"));
        assert!(content.contains("url = https://tile.openstreetmap.org/{z}/{x}/{y}.png"));
    }
}
