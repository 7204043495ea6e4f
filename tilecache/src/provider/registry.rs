//! Registry of upstream tile servers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::template::{UrlBuilder, UrlTemplate};
use crate::cache::DEFAULT_TILE_EXTENSION;
use crate::tile::TileRequest;

/// OpenStreetMap standard tile layer.
pub const DEFAULT_OSM_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// One upstream tile server.
pub struct TileServer {
    name: String,
    builder: Arc<dyn UrlBuilder>,
    format: String,
}

impl TileServer {
    /// Create a server with the default tile format.
    pub fn new(name: impl Into<String>, builder: impl UrlBuilder + 'static) -> Self {
        Self {
            name: name.into(),
            builder: Arc::new(builder),
            format: DEFAULT_TILE_EXTENSION.to_string(),
        }
    }

    /// Create a server from a URL template.
    pub fn from_template(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(name, UrlTemplate::new(template))
    }

    /// Set the tile format, used as the cache file extension.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tile format (file extension).
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Build the upstream URL for a tile.
    pub fn url_for(&self, request: &TileRequest) -> String {
        self.builder.build_url(request)
    }
}

impl fmt::Debug for TileServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileServer")
            .field("name", &self.name)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Maps server names to their URL builders.
#[derive(Debug, Default, Clone)]
pub struct TileServerRegistry {
    servers: HashMap<String, Arc<TileServer>>,
}

impl TileServerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry containing the `osm` server.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TileServer::from_template("osm", DEFAULT_OSM_URL));
        registry
    }

    /// Add a server, replacing any server with the same name.
    pub fn register(&mut self, server: TileServer) {
        self.servers
            .insert(server.name().to_string(), Arc::new(server));
    }

    /// Look up a server by name.
    pub fn get(&self, name: &str) -> Option<&Arc<TileServer>> {
        self.servers.get(name)
    }

    /// Tile format for a server, or the default when unknown.
    pub fn format_for(&self, name: &str) -> &str {
        self.servers
            .get(name)
            .map(|s| s.format())
            .unwrap_or(DEFAULT_TILE_EXTENSION)
    }

    /// Registered server names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.servers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered servers.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Whether no servers are registered.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct QuadkeyBuilder;

    impl UrlBuilder for QuadkeyBuilder {
        fn build_url(&self, request: &TileRequest) -> String {
            let mut quadkey = String::new();
            for i in (1..=request.zoom()).rev() {
                let mask = 1 << (i - 1);
                let mut digit = 0;
                if request.x() & mask != 0 {
                    digit += 1;
                }
                if request.y() & mask != 0 {
                    digit += 2;
                }
                quadkey.push(char::from(b'0' + digit));
            }
            format!("https://q.example/{}.jpeg", quadkey)
        }
    }

    #[test]
    fn test_defaults_contain_osm() {
        let registry = TileServerRegistry::with_defaults();
        let osm = registry.get("osm").unwrap();

        assert_eq!(
            osm.url_for(&TileRequest::new("osm", 3, 2, 1)),
            "https://tile.openstreetmap.org/3/2/1.png"
        );
        assert_eq!(osm.format(), "png");
    }

    #[test]
    fn test_custom_builder_is_pluggable() {
        let mut registry = TileServerRegistry::new();
        registry.register(TileServer::new("aerial", QuadkeyBuilder).with_format("jpeg"));

        let server = registry.get("aerial").unwrap();
        assert_eq!(
            server.url_for(&TileRequest::new("aerial", 3, 3, 5)),
            "https://q.example/213.jpeg"
        );
        assert_eq!(registry.format_for("aerial"), "jpeg");
    }

    #[test]
    fn test_unknown_server() {
        let registry = TileServerRegistry::with_defaults();
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.format_for("nope"), DEFAULT_TILE_EXTENSION);
    }

    #[test]
    fn test_register_replaces_and_names_sorted() {
        let mut registry = TileServerRegistry::with_defaults();
        registry.register(TileServer::from_template("topo", "https://t/{z}/{x}/{y}.png"));
        registry.register(TileServer::from_template("osm", "https://o/{z}/{x}/{y}.png"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["osm", "topo"]);
        assert_eq!(
            registry
                .get("osm")
                .unwrap()
                .url_for(&TileRequest::new("osm", 0, 0, 0)),
            "https://o/0/0/0.png"
        );
    }
}
