//! URL building for tile servers.
//!
//! # Template placeholders
//!
//! | Placeholder | Replaced with                                      |
//! |-------------|----------------------------------------------------|
//! | `{z}`       | zoom level                                         |
//! | `{x}`       | tile column                                        |
//! | `{y}`       | tile row (XYZ, 0 at north)                         |
//! | `{-y}`      | flipped row for TMS servers (`2^z - 1 - y`)        |
//! | `{r}`       | `@2x` for retina requests, empty otherwise         |
//! | `{s}`       | subdomain, rotated round-robin across requests     |

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cache::RETINA_SUFFIX;
use crate::tile::{tiles_per_axis, TileRequest};

/// Builds the upstream URL for a tile.
///
/// One builder is registered per server name, so servers with unusual
/// addressing (quadkeys, signed URLs) can supply their own implementation.
pub trait UrlBuilder: Send + Sync {
    /// Build the URL for the given tile.
    fn build_url(&self, request: &TileRequest) -> String;
}

/// Subdomains used for `{s}` when none are configured.
const DEFAULT_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Slippy-map URL template such as `https://{s}.tile.example.org/{z}/{x}/{y}{r}.png`.
///
/// # Example
///
/// ```
/// use tilecache::provider::{UrlBuilder, UrlTemplate};
/// use tilecache::tile::TileRequest;
///
/// let template = UrlTemplate::new("https://tile.example.org/{z}/{x}/{y}{r}.png");
/// let url = template.build_url(&TileRequest::new("osm", 3, 2, 1).with_retina(true));
///
/// assert_eq!(url, "https://tile.example.org/3/2/1@2x.png");
/// ```
#[derive(Debug)]
pub struct UrlTemplate {
    template: String,
    subdomains: Vec<String>,
    /// Counter for round-robin subdomain selection
    counter: AtomicUsize,
}

impl UrlTemplate {
    /// Create a template with the default `a`, `b`, `c` subdomains.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            counter: AtomicUsize::new(0),
        }
    }

    /// Replace the subdomains used for `{s}`.
    ///
    /// An empty list keeps the defaults.
    pub fn with_subdomains(mut self, subdomains: Vec<String>) -> Self {
        if !subdomains.is_empty() {
            self.subdomains = subdomains;
        }
        self
    }

    /// The raw template string.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Configured subdomains.
    pub fn subdomains(&self) -> &[String] {
        &self.subdomains
    }

    /// Gets the next subdomain in round-robin fashion.
    fn next_subdomain(&self) -> &str {
        let current = self.counter.fetch_add(1, Ordering::Relaxed);
        &self.subdomains[current % self.subdomains.len()]
    }
}

impl UrlBuilder for UrlTemplate {
    fn build_url(&self, request: &TileRequest) -> String {
        let mut url = self.template.clone();

        if url.contains("{s}") {
            url = url.replace("{s}", self.next_subdomain());
        }

        // {-y} before {y}: the latter is a substring of the former
        if url.contains("{-y}") {
            let flipped = tiles_per_axis(request.zoom())
                .saturating_sub(1)
                .saturating_sub(u64::from(request.y()));
            url = url.replace("{-y}", &flipped.to_string());
        }

        url.replace("{z}", &request.zoom().to_string())
            .replace("{x}", &request.x().to_string())
            .replace("{y}", &request.y().to_string())
            .replace("{r}", if request.retina() { RETINA_SUFFIX } else { "" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_xyz() {
        let template = UrlTemplate::new("https://tile.openstreetmap.org/{z}/{x}/{y}.png");
        let url = template.build_url(&TileRequest::new("osm", 12, 2048, 1361));

        assert_eq!(url, "https://tile.openstreetmap.org/12/2048/1361.png");
    }

    #[test]
    fn test_retina_placeholder() {
        let template = UrlTemplate::new("https://t.example/{z}/{x}/{y}{r}.png");

        assert_eq!(
            template.build_url(&TileRequest::new("t", 1, 1, 0)),
            "https://t.example/1/1/0.png"
        );
        assert_eq!(
            template.build_url(&TileRequest::new("t", 1, 1, 0).with_retina(true)),
            "https://t.example/1/1/0@2x.png"
        );
    }

    #[test]
    fn test_tms_flipped_row() {
        let template = UrlTemplate::new("https://tms.example/{z}/{x}/{-y}.png");

        // zoom 3 has rows 0..8, so row 1 flips to 6
        let url = template.build_url(&TileRequest::new("tms", 3, 2, 1));
        assert_eq!(url, "https://tms.example/3/2/6.png");
    }

    #[test]
    fn test_subdomain_round_robin() {
        let template = UrlTemplate::new("https://{s}.tile.example/{z}/{x}/{y}.png");
        let request = TileRequest::new("osm", 0, 0, 0);

        let urls: Vec<_> = (0..4).map(|_| template.build_url(&request)).collect();

        assert_eq!(
            urls,
            vec![
                "https://a.tile.example/0/0/0.png",
                "https://b.tile.example/0/0/0.png",
                "https://c.tile.example/0/0/0.png",
                "https://a.tile.example/0/0/0.png",
            ]
        );
    }

    #[test]
    fn test_custom_subdomains() {
        let template = UrlTemplate::new("https://mt{s}.example/{z}/{x}/{y}")
            .with_subdomains(vec!["0".to_string(), "1".to_string()]);
        let request = TileRequest::new("g", 1, 0, 0);

        assert_eq!(template.build_url(&request), "https://mt0.example/1/0/0");
        assert_eq!(template.build_url(&request), "https://mt1.example/1/0/0");
    }

    #[test]
    fn test_empty_subdomains_keep_defaults() {
        let template = UrlTemplate::new("{s}").with_subdomains(Vec::new());
        assert_eq!(template.subdomains().len(), 3);
    }

    #[test]
    fn test_template_without_subdomain_does_not_rotate() {
        let template = UrlTemplate::new("https://x/{z}/{x}/{y}");
        template.build_url(&TileRequest::new("x", 0, 0, 0));

        assert_eq!(template.counter.load(Ordering::Relaxed), 0);
    }
}
