//! Cache path construction and server name sanitization.

use crate::cache::types::CacheKey;
use crate::tile::{TileError, TileRequest};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// File extension used when a server does not declare its tile format.
pub const DEFAULT_TILE_EXTENSION: &str = "png";

/// Filename suffix marking the high-DPI variant of a tile.
pub const RETINA_SUFFIX: &str = "@2x";

/// Map a tile request to its location in the cache.
///
/// Validates the request first and fails with a [`TileError`] for
/// out-of-range coordinates. Performs no I/O. Uses
/// [`DEFAULT_TILE_EXTENSION`] for the file name.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use tilecache::cache::map_to_path;
/// use tilecache::tile::TileRequest;
///
/// let request = TileRequest::new("osm", 3, 2, 1);
/// let path = map_to_path(&request, Path::new("/cache")).unwrap();
///
/// assert_eq!(path, PathBuf::from("/cache/osm/3/2/1.png"));
/// ```
pub fn map_to_path(request: &TileRequest, cache_dir: &Path) -> Result<PathBuf, TileError> {
    map_to_path_with_extension(request, cache_dir, DEFAULT_TILE_EXTENSION)
}

/// Map a tile request to its cache location using the given file extension.
///
/// An extension that is empty or contains anything other than ASCII
/// alphanumerics falls back to [`DEFAULT_TILE_EXTENSION`], so the extension
/// can never introduce a separator.
pub fn map_to_path_with_extension(
    request: &TileRequest,
    cache_dir: &Path,
    extension: &str,
) -> Result<PathBuf, TileError> {
    request.validate()?;
    Ok(cache_path(cache_dir, &CacheKey::from(request), extension))
}

/// Construct the full path for a cached tile.
///
/// Creates a hierarchical path structure:
/// ```text
/// <cache_dir>/<sanitized server>/<zoom>/<x>/<y>[@2x].<ext>
/// ```
///
/// The key is not validated here; use [`map_to_path`] for untrusted input.
pub fn cache_path(cache_dir: &Path, key: &CacheKey, extension: &str) -> PathBuf {
    server_directory(cache_dir, &key.server)
        .join(key.zoom.to_string())
        .join(key.x.to_string())
        .join(tile_filename(key.y, key.retina, extension))
}

/// Get the directory holding all tiles of one server.
pub fn server_directory(cache_dir: &Path, server: &str) -> PathBuf {
    cache_dir.join(sanitize_server_name(server))
}

/// Build the file name for a tile row, e.g. `1.png` or `1@2x.png`.
pub fn tile_filename(y: u32, retina: bool, extension: &str) -> String {
    let extension = if is_safe_extension(extension) {
        extension
    } else {
        DEFAULT_TILE_EXTENSION
    };

    if retina {
        format!("{}{}.{}", y, RETINA_SUFFIX, extension)
    } else {
        format!("{}.{}", y, extension)
    }
}

/// Turn a server name into a single safe path segment.
///
/// Lower-case ASCII letters, digits, `-` and `_` are kept; every other byte,
/// upper-case letters included, is written as `%XX` with upper-case hex. The
/// mapping is injective (`%` itself is escaped) even on case-insensitive
/// filesystems, and the result can never be `.`, `..` or contain a path
/// separator.
///
/// ```
/// use tilecache::cache::sanitize_server_name;
///
/// assert_eq!(sanitize_server_name("osm"), "osm");
/// assert_eq!(sanitize_server_name("OSM"), "%4F%53%4D");
/// assert_eq!(sanitize_server_name("../etc"), "%2E%2E%2Fetc");
/// ```
pub fn sanitize_server_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            // Writing to a String cannot fail
            let _ = write!(out, "%{:02X}", byte);
        }
    }
    out
}

fn is_safe_extension(extension: &str) -> bool {
    !extension.is_empty() && extension.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileClass;
    use std::collections::HashSet;
    use std::path::Component;

    #[test]
    fn test_map_to_path_layout() {
        let request = TileRequest::new("osm", 3, 2, 1);
        let path = map_to_path(&request, Path::new("/cache")).unwrap();

        assert_eq!(path, PathBuf::from("/cache/osm/3/2/1.png"));
    }

    #[test]
    fn test_map_to_path_retina_suffix() {
        let request = TileRequest::new("osm", 3, 2, 1).with_retina(true);
        let path = map_to_path(&request, Path::new("/cache")).unwrap();

        assert_eq!(path, PathBuf::from("/cache/osm/3/2/1@2x.png"));
    }

    #[test]
    fn test_map_to_path_custom_extension() {
        let request = TileRequest::new("satellite", 5, 10, 12);
        let path = map_to_path_with_extension(&request, Path::new("/cache"), "jpg").unwrap();

        assert_eq!(path, PathBuf::from("/cache/satellite/5/10/12.jpg"));
    }

    #[test]
    fn test_unsafe_extension_falls_back() {
        assert_eq!(tile_filename(4, false, "../png"), "4.png");
        assert_eq!(tile_filename(4, false, ""), "4.png");
        assert_eq!(tile_filename(4, true, "webp"), "4@2x.webp");
    }

    #[test]
    fn test_map_to_path_is_deterministic() {
        let a = TileRequest::new("osm", 12, 2048, 1361);
        let b = TileRequest::new("osm", 12, 2048, 1361);

        assert_eq!(
            map_to_path(&a, Path::new("/cache")).unwrap(),
            map_to_path(&b, Path::new("/cache")).unwrap()
        );
    }

    #[test]
    fn test_map_to_path_ignores_tile_class() {
        let map = TileRequest::new("osm", 3, 2, 1);
        let layer = TileRequest::new("osm", 3, 2, 1).with_class(TileClass::Layer);

        assert_eq!(
            map_to_path(&map, Path::new("/cache")).unwrap(),
            map_to_path(&layer, Path::new("/cache")).unwrap()
        );
    }

    #[test]
    fn test_map_to_path_injective_over_small_grid() {
        let servers = ["osm", "osm-retina", "a/b", "a%2Fb", "..", "."];
        let mut seen = HashSet::new();
        let mut count = 0;

        for server in servers {
            for zoom in 0..=3u8 {
                let limit = 1u32 << zoom;
                for x in 0..limit {
                    for y in 0..limit {
                        for retina in [false, true] {
                            let request = TileRequest::new(server, zoom, x, y).with_retina(retina);
                            let path = map_to_path(&request, Path::new("/cache")).unwrap();
                            seen.insert(path);
                            count += 1;
                        }
                    }
                }
            }
        }

        assert_eq!(seen.len(), count, "distinct requests must not share a path");
    }

    #[test]
    fn test_map_to_path_rejects_out_of_range() {
        let request = TileRequest::new("osm", 2, 4, 0);
        assert!(matches!(
            map_to_path(&request, Path::new("/cache")),
            Err(TileError::CoordinateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_map_to_path_rejects_empty_server() {
        let request = TileRequest::new("", 2, 0, 0);
        assert_eq!(
            map_to_path(&request, Path::new("/cache")),
            Err(TileError::EmptyServerName)
        );
    }

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_server_name("open_topo-map2"), "open_topo-map2");
    }

    #[test]
    fn test_sanitize_escapes_dots_and_separators() {
        assert_eq!(sanitize_server_name(".."), "%2E%2E");
        assert_eq!(sanitize_server_name("a/b\\c"), "a%2Fb%5Cc");
        assert_eq!(sanitize_server_name("100%"), "100%25");
    }

    #[test]
    fn test_sanitize_distinguishes_case_after_folding() {
        let names = ["osm", "OSM", "Osm", "oSm"];
        let folded: HashSet<String> = names
            .iter()
            .map(|n| sanitize_server_name(n).to_lowercase())
            .collect();

        assert_eq!(folded.len(), names.len());
        assert_eq!(sanitize_server_name("Topo"), "%54opo");
    }

    #[test]
    fn test_sanitize_escapes_non_ascii() {
        assert_eq!(sanitize_server_name("karte-ü"), "karte-%C3%BC");
    }

    #[test]
    fn test_traversal_attempt_stays_inside_cache_dir() {
        let request = TileRequest::new("../../etc", 1, 0, 0);
        let path = map_to_path(&request, Path::new("/cache")).unwrap();

        assert!(path.starts_with("/cache"));
        assert!(!path.components().any(|c| c == Component::ParentDir));
        assert_eq!(path.components().count(), 6); // "/", cache, server, zoom, x, file
    }

    #[test]
    fn test_server_directory() {
        assert_eq!(
            server_directory(Path::new("/cache"), "osm"),
            PathBuf::from("/cache/osm")
        );
    }
}
