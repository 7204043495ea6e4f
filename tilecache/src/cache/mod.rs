//! On-disk tile cache.
//!
//! Maps tile requests to a hierarchical file layout and stores the exact
//! bytes returned by the upstream server, written atomically.

mod disk;
mod path;
mod types;

pub use disk::{DiskStore, DiskStoreStats};
pub use path::{
    cache_path, map_to_path, map_to_path_with_extension, sanitize_server_name, server_directory,
    tile_filename, DEFAULT_TILE_EXTENSION, RETINA_SUFFIX,
};
pub use types::{CacheKey, CacheUsage, StoreError};
