//! Tile request types.
//!
//! Provides the `TileRequest` type that carries everything needed to locate a
//! tile on disk and upstream: the server name, the tile class, the slippy-map
//! coordinates and the retina flag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TileError;

/// Highest zoom level accepted.
///
/// Real tile servers stop well before this; the limit keeps `2^zoom` inside
/// the `u32` coordinate range.
pub const MAX_ZOOM: u8 = 30;

/// Number of tiles along one axis at the given zoom level (`2^zoom`).
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u64 {
    1u64 << zoom.min(63)
}

/// Class of tile being requested.
///
/// Base map tiles and overlay ("layer") tiles are cached under separate
/// policy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileClass {
    /// Base map tile
    Map,
    /// Overlay tile drawn on top of the base map
    Layer,
}

impl fmt::Display for TileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileClass::Map => write!(f, "map"),
            TileClass::Layer => write!(f, "layer"),
        }
    }
}

impl FromStr for TileClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "map" => Ok(TileClass::Map),
            "layer" | "overlay" => Ok(TileClass::Layer),
            other => Err(format!("unknown tile class '{}'", other)),
        }
    }
}

/// Request for a single tile.
///
/// Immutable once constructed. The `with_*` methods consume the request and
/// return a new one, so a request handed to the coordinator can no longer
/// change.
///
/// # Example
///
/// ```
/// use tilecache::tile::{TileClass, TileRequest};
///
/// let request = TileRequest::new("osm", 3, 2, 1).with_retina(true);
/// assert_eq!(request.server(), "osm");
/// assert_eq!(request.class(), TileClass::Map);
/// assert_eq!((request.zoom(), request.x(), request.y()), (3, 2, 1));
/// assert!(request.retina());
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileRequest {
    server: String,
    class: TileClass,
    zoom: u8,
    x: u32,
    y: u32,
    retina: bool,
}

impl TileRequest {
    /// Create a request for a non-retina map tile.
    ///
    /// # Arguments
    ///
    /// * `server` - Name of the upstream tile server
    /// * `zoom` - Zoom level
    /// * `x` - Tile column (0 at west)
    /// * `y` - Tile row (0 at north)
    pub fn new(server: impl Into<String>, zoom: u8, x: u32, y: u32) -> Self {
        Self {
            server: server.into(),
            class: TileClass::Map,
            zoom,
            x,
            y,
            retina: false,
        }
    }

    /// Set the tile class.
    pub fn with_class(mut self, class: TileClass) -> Self {
        self.class = class;
        self
    }

    /// Select the high-DPI variant of the tile.
    pub fn with_retina(mut self, retina: bool) -> Self {
        self.retina = retina;
        self
    }

    /// Get the upstream server name.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Get the tile class.
    pub fn class(&self) -> TileClass {
        self.class
    }

    /// Get the zoom level.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Get the tile column.
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Get the tile row.
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Whether the high-DPI variant is requested.
    pub fn retina(&self) -> bool {
        self.retina
    }

    /// Check that the request addresses a real tile.
    ///
    /// The server name must be non-empty, the zoom at most [`MAX_ZOOM`] and
    /// both coordinates inside `[0, 2^zoom)`.
    pub fn validate(&self) -> Result<(), TileError> {
        if self.server.trim().is_empty() {
            return Err(TileError::EmptyServerName);
        }

        if self.zoom > MAX_ZOOM {
            return Err(TileError::ZoomOutOfRange {
                zoom: self.zoom,
                max: MAX_ZOOM,
            });
        }

        let limit = tiles_per_axis(self.zoom);
        if u64::from(self.x) >= limit || u64::from(self.y) >= limit {
            return Err(TileError::CoordinateOutOfRange {
                x: self.x,
                y: self.y,
                zoom: self.zoom,
                limit,
            });
        }

        Ok(())
    }
}

impl fmt::Display for TileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}/{}{}",
            self.server,
            self.zoom,
            self.x,
            self.y,
            if self.retina { "@2x" } else { "" }
        )
    }
}
