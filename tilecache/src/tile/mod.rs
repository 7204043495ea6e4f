//! Tile identity and validation.
//!
//! A [`TileRequest`] names one tile on one upstream server using the
//! slippy-map `{z}/{x}/{y}` convention. Requests are validated before they
//! reach storage or the network; see [`TileError`].

mod error;
mod request;

pub use error::TileError;
pub use request::{tiles_per_axis, TileClass, TileRequest, MAX_ZOOM};
