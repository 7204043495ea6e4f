//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`cache`] - Cache management (stats, clear)
//! - [`config`] - Configuration management (init, show, path)
//! - [`get`] - Fetch one tile through the cache
//! - [`path`] - Show where a tile is cached
//! - [`warm`] - Pre-fill the cache for a range of tiles

pub mod cache;
pub mod common;
pub mod config;
pub mod get;
pub mod path;
pub mod warm;
