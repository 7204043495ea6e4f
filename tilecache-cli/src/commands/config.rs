//! Configuration management CLI commands.
//!
//! Provides `config init`, `config show` and `config path`.

use clap::Subcommand;
use std::path::{Path, PathBuf};
use tilecache::config::{config_file_path, ConfigFile};

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a commented config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
///
/// `config_path` is the global `--config` override, if given.
pub fn run(config_path: Option<&PathBuf>, command: ConfigCommands) -> Result<(), CliError> {
    let path = config_path.cloned().unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Init { force } => {
            init_at(&path, force)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = load_config(Some(&path))?;
            print!("{}", describe(&config));
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Write the default configuration to `path`.
fn init_at(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    ConfigFile::default().save_to(path)?;
    Ok(())
}

/// Human-readable summary of a configuration.
fn describe(config: &ConfigFile) -> String {
    let mut out = String::new();
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    out.push_str("[cache]\n");
    out.push_str(&format!("  enabled           = {}\n", on_off(config.cache.enabled)));
    out.push_str(&format!(
        "  offline_mode      = {}\n",
        on_off(config.cache.offline_mode)
    ));
    out.push_str(&format!(
        "  directory         = {}\n",
        config.cache.directory.display()
    ));
    out.push_str(&format!(
        "  cache_map_tiles   = {}\n",
        on_off(config.cache.cache_map_tiles)
    ));
    out.push_str(&format!(
        "  cache_layer_tiles = {}\n",
        on_off(config.cache.cache_layer_tiles)
    ));
    out.push_str(&format!("[download]\n  timeout = {}s\n", config.download.timeout));
    out.push_str(&format!("[ledger]\n  capacity = {}\n", config.ledger.capacity));
    out.push_str(&format!(
        "[logging]\n  file = {}\n",
        config.logging.file.display()
    ));

    for server in &config.servers {
        out.push_str(&format!("[server.{}]\n", server.name));
        out.push_str(&format!("  url    = {}\n", server.url));
        out.push_str(&format!("  format = {}\n", server.format));
        if !server.subdomains.is_empty() {
            out.push_str(&format!("  subdomains = {}\n", server.subdomains.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        init_at(&path, false).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, ConfigFile::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[cache]\noffline_mode = true\n").unwrap();

        assert!(matches!(init_at(&path, false), Err(CliError::Config(_))));
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("offline_mode = true"));

        init_at(&path, true).unwrap();
        assert!(!ConfigFile::load_from(&path).unwrap().cache.offline_mode);
    }

    #[test]
    fn test_describe_lists_servers() {
        let text = describe(&ConfigFile::default());

        assert!(text.contains("[cache]"));
        assert!(text.contains("[server.osm]"));
        assert!(text.contains("tile.openstreetmap.org"));
    }
}
