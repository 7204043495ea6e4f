//! Print where a tile lives in the cache.

use clap::Args;
use std::path::PathBuf;
use tilecache::cache::map_to_path_with_extension;
use tilecache::config::ConfigFile;

use super::common::TileArgs;
use crate::error::CliError;

/// Arguments for `tilecache path`.
#[derive(Debug, Args)]
pub struct PathArgs {
    #[command(flatten)]
    pub tile: TileArgs,

    /// Cache directory (overrides config)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Also report whether the file is present
    #[arg(long)]
    pub check: bool,
}

/// Resolve the cache file for a tile.
pub fn resolve(config: &ConfigFile, args: &PathArgs) -> Result<PathBuf, CliError> {
    let folder = args
        .cache_dir
        .clone()
        .unwrap_or_else(|| config.cache.directory.clone());
    let registry = config.registry();
    let request = args.tile.to_request();

    Ok(map_to_path_with_extension(
        &request,
        &folder,
        registry.format_for(request.server()),
    )?)
}

/// Run the path command.
pub fn run(config: &ConfigFile, args: PathArgs) -> Result<(), CliError> {
    let path = resolve(config, &args)?;

    if args.check {
        let state = if path.is_file() { "cached" } else { "missing" };
        println!("{} ({})", path.display(), state);
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecache::config::ServerSettings;
    use tilecache::tile::TileClass;

    fn args(server: &str, retina: bool) -> PathArgs {
        PathArgs {
            tile: TileArgs {
                server: server.to_string(),
                zoom: 5,
                x: 17,
                y: 11,
                retina,
                class: TileClass::Map,
            },
            cache_dir: Some(PathBuf::from("/tiles")),
            check: false,
        }
    }

    #[test]
    fn test_resolve_default_server() {
        let path = resolve(&ConfigFile::default(), &args("osm", false)).unwrap();
        assert_eq!(path, PathBuf::from("/tiles/osm/5/17/11.png"));
    }

    #[test]
    fn test_resolve_uses_server_format() {
        let mut config = ConfigFile::default();
        config.upsert_server(ServerSettings {
            name: "aerial".to_string(),
            url: "https://example.com/{z}/{x}/{y}.jpg".to_string(),
            format: "jpg".to_string(),
            subdomains: Vec::new(),
        });

        let path = resolve(&config, &args("aerial", true)).unwrap();
        assert_eq!(path, PathBuf::from("/tiles/aerial/5/17/11@2x.jpg"));
    }

    #[test]
    fn test_resolve_rejects_out_of_range() {
        let mut bad = args("osm", false);
        bad.tile.x = 32;
        assert!(matches!(
            resolve(&ConfigFile::default(), &bad),
            Err(CliError::InvalidTile(_))
        ));
    }
}
