mod cli;
mod display;
mod error;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, RunCommand};
use log::debug;
use wdimap::config::Config;

use crate::error::{WdimapCliError, WdimapCliResult};

const DEFAULT_LOGGING_LEVEL: &str = "warn";

fn main() -> Result<()> {
    // Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set
    let _ =
        std::env::var("RUST_LOG").map_err(|_| std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL));
    pretty_env_logger::init_timed();
    let args = Cli::parse();
    debug!("args: {args:?}");
    let config = read_config(args.config.as_deref().map(Path::new))?;
    debug!("config: {config:?}");

    if let Some(command) = args.command {
        command.run(config)?;
    }
    Ok(())
}

/// Default location of the configuration file.
/// macOS: ~/Library/Application Support/wdimap/config.toml
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wdimap").join("config.toml"))
}

/// Read the configuration from `path` if given, otherwise from the default location. A missing
/// file at the default location means the default configuration.
fn read_config(path: Option<&Path>) -> WdimapCliResult<Config> {
    let (file_path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(Config::default()),
        },
    };
    match std::fs::read_to_string(&file_path) {
        Ok(contents) => toml::from_str(&contents).map_err(|source| WdimapCliError::InvalidConfig {
            path: file_path.display().to_string(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if explicit {
                Err(WdimapCliError::ConfigNotFound(
                    file_path.display().to_string(),
                ))
            } else {
                Ok(Config::default())
            }
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn config_should_be_read_from_given_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "year = 2010\nland_archive = \"land.zip\"").unwrap();
        let config = read_config(Some(file.path())).unwrap();
        assert_eq!(config.year, 2010);
        assert_eq!(config.land_archive, "land.zip");
        assert_eq!(config.indicators, Config::default().indicators);
    }

    #[test]
    fn missing_given_config_should_fail() {
        let result = read_config(Some(Path::new("/no/such/config.toml")));
        assert!(matches!(result, Err(WdimapCliError::ConfigNotFound(_))));
    }

    #[test]
    fn invalid_toml_should_fail() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "year = \"last\"").unwrap();
        let result = read_config(Some(file.path()));
        assert!(matches!(result, Err(WdimapCliError::InvalidConfig { .. })));
    }
}
