use polars::error::PolarsError;
use wdimap::error::WdimapError;

#[derive(thiserror::Error, Debug)]
pub enum WdimapCliError {
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("wdimap error: {0}")]
    WdimapError(#[from] WdimapError),
    #[error("std IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid TOML in config file {path}: {source}")]
    InvalidConfig {
        path: String,
        source: toml::de::Error,
    },
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),
}

pub type WdimapCliResult<T> = Result<T, WdimapCliError>;
