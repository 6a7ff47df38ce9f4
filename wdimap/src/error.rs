//! Error types.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum WdimapError {
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("No year columns (4-digit headers) found in {0}")]
    NoYearColumns(String),
    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },
    #[error("Duplicate row for country '{code}' and year {year} in {source_name}")]
    DuplicateKey {
        code: String,
        year: i64,
        source_name: String,
    },
    #[error("Invalid value '{value}' for country '{code}' and year {year} in {source_name}")]
    InvalidValue {
        value: String,
        code: String,
        year: i64,
        source_name: String,
    },
    #[error("No shapefile (.shp) member in archive {0}")]
    NoShapefileInArchive(PathBuf),
    #[error("Unsupported shape type '{0}', expected polygons")]
    UnsupportedShape(String),
    #[error("No indicator sources configured")]
    NoIndicators,
    #[error("Invalid breaks: {0}")]
    InvalidBreaks(String),
    #[error("Expected {expected} labels for the breaks given, found {found}")]
    LabelCountMismatch { expected: usize, found: usize },
    #[error("Invalid projection: {0}")]
    InvalidProjection(String),
    #[error("Empty geometry for country '{0}' after filtering")]
    EmptyGeometry(String),
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
}
