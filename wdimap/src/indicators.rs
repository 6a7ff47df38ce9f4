//! Loading of wide-format World Bank indicator spreadsheets into long-format tables.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Reader};
use log::{debug, info};
use polars::prelude::*;
use regex::Regex;

use crate::config::IndicatorSource;
use crate::error::WdimapError;
use crate::COL;

/// Values the World Bank exports use for a missing observation
const MISSING_VALUES: [&str; 2] = ["", ".."];

/// A long-format indicator table with the columns `COL::COUNTRY_NAME`, `COL::COUNTRY_CODE`,
/// `COL::YEAR` and a value column named `key`. Each (country code, year) pair appears once.
#[derive(Debug, Clone)]
pub struct IndicatorTable {
    pub key: String,
    pub df: DataFrame,
}

impl IndicatorTable {
    pub fn height(&self) -> usize {
        self.df.height()
    }
}

/// Read an indicator source and reshape it from one column per year to one row per
/// country-year.
pub fn load_indicator(source: &IndicatorSource) -> Result<IndicatorTable> {
    let path = Path::new(&source.path);
    if !path.is_file() {
        bail!(WdimapError::SourceNotFound(path.to_path_buf()));
    }
    info!("Loading indicator '{}' from {}", source.key, source.path);
    let rows = read_rows(path, source.sheet.as_deref())
        .with_context(|| format!("Failed to read '{}'", source.path))?;
    let df = reshape_wide_to_long(&rows, source.header_rows, &source.key, &source.path)?;
    info!(
        "Reshaped indicator '{}' with shape: {:?}",
        source.key,
        df.shape()
    );
    Ok(IndicatorTable {
        key: source.key.clone(),
        df,
    })
}

/// Read every cell of a CSV file or of one worksheet of a spreadsheet as text.
fn read_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        return reader
            .records()
            .map(|record| Ok(record?.iter().map(str::to_string).collect()))
            .collect();
    }

    let mut workbook = open_workbook_auto(path)?;
    let sheet = match sheet {
        Some(sheet) => sheet.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("Workbook has no sheets"))?,
    };
    debug!("Reading worksheet '{sheet}'");
    let range = workbook.worksheet_range(&sheet)?;
    // Ranges start at the first used cell; pad so that the header offset counts from row one
    let (first_row, _) = range.start().unwrap_or((0, 0));
    let padding = (0..first_row).map(|_| Vec::<String>::new());
    Ok(padding
        .chain(
            range
                .rows()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()),
        )
        .collect())
}

/// Reshape rows of a World Bank export into a long-format dataframe.
///
/// The first `header_rows` rows are skipped, the next row is the header. Only columns whose
/// header is a 4-digit year are kept as observations; the other columns besides the country name
/// and code are metadata and dropped.
pub fn reshape_wide_to_long(
    rows: &[Vec<String>],
    header_rows: usize,
    key: &str,
    source_name: &str,
) -> Result<DataFrame> {
    let mut rows = rows.iter().skip(header_rows);
    let missing_column = |column: &str| WdimapError::MissingColumn {
        column: column.to_string(),
        source_name: source_name.to_string(),
    };
    let header = rows
        .next()
        .ok_or_else(|| missing_column(COL::source::COUNTRY_CODE))?;
    let position = |column: &str| {
        header
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| missing_column(column))
    };
    let name_idx = position(COL::source::COUNTRY_NAME)?;
    let code_idx = position(COL::source::COUNTRY_CODE)?;

    let year_pattern = Regex::new(r"^\d{4}$")?;
    let year_columns: Vec<(usize, i64)> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| {
            let h = h.trim();
            if year_pattern.is_match(h) {
                h.parse().ok().map(|year| (idx, year))
            } else {
                None
            }
        })
        .collect();
    if year_columns.is_empty() {
        bail!(WdimapError::NoYearColumns(source_name.to_string()));
    }
    debug!(
        "Dropping metadata columns: {:?}",
        header
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != name_idx
                && *idx != code_idx
                && !year_columns.iter().any(|(year_idx, _)| year_idx == idx))
            .map(|(_, h)| h.as_str())
            .collect::<Vec<_>>()
    );

    let mut names: Vec<String> = vec![];
    let mut codes: Vec<String> = vec![];
    let mut years: Vec<i64> = vec![];
    let mut values: Vec<Option<f64>> = vec![];
    let mut seen: HashSet<(String, i64)> = HashSet::new();

    let cell = |row: &[String], idx: usize| row.get(idx).map(|s| s.trim().to_string());
    for row in rows {
        let Some(code) = cell(row, code_idx).filter(|code| !code.is_empty()) else {
            continue;
        };
        let name = cell(row, name_idx).unwrap_or_default();
        for &(idx, year) in &year_columns {
            let raw = cell(row, idx).unwrap_or_default();
            let value = if MISSING_VALUES.contains(&raw.as_str()) {
                None
            } else {
                Some(
                    raw.parse::<f64>()
                        .map_err(|_| WdimapError::InvalidValue {
                            value: raw.clone(),
                            code: code.clone(),
                            year,
                            source_name: source_name.to_string(),
                        })?,
                )
            };
            if !seen.insert((code.clone(), year)) {
                bail!(WdimapError::DuplicateKey {
                    code,
                    year,
                    source_name: source_name.to_string(),
                });
            }
            names.push(name.clone());
            codes.push(code.clone());
            years.push(year);
            values.push(value);
        }
    }

    Ok(DataFrame::new(vec![
        Series::new(COL::COUNTRY_NAME, names),
        Series::new(COL::COUNTRY_CODE, codes),
        Series::new(COL::YEAR, years),
        Series::new(key, values),
    ])?)
}
