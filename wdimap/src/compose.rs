//! Joining of country geometries to the merged indicators for a single year.

use anyhow::{anyhow, bail, Result};
use geo::MultiPolygon;
use itertools::Itertools;
use log::{debug, info, warn};
use polars::prelude::*;

use crate::error::WdimapError;
use crate::geo::{from_wkt, is_empty};
use crate::{iso3166, COL};

/// Restrict the merged indicator table to one year.
pub fn select_year(merged: &DataFrame, year: i64) -> Result<DataFrame> {
    Ok(merged
        .clone()
        .lazy()
        .filter(col(COL::YEAR).eq(lit(year)))
        .collect()?)
}

/// Build the country table for `year`: one row per country with a geometry and indicator
/// values, with the columns `COL::NAME`, `COL::CODE`, one column per indicator key and
/// `COL::GEOMETRY` (WKT).
///
/// Countries whose boundary has no usable geometry are dropped. The result is then checked so
/// that no remaining row has an empty geometry.
pub fn compose_countries(
    geometries: &DataFrame,
    merged: &DataFrame,
    year: i64,
    indicator_keys: &[&str],
) -> Result<DataFrame> {
    let indicators = select_year(merged, year)?;
    if indicators.height() == 0 {
        warn!("No indicator values for year {year}");
    }
    let mut columns = vec![
        when(col(COL::BOUNDARY_NAME).is_null())
            .then(col(COL::COUNTRY_NAME))
            .otherwise(col(COL::BOUNDARY_NAME))
            .alias(COL::NAME),
        col(COL::COUNTRY_CODE).alias(COL::CODE),
    ];
    columns.extend(indicator_keys.iter().map(|key| col(*key)));
    columns.push(col(COL::GEOMETRY));

    let joined = geometries
        .clone()
        .lazy()
        .join(
            indicators.lazy(),
            [col(COL::COUNTRY_CODE)],
            [col(COL::COUNTRY_CODE)],
            JoinArgs::new(JoinType::Inner),
        )
        .select(columns)
        .collect()?;
    let countries = joined
        .clone()
        .lazy()
        .filter(col(COL::GEOMETRY).is_not_null())
        .sort([COL::CODE], SortMultipleOptions::default())
        .collect()?;
    debug!(
        "Dropped countries without geometry: {:?}",
        joined
            .column(COL::CODE)?
            .str()?
            .into_iter()
            .zip(joined.column(COL::GEOMETRY)?.str()?.into_iter())
            .filter_map(|(code, geometry)| geometry.is_none().then_some(code).flatten())
            .collect_vec()
    );
    ensure_no_empty_geometries(&countries)?;
    info!(
        "Composed {} countries for year {year}",
        countries.height()
    );
    Ok(countries)
}

/// Fail with `WdimapError::EmptyGeometry` if any row has a null or empty geometry.
pub fn ensure_no_empty_geometries(countries: &DataFrame) -> Result<()> {
    let codes = countries.column(COL::CODE)?.str()?;
    let geometries = countries.column(COL::GEOMETRY)?.str()?;
    for (code, geometry) in codes.into_iter().zip(geometries.into_iter()) {
        let code = code.unwrap_or_default();
        let Some(wkt) = geometry else {
            bail!(WdimapError::EmptyGeometry(code.into()));
        };
        if is_empty(&from_wkt(wkt)?) {
            bail!(WdimapError::EmptyGeometry(code.into()));
        }
    }
    Ok(())
}

/// A country ready to be drawn, with one value per indicator in the order of
/// `Countries::indicators`.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub code: String,
    pub values: Vec<Option<f64>>,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Countries {
    pub indicators: Vec<String>,
    pub rows: Vec<Country>,
}

impl Countries {
    /// Read the typed rows of a table produced by `compose_countries`.
    pub fn from_df(countries: &DataFrame, indicator_keys: &[&str]) -> Result<Self> {
        let names = countries.column(COL::NAME)?.str()?;
        let codes = countries.column(COL::CODE)?.str()?;
        let geometries = countries.column(COL::GEOMETRY)?.str()?;
        let values = indicator_keys
            .iter()
            .map(|key| -> Result<Vec<Option<f64>>> {
                let column = countries.column(*key)?.cast(&DataType::Float64)?;
                Ok(column.f64()?.into_iter().collect_vec())
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = (0..countries.height())
            .map(|idx| -> Result<Country> {
                let code = codes
                    .get(idx)
                    .ok_or_else(|| anyhow!("Null country code at row {idx}"))?;
                let geometry = geometries
                    .get(idx)
                    .ok_or_else(|| WdimapError::EmptyGeometry(code.into()))?;
                let name = names
                    .get(idx)
                    .or_else(|| iso3166::by_alpha3(code).map(|country| country.name))
                    .unwrap_or(code);
                Ok(Country {
                    name: name.to_string(),
                    code: code.to_string(),
                    values: values.iter().map(|column| column[idx]).collect(),
                    geometry: from_wkt(geometry)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            indicators: indicator_keys.iter().map(|key| key.to_string()).collect(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one indicator, `None` for countries without data
    pub fn values(&self, indicator: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(move |country| country.values[indicator])
    }
}
