use std::path::Path;

use anyhow::{bail, Result};
use compose::Countries;
use indicators::IndicatorTable;
use log::{debug, info};
use nonempty::NonEmpty;
use polars::frame::DataFrame;
use projection::EqualAreaProjection;
use render::{ChoroplethMap, Panel};

use crate::config::Config;
use crate::error::WdimapError;

// Re-exports
pub use column_names as COL;

// Modules
pub mod classify;
pub mod column_names;
pub mod compose;
pub mod config;
pub mod error;
#[cfg(feature = "formatters")]
pub mod formatters;
pub mod geo;
pub mod indicators;
pub mod iso3166;
pub mod merge;
pub mod palette;
pub mod projection;
pub mod render;

/// Type for the indicator map pipeline
pub struct Wdimap {
    pub config: Config,
}

impl Default for Wdimap {
    fn default() -> Self {
        Self::new_with_config(Config::default())
    }
}

impl Wdimap {
    /// Setup the Wdimap object with custom configuration
    pub fn new_with_config(config: Config) -> Self {
        debug!("config: {config:?}");
        Self { config }
    }

    /// Load every configured indicator source as a long-format table
    pub fn load_indicators(&self) -> Result<NonEmpty<IndicatorTable>> {
        let tables = self
            .config
            .indicators
            .iter()
            .map(indicators::load_indicator)
            .collect::<Result<Vec<_>>>()?;
        match NonEmpty::from_vec(tables) {
            Some(tables) => Ok(tables),
            None => bail!(WdimapError::NoIndicators),
        }
    }

    /// Indicators joined into one table of ISO-3166 countries
    pub fn merged_indicators(&self) -> Result<DataFrame> {
        merge::merge_indicators(self.load_indicators()?)
    }

    /// Simplified and corrected country boundaries with WKT geometries
    pub fn boundaries(&self) -> Result<DataFrame> {
        let records = geo::load_boundaries(&self.config.boundaries, &self.config.simplify)?;
        geo::boundaries_to_df(&records)
    }

    /// The country table for `year`, one row per country with a geometry and indicators
    pub fn countries(&self, year: i64) -> Result<DataFrame> {
        let merged = self.merged_indicators()?;
        let boundaries = self.boundaries()?;
        compose::compose_countries(&boundaries, &merged, year, &self.config.indicator_keys())
    }

    pub fn projection(&self) -> Result<EqualAreaProjection> {
        Ok(self.config.projection.parse()?)
    }

    /// One panel per configured indicator. Fails if any classification is invalid.
    pub fn panels(&self) -> Result<Vec<Panel>> {
        self.config.indicators.iter().map(Panel::from_source).collect()
    }

    /// Render the choropleth map of `year` to an SVG file at `output`
    pub fn render(&self, year: i64, output: &Path) -> Result<()> {
        // Configuration problems should surface before any data is loaded
        let panels = self.panels()?;
        let projection = self.projection()?;

        let keys = self.config.indicator_keys();
        let countries = Countries::from_df(&self.countries(year)?, &keys)?;
        if countries.is_empty() {
            bail!("No countries with geometry and indicators for year {year}");
        }
        let land = geo::load_land(&self.config.land_archive, &self.config.simplify)?;
        info!(
            "Rendering {} countries over {} land polygons",
            countries.len(),
            land.len()
        );
        ChoroplethMap {
            countries: &countries,
            land: &land,
            panels: &panels,
            projection,
        }
        .render_svg(output, &self.config.render)
    }
}
