//! Choropleth rendering of the country table to SVG, one panel per indicator.
//!
//! Each panel is drawn bottom-up: the land masses in a neutral fill, the countries colored by
//! the bucket of their indicator value, country outlines, country-code labels, the legend and
//! the title. All layers share one equal-area projection fitted to the whole world.

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use geo::{Area, Centroid, Coord, MultiPolygon, Polygon as GeoPolygon};
use itertools::Itertools;
use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::classify::Classifier;
use crate::compose::Countries;
use crate::config::{IndicatorSource, RenderConfig};
use crate::projection::EqualAreaProjection;

const LAND: RGBColor = RGBColor(0xd9, 0xd9, 0xd9);
const OUTLINE: RGBColor = RGBColor(0x63, 0x63, 0x63);
const TEXT: RGBColor = RGBColor(0x25, 0x25, 0x25);
const FONT: &str = "sans-serif";

const TITLE_HEIGHT: u32 = 36;
const TITLE_FONT: f64 = 20.0;
const MARGIN: u32 = 10;
const LEGEND_SWATCH: i32 = 14;
const LEGEND_ROW: i32 = 18;
const LEGEND_FONT: f64 = 12.0;
const NO_DATA: &str = "No data";

/// Font size per pixel of the square root of a country's projected area
const LABEL_SCALE: f64 = 0.2;
/// Approximate width of a glyph relative to the font size
const GLYPH_WIDTH: f64 = 0.6;

/// One map panel: the title and the validated classification of an indicator.
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub classifier: Classifier,
}

impl Panel {
    /// Fails if the breaks or labels of the source are invalid.
    pub fn from_source(source: &IndicatorSource) -> Result<Self> {
        Ok(Self {
            title: source.title.clone(),
            classifier: source.classification.classifier()?,
        })
    }
}

/// Maps projected coordinates to pixels of a panel, preserving the aspect ratio.
#[derive(Debug, Clone, Copy)]
struct Frame {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset: (f64, f64),
}

impl Frame {
    /// Fit the extent of the projected world into a `width` by `height` box at `origin`.
    fn fit(projection: &EqualAreaProjection, origin: (u32, u32), width: u32, height: u32) -> Self {
        let (max_x, max_y) = projection.half_extent();
        let scale = (width as f64 / (2.0 * max_x)).min(height as f64 / (2.0 * max_y));
        // Center the world in the box
        let offset = (
            origin.0 as f64 + (width as f64 - 2.0 * max_x * scale) / 2.0,
            origin.1 as f64 + (height as f64 - 2.0 * max_y * scale) / 2.0,
        );
        Self {
            min_x: -max_x,
            max_y,
            scale,
            offset,
        }
    }

    fn to_pixel_f64(self, coord: Coord<f64>) -> (f64, f64) {
        (
            self.offset.0 + (coord.x - self.min_x) * self.scale,
            self.offset.1 + (self.max_y - coord.y) * self.scale,
        )
    }

    fn to_pixel(self, coord: Coord<f64>) -> (i32, i32) {
        let (x, y) = self.to_pixel_f64(coord);
        (x.round() as i32, y.round() as i32)
    }

    fn ring(self, ring: &geo::LineString<f64>) -> Vec<(i32, i32)> {
        ring.coords()
            .map(|coord| self.to_pixel(*coord))
            .dedup()
            .collect()
    }
}

/// A candidate country-code label centered on `anchor` (pixels).
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCandidate {
    pub text: String,
    pub anchor: (f64, f64),
    /// Projected area of the polygon being labelled, in square pixels
    pub pixel_area: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub anchor: (f64, f64),
    pub size: f64,
}

impl PlacedLabel {
    /// Approximate bounding box as (left, top, right, bottom)
    fn bounds(&self) -> (f64, f64, f64, f64) {
        let half_width = self.text.chars().count() as f64 * self.size * GLYPH_WIDTH / 2.0;
        let half_height = self.size / 2.0;
        (
            self.anchor.0 - half_width,
            self.anchor.1 - half_height,
            self.anchor.0 + half_width,
            self.anchor.1 + half_height,
        )
    }

    fn overlaps(&self, other: &PlacedLabel) -> bool {
        let a = self.bounds();
        let b = other.bounds();
        a.0 < b.2 && b.0 < a.2 && a.1 < b.3 && b.1 < a.3
    }
}

/// Size labels by the area of their polygon and keep those that fit, largest polygons first.
/// Labels smaller than `min_font` are dropped, larger ones are capped at `max_font`, and a label
/// overlapping one already placed is dropped.
pub fn place_labels(
    mut candidates: Vec<LabelCandidate>,
    min_font: f64,
    max_font: f64,
) -> Vec<PlacedLabel> {
    candidates.sort_by(|a, b| b.pixel_area.total_cmp(&a.pixel_area));
    let mut placed: Vec<PlacedLabel> = vec![];
    for candidate in candidates {
        let size = (candidate.pixel_area.sqrt() * LABEL_SCALE).min(max_font);
        if size < min_font {
            continue;
        }
        let label = PlacedLabel {
            text: candidate.text,
            anchor: candidate.anchor,
            size,
        };
        if placed.iter().all(|other| !label.overlaps(other)) {
            placed.push(label);
        }
    }
    placed
}

fn drawing_error(err: impl std::fmt::Display) -> anyhow::Error {
    anyhow!("Failed to draw map: {err}")
}

/// A projected country: its code, its bucket in each panel and its geometry.
struct ProjectedCountry {
    code: String,
    buckets: Vec<Option<usize>>,
    geometry: MultiPolygon<f64>,
    area: f64,
}

/// Everything needed to draw the composite map.
pub struct ChoroplethMap<'a> {
    pub countries: &'a Countries,
    pub land: &'a [MultiPolygon<f64>],
    pub panels: &'a [Panel],
    pub projection: EqualAreaProjection,
}

impl<'a> ChoroplethMap<'a> {
    fn size(&self, config: &RenderConfig) -> (u32, u32) {
        (
            config.panel_width,
            config.panel_height * self.panels.len() as u32,
        )
    }

    /// Write the map to an SVG file.
    pub fn render_svg(&self, path: &Path, config: &RenderConfig) -> Result<()> {
        let prepared = self.prepare()?;
        let root = SVGBackend::new(path, self.size(config)).into_drawing_area();
        self.draw(&root, &prepared, config)?;
        root.present().map_err(drawing_error)?;
        info!("Map written to {}", path.display());
        Ok(())
    }

    /// Render the map to an SVG document in memory.
    pub fn to_svg_string(&self, config: &RenderConfig) -> Result<String> {
        let prepared = self.prepare()?;
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size(config)).into_drawing_area();
            self.draw(&root, &prepared, config)?;
            root.present().map_err(drawing_error)?;
        }
        Ok(svg)
    }

    /// Project and classify everything up front so invalid input fails before drawing starts.
    fn prepare(&self) -> Result<(Vec<MultiPolygon<f64>>, Vec<ProjectedCountry>)> {
        if self.panels.is_empty() {
            bail!("No panels to draw");
        }
        if self.panels.len() != self.countries.indicators.len() {
            bail!(
                "{} panels given for {} indicators",
                self.panels.len(),
                self.countries.indicators.len()
            );
        }
        let land = self
            .land
            .iter()
            .map(|geometry| self.projection.project_multipolygon(geometry))
            .collect_vec();
        let mut countries = self
            .countries
            .rows
            .iter()
            .map(|country| {
                let geometry = self.projection.project_multipolygon(&country.geometry);
                ProjectedCountry {
                    code: country.code.clone(),
                    buckets: self
                        .panels
                        .iter()
                        .zip(country.values.iter())
                        .map(|(panel, value)| value.and_then(|v| panel.classifier.classify(v)))
                        .collect(),
                    area: geometry.unsigned_area(),
                    geometry,
                }
            })
            .collect_vec();
        // Large countries first so enclaves are drawn on top of their surroundings
        countries.sort_by(|a, b| b.area.total_cmp(&a.area));
        debug!(
            "Prepared {} land polygons and {} countries",
            land.len(),
            countries.len()
        );
        Ok((land, countries))
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        (land, countries): &(Vec<MultiPolygon<f64>>, Vec<ProjectedCountry>),
        config: &RenderConfig,
    ) -> Result<()> {
        root.fill(&WHITE).map_err(drawing_error)?;
        let areas = root.split_evenly((self.panels.len(), 1));
        for (idx, (area, panel)) in areas.iter().zip(self.panels.iter()).enumerate() {
            let (width, height) = area.dim_in_pixel();
            let frame = Frame::fit(
                &self.projection,
                (MARGIN, TITLE_HEIGHT),
                width.saturating_sub(2 * MARGIN),
                height.saturating_sub(TITLE_HEIGHT + MARGIN),
            );
            draw_fills(area, frame, land, LAND)?;
            for country in countries {
                let color = country.buckets[idx]
                    .map(|bucket| panel.classifier.color(bucket))
                    .unwrap_or(LAND);
                draw_fills(area, frame, std::slice::from_ref(&country.geometry), color)?;
            }
            for country in countries {
                draw_outlines(area, frame, &country.geometry)?;
            }
            draw_labels(area, frame, countries, config)?;
            draw_legend(area, &panel.classifier, height)?;
            area.draw(&Text::new(
                panel.title.as_str(),
                (width as i32 / 2, (TITLE_HEIGHT / 2) as i32),
                (FONT, TITLE_FONT)
                    .into_font()
                    .color(&TEXT)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            ))
            .map_err(drawing_error)?;
        }
        Ok(())
    }
}

/// Fill the exterior of every polygon. Holes are left to whatever is drawn on top of them.
fn draw_fills<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    frame: Frame,
    geometries: &[MultiPolygon<f64>],
    color: RGBColor,
) -> Result<()> {
    for polygon in geometries.iter().flat_map(|geometry| geometry.0.iter()) {
        let points = frame.ring(polygon.exterior());
        if points.len() < 3 {
            continue;
        }
        area.draw(&Polygon::new(points, color.filled()))
            .map_err(drawing_error)?;
    }
    Ok(())
}

fn draw_outlines<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    frame: Frame,
    geometry: &MultiPolygon<f64>,
) -> Result<()> {
    for polygon in &geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            area.draw(&PathElement::new(frame.ring(ring), OUTLINE.stroke_width(1)))
                .map_err(drawing_error)?;
        }
    }
    Ok(())
}

fn largest_polygon(geometry: &MultiPolygon<f64>) -> Option<&GeoPolygon<f64>> {
    geometry
        .0
        .iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
}

fn draw_labels<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    frame: Frame,
    countries: &[ProjectedCountry],
    config: &RenderConfig,
) -> Result<()> {
    let candidates = countries
        .iter()
        .filter_map(|country| {
            let polygon = largest_polygon(&country.geometry)?;
            let centroid = polygon.centroid()?;
            Some(LabelCandidate {
                text: country.code.clone(),
                anchor: frame.to_pixel_f64(centroid.0),
                pixel_area: polygon.unsigned_area() * frame.scale * frame.scale,
            })
        })
        .collect_vec();
    let labels = place_labels(candidates, config.label_min_font, config.label_max_font);
    debug!("Placed {} of {} labels", labels.len(), countries.len());
    for label in labels {
        area.draw(&Text::new(
            label.text,
            (label.anchor.0.round() as i32, label.anchor.1.round() as i32),
            (FONT, label.size)
                .into_font()
                .color(&TEXT)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(drawing_error)?;
    }
    Ok(())
}

/// Legend in the bottom left corner: one swatch per bucket and a "No data" swatch.
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    classifier: &Classifier,
    height: u32,
) -> Result<()> {
    let entries = classifier
        .legend()
        .chain(std::iter::once((NO_DATA, LAND)))
        .collect_vec();
    let x = MARGIN as i32 * 2;
    let top = height as i32 - MARGIN as i32 * 2 - LEGEND_ROW * entries.len() as i32;
    for (row, (label, color)) in entries.into_iter().enumerate() {
        let y = top + row as i32 * LEGEND_ROW;
        area.draw(&Rectangle::new(
            [(x, y), (x + LEGEND_SWATCH, y + LEGEND_SWATCH)],
            color.filled(),
        ))
        .map_err(drawing_error)?;
        area.draw(&Rectangle::new(
            [(x, y), (x + LEGEND_SWATCH, y + LEGEND_SWATCH)],
            OUTLINE.stroke_width(1),
        ))
        .map_err(drawing_error)?;
        area.draw(&Text::new(
            label,
            (x + LEGEND_SWATCH + 6, y + LEGEND_SWATCH / 2),
            (FONT, LEGEND_FONT)
                .into_font()
                .color(&TEXT)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(drawing_error)?;
    }
    Ok(())
}
