use anyhow::{anyhow, Result};
use enum_dispatch::enum_dispatch;
use geo::geometry::Geometry;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value;
use std::fmt::Write as FmtWrite;
use std::io::Cursor;
use std::io::Write;
use wkb::geom_to_wkb;
use wkt::TryFromWkt;

use crate::COL;

fn parse_wkt(wkt_str: &str) -> Result<Geometry<f64>> {
    Geometry::try_from_wkt_str(wkt_str)
        .map_err(|err| anyhow!("Invalid `Geometry<f64>` from well-known text string: {err}"))
}

/// Convert a series of WKT geometries to hex-encoded WKB geometries. Nulls stay null.
fn convert_wkt_to_wkb_hex(s: &Series) -> Result<Series> {
    let hex = s
        .str()?
        .into_iter()
        .map(|opt_wkt| {
            opt_wkt
                .map(|wkt_str| -> Result<String> {
                    let bytes = geom_to_wkb(&parse_wkt(wkt_str)?)
                        .map_err(|err| anyhow!("Failed to encode geometry as WKB: {err:?}"))?;
                    Ok(bytes.iter().fold(String::new(), |mut acc, byte| {
                        let _ = write!(acc, "{byte:02x}");
                        acc
                    }))
                })
                .transpose()
        })
        .collect::<Result<Vec<Option<String>>>>()?;
    Ok(Series::new(s.name(), hex))
}

/// Utility function to convert from polars `AnyValue` to `serde_json::Value`
/// Doesn't cover all types but those of the country table.
fn any_value_to_json(value: &AnyValue) -> Result<Value> {
    match value {
        AnyValue::Null => Ok(Value::Null),
        AnyValue::Boolean(b) => Ok(Value::Bool(*b)),
        AnyValue::String(s) => Ok(Value::String((*s).to_string())),
        AnyValue::StringOwned(s) => Ok(Value::String(s.to_string())),
        AnyValue::Int32(n) => Ok(json!(*n)),
        AnyValue::Int64(n) => Ok(json!(*n)),
        AnyValue::UInt32(n) => Ok(json!(*n)),
        AnyValue::UInt64(n) => Ok(json!(*n)),
        AnyValue::Float32(n) => Ok(json!(*n)),
        AnyValue::Float64(n) if n.is_finite() => Ok(json!(*n)),
        // JSON has no representation for NaN or infinity
        AnyValue::Float64(_) => Ok(Value::Null),
        other => Err(anyhow!("Failed to convert {other:?} to JSON")),
    }
}

/// Build one GeoJSON feature per row with a geometry. Rows without one are skipped.
fn features(df: &DataFrame) -> Result<Vec<geojson::Feature>> {
    let geometry_col = df.column(COL::GEOMETRY)?;
    let other_cols = df.drop(COL::GEOMETRY)?;
    let mut features = vec![];
    for (idx, geom) in geometry_col.str()?.into_iter().enumerate() {
        let Some(wkt_str) = geom else {
            continue;
        };
        let geom = parse_wkt(wkt_str)?;
        let mut properties = serde_json::Map::new();
        for col in other_cols.get_columns() {
            let val = any_value_to_json(&col.get(idx)?)?;
            properties.insert(col.name().to_string(), val);
        }
        features.push(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::from(&geom)),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }
    Ok(features)
}

/// Trait to define different output generators. `save` writes the serialized `DataFrame` to a
/// writer and `format` returns it as a string.
#[enum_dispatch]
pub trait OutputGenerator {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()>;
    fn format(&self, df: &mut DataFrame) -> Result<String> {
        let mut data: Vec<u8> = vec![];
        let mut buff = Cursor::new(&mut data);
        self.save(&mut buff, df)?;

        Ok(String::from_utf8(data)?)
    }
}

/// Enum of OutputFormatters one for each potential
/// output type
#[enum_dispatch(OutputGenerator)]
#[derive(Serialize, Deserialize, Debug)]
pub enum OutputFormatter {
    GeoJSON(GeoJSONFormatter),
    GeoJSONSeq(GeoJSONSeqFormatter),
    Csv(CSVFormatter),
}

/// Format the results as geojson sequence format
/// This is one line per feature serialized as a
/// geojson feature
#[derive(Serialize, Deserialize, Debug)]
pub struct GeoJSONSeqFormatter;

impl OutputGenerator for GeoJSONSeqFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        for feature in features(df)? {
            writeln!(writer, "{feature}")?;
        }
        Ok(())
    }
}

/// Define what format geometries are represented in
///
/// Wkb: Well-known binary, hex encoded
/// Wkt: Well-known text
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoFormat {
    Wkb,
    Wkt,
}

/// Format the results as a CSV file with the
/// geometry encoded in the specified format
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CSVFormatter {
    pub geo_format: Option<GeoFormat>,
}

impl OutputGenerator for CSVFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        if let Some(GeoFormat::Wkb) = self.geo_format {
            let mut df = df.clone();
            let wkb = convert_wkt_to_wkb_hex(df.column(COL::GEOMETRY)?)?;
            df.with_column(wkb)?;
            CsvWriter::new(writer).finish(&mut df)?;
        } else {
            CsvWriter::new(writer).finish(df)?;
        };
        Ok(())
    }
}

/// Format the results as a geojson file
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct GeoJSONFormatter;

impl OutputGenerator for GeoJSONFormatter {
    fn format(&self, df: &mut DataFrame) -> Result<String> {
        let feature_collection = geojson::FeatureCollection {
            bbox: None,
            features: features(df)?,
            foreign_members: None,
        };
        Ok(feature_collection.to_string())
    }

    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        let result = self.format(df)?;
        writer.write_all(result.as_bytes())?;

        Ok(())
    }
}
