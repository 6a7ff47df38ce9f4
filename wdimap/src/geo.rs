//! Loading of country boundaries and land masses from zipped shapefiles.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, Geometry, LineString, MultiPolygon, Simplify, SimplifyVwPreserve};
use log::{debug, info};
use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::{Deserialize, Serialize};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use strum_macros::{Display, EnumString};
use tempfile::TempDir;
use wkt::{ToWkt, TryFromWkt};

use crate::config::{BoundarySource, SimplifyConfig};
use crate::error::WdimapError;
use crate::COL;

/// Records whose code attribute is missing or ambiguous in the boundary data, keyed by the exact
/// value of their formal name attribute.
pub const CODE_CORRECTIONS: [(&str, &str); 3] = [
    ("French Republic", "FRA"),
    ("Kingdom of Norway", "NOR"),
    ("Republic of Kosovo", "XKX"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum SimplifyMethod {
    /// Ramer-Douglas-Peucker; the tolerance is a distance
    DouglasPeucker,
    /// Topology-preserving Visvalingam-Whyatt; the tolerance is an area
    VisvalingamWhyatt,
}

/// A country boundary with the attributes used for joining.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRecord {
    pub code: String,
    pub name: Option<String>,
    pub formal_name: Option<String>,
    /// `None` for null shapes and shapes without any rings
    pub geometry: Option<MultiPolygon<f64>>,
}

/// A shapefile extracted from an archive. The extraction directory is removed when this is
/// dropped.
#[derive(Debug)]
pub struct ExtractedShapefile {
    dir: TempDir,
    shp: PathBuf,
}

impl ExtractedShapefile {
    pub fn path(&self) -> &Path {
        &self.shp
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Extract a zip archive into a temporary directory and locate its `.shp` member.
pub fn extract_shapefile(archive: &Path) -> Result<ExtractedShapefile> {
    if !archive.is_file() {
        bail!(WdimapError::SourceNotFound(archive.to_path_buf()));
    }
    let mut zip = zip::ZipArchive::new(File::open(archive)?)
        .with_context(|| format!("Failed to open archive {}", archive.display()))?;
    let member = zip
        .file_names()
        .filter(|name| !name.starts_with("__MACOSX"))
        .find(|name| name.to_ascii_lowercase().ends_with(".shp"))
        .map(str::to_string)
        .ok_or_else(|| WdimapError::NoShapefileInArchive(archive.to_path_buf()))?;
    let dir = tempfile::Builder::new().prefix("wdimap-").tempdir()?;
    zip.extract(dir.path())?;
    let extracted = ExtractedShapefile {
        shp: dir.path().join(member),
        dir,
    };
    debug!(
        "Extracted {} to {}",
        archive.display(),
        extracted.dir().display()
    );
    Ok(extracted)
}

fn field_str(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        FieldValue::Character(value) => value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        FieldValue::Memo(value) => Some(value.trim().to_string()),
        _ => None,
    }
}

/// Convert a shapefile polygon into a `MultiPolygon`. Each outer ring starts a new polygon and
/// inner rings are holes of the preceding outer ring.
fn to_multipolygon(polygon: &shapefile::Polygon) -> MultiPolygon<f64> {
    let mut polygons: Vec<geo::Polygon<f64>> = vec![];
    for ring in polygon.rings() {
        let line: LineString<f64> = ring
            .points()
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect();
        match ring {
            PolygonRing::Inner(_) if !polygons.is_empty() => {
                let last = polygons.len() - 1;
                polygons[last].interiors_push(line);
            }
            _ => polygons.push(geo::Polygon::new(line, vec![])),
        }
    }
    MultiPolygon::new(polygons)
}

fn shape_geometry(shape: Shape) -> Result<Option<MultiPolygon<f64>>> {
    match shape {
        Shape::NullShape => Ok(None),
        Shape::Polygon(polygon) => {
            let multipolygon = to_multipolygon(&polygon);
            Ok((!is_empty(&multipolygon)).then_some(multipolygon))
        }
        other => bail!(WdimapError::UnsupportedShape(format!(
            "{:?}",
            other.shapetype()
        ))),
    }
}

/// Read the polygons of a shapefile along with their code, name and formal name attributes.
pub fn read_boundaries(shp: &Path, fields: &BoundarySource) -> Result<Vec<BoundaryRecord>> {
    let mut reader = shapefile::Reader::from_path(shp)
        .with_context(|| format!("Failed to read shapefile {}", shp.display()))?;
    let mut records = vec![];
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item?;
        let code = field_str(&record, &fields.code_field).ok_or_else(|| {
            WdimapError::MissingColumn {
                column: fields.code_field.clone(),
                source_name: shp.display().to_string(),
            }
        })?;
        records.push(BoundaryRecord {
            code,
            name: field_str(&record, &fields.name_field),
            formal_name: field_str(&record, &fields.formal_name_field),
            geometry: shape_geometry(shape)?,
        });
    }
    info!("Read {} boundaries from {}", records.len(), shp.display());
    Ok(records)
}

/// Read the non-empty polygons of a shapefile, ignoring its attributes.
pub fn read_polygons(shp: &Path) -> Result<Vec<MultiPolygon<f64>>> {
    let mut reader = shapefile::Reader::from_path(shp)
        .with_context(|| format!("Failed to read shapefile {}", shp.display()))?;
    let mut polygons = vec![];
    for item in reader.iter_shapes_and_records() {
        let (shape, _) = item?;
        if let Some(geometry) = shape_geometry(shape)? {
            polygons.push(geometry);
        }
    }
    Ok(polygons)
}

/// True when a geometry has no polygon with a usable exterior ring.
pub fn is_empty(geometry: &MultiPolygon<f64>) -> bool {
    geometry
        .0
        .iter()
        .all(|polygon| polygon.exterior().0.len() < 4)
}

/// Reduce the vertex count of a geometry. Polygons whose exterior collapses are removed.
pub fn simplify(geometry: &MultiPolygon<f64>, config: &SimplifyConfig) -> MultiPolygon<f64> {
    let mut simplified = match config.method {
        SimplifyMethod::DouglasPeucker => geometry.simplify(&config.tolerance),
        SimplifyMethod::VisvalingamWhyatt => geometry.simplify_vw_preserve(&config.tolerance),
    };
    simplified
        .0
        .retain(|polygon| polygon.exterior().0.len() >= 4);
    simplified
}

/// Remap the code of records whose formal name exactly matches an entry of `CODE_CORRECTIONS`.
/// Returns the number of records changed.
pub fn apply_code_corrections(records: &mut [BoundaryRecord]) -> usize {
    let mut corrected = 0;
    for record in records.iter_mut() {
        let Some(formal_name) = record.formal_name.as_deref() else {
            continue;
        };
        if let Some((_, code)) = CODE_CORRECTIONS
            .iter()
            .find(|(name, _)| *name == formal_name)
        {
            if record.code != *code {
                info!(
                    "Correcting code of '{formal_name}' from '{}' to '{code}'",
                    record.code
                );
                record.code = code.to_string();
                corrected += 1;
            }
        }
    }
    corrected
}

/// Extract, read, simplify and correct the country boundaries.
pub fn load_boundaries(
    source: &BoundarySource,
    simplify_config: &SimplifyConfig,
) -> Result<Vec<BoundaryRecord>> {
    let extracted = extract_shapefile(Path::new(&source.archive))?;
    let mut records = read_boundaries(extracted.path(), source)?;
    for record in records.iter_mut() {
        record.geometry = record
            .geometry
            .as_ref()
            .map(|geometry| simplify(geometry, simplify_config))
            .filter(|geometry| !is_empty(geometry));
    }
    apply_code_corrections(&mut records);
    Ok(records)
}

/// Extract, read and simplify the land mass polygons used as the base layer.
pub fn load_land(archive: &str, simplify_config: &SimplifyConfig) -> Result<Vec<MultiPolygon<f64>>> {
    let extracted = extract_shapefile(Path::new(archive))?;
    let land = read_polygons(extracted.path())?
        .iter()
        .map(|geometry| simplify(geometry, simplify_config))
        .filter(|geometry| !is_empty(geometry))
        .collect::<Vec<_>>();
    info!("Read {} land polygons from {archive}", land.len());
    Ok(land)
}

pub fn to_wkt(geometry: &MultiPolygon<f64>) -> String {
    geometry.wkt_string()
}

pub fn from_wkt(wkt_str: &str) -> Result<MultiPolygon<f64>> {
    let geometry: Geometry<f64> = Geometry::try_from_wkt_str(wkt_str)
        .map_err(|err| anyhow!("Invalid `Geometry<f64>` from well-known text string: {err}"))?;
    match geometry {
        Geometry::MultiPolygon(multipolygon) => Ok(multipolygon),
        Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        other => bail!(WdimapError::UnsupportedShape(format!("{other:?}"))),
    }
}

/// Tabulate boundaries for joining, with geometries as WKT and nulls for empty geometries.
pub fn boundaries_to_df(records: &[BoundaryRecord]) -> Result<DataFrame> {
    let geometries: Vec<Option<String>> = records
        .iter()
        .map(|record| {
            record
                .geometry
                .as_ref()
                .filter(|geometry| !is_empty(geometry))
                .map(to_wkt)
        })
        .collect();
    Ok(DataFrame::new(vec![
        Series::new(
            COL::COUNTRY_CODE,
            records.iter().map(|r| r.code.as_str()).collect::<Vec<_>>(),
        ),
        Series::new(
            COL::BOUNDARY_NAME,
            records.iter().map(|r| r.name.as_deref()).collect::<Vec<_>>(),
        ),
        Series::new(
            COL::BOUNDARY_FORMAL_NAME,
            records
                .iter()
                .map(|r| r.formal_name.as_deref())
                .collect::<Vec<_>>(),
        ),
        Series::new(COL::GEOMETRY, geometries),
    ])?)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use geo::{polygon, Area};
    use shapefile::dbase::{FieldName, TableWriterBuilder};

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]])
    }

    fn record(code: &str, formal_name: Option<&str>) -> BoundaryRecord {
        BoundaryRecord {
            code: code.into(),
            name: None,
            formal_name: formal_name.map(String::from),
            geometry: Some(square(0.0, 0.0, 1.0)),
        }
    }

    fn write_zip(path: &Path, members: &[(&str, Vec<u8>)]) -> anyhow::Result<()> {
        let mut writer = zip::ZipWriter::new(File::create(path)?);
        for (name, contents) in members {
            writer.start_file(*name, zip::write::SimpleFileOptions::default())?;
            writer.write_all(contents)?;
        }
        writer.finish()?;
        Ok(())
    }

    /// A boundary feature: code, name, formal name and the west edge of its square
    pub(crate) type Feature<'a> = (&'a str, &'a str, &'a str, f64);

    /// Write a polygon shapefile of `size` degree squares resting on the equator, with the
    /// boundary attributes, and zip its members as `<stem>.zip`.
    pub(crate) fn write_polygon_archive(
        dir: &Path,
        stem: &str,
        features: &[Feature],
        size: f64,
    ) -> anyhow::Result<PathBuf> {
        let shp = dir.join(format!("{stem}.shp"));
        {
            let table = TableWriterBuilder::new()
                .add_character_field(FieldName::try_from("ISO_A3").unwrap(), 3)
                .add_character_field(FieldName::try_from("NAME").unwrap(), 32)
                .add_character_field(FieldName::try_from("FORMAL_EN").unwrap(), 64);
            let mut writer = shapefile::Writer::from_path(&shp, table)?;
            for (code, name, formal, x) in features {
                let x = *x;
                let polygon = shapefile::Polygon::new(PolygonRing::Outer(vec![
                    shapefile::Point::new(x, 0.0),
                    shapefile::Point::new(x, size),
                    shapefile::Point::new(x + size, size),
                    shapefile::Point::new(x + size, 0.0),
                    shapefile::Point::new(x, 0.0),
                ]));
                let mut record = Record::default();
                record.insert("ISO_A3".into(), FieldValue::Character(Some(code.to_string())));
                record.insert("NAME".into(), FieldValue::Character(Some(name.to_string())));
                record.insert(
                    "FORMAL_EN".into(),
                    FieldValue::Character(Some(formal.to_string())),
                );
                writer.write_shape_and_record(&polygon, &record)?;
            }
        }
        let archive = dir.join(format!("{stem}.zip"));
        let members = ["shp", "shx", "dbf"]
            .iter()
            .map(|ext| {
                let name = format!("{stem}.{ext}");
                std::fs::read(dir.join(&name)).map(|bytes| (name, bytes))
            })
            .collect::<std::io::Result<Vec<_>>>()?;
        write_zip(
            &archive,
            &members
                .iter()
                .map(|(name, bytes)| (name.as_str(), bytes.clone()))
                .collect::<Vec<_>>(),
        )?;
        Ok(archive)
    }

    fn write_boundary_archive(dir: &Path) -> anyhow::Result<PathBuf> {
        write_polygon_archive(
            dir,
            "countries",
            &[
                ("-99", "France", "French Republic", 0.0),
                ("ESP", "Spain", "Kingdom of Spain", 20.0),
            ],
            10.0,
        )
    }

    #[test]
    fn extraction_should_find_shp_and_clean_up() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let archive = dir.path().join("test.zip");
        write_zip(
            &archive,
            &[
                ("readme.txt", b"boundaries".to_vec()),
                ("nested/test.shp", b"shape bytes".to_vec()),
            ],
        )?;
        let extracted = extract_shapefile(&archive)?;
        let extraction_dir = extracted.dir().to_path_buf();
        assert!(extracted.path().ends_with("nested/test.shp"));
        assert_eq!(std::fs::read(extracted.path())?, b"shape bytes");
        drop(extracted);
        assert!(
            !extraction_dir.exists(),
            "extracted files should be removed on drop"
        );
        Ok(())
    }

    #[test]
    fn archive_without_shp_should_fail() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let archive = dir.path().join("test.zip");
        write_zip(&archive, &[("readme.txt", b"nothing here".to_vec())])?;
        let err = extract_shapefile(&archive).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WdimapError>(),
            Some(WdimapError::NoShapefileInArchive(_))
        ));
        Ok(())
    }

    #[test]
    fn missing_archive_should_fail() {
        let err = extract_shapefile(Path::new("/no/such/archive.zip")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WdimapError>(),
            Some(WdimapError::SourceNotFound(_))
        ));
    }

    #[test]
    fn boundaries_should_load_with_corrections() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let archive = write_boundary_archive(dir.path())?;
        let source = BoundarySource {
            archive: archive.to_string_lossy().to_string(),
            ..BoundarySource::default()
        };
        let records = load_boundaries(&source, &SimplifyConfig::default())?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "FRA", "French Republic should be corrected");
        assert_eq!(records[0].name.as_deref(), Some("France"));
        assert_eq!(records[1].code, "ESP");
        assert!(records.iter().all(|r| r.geometry.is_some()));
        Ok(())
    }

    #[test]
    fn corrections_should_be_exact_match_only() {
        let mut records = vec![
            record("-99", Some("French Republic")),
            record("-99", Some("Kingdom of Norway")),
            record("-99", Some("french republic")),
            record("-99", Some("French Republic of Somewhere")),
            record("FJI", Some("Republic of Fiji")),
            record("-99", None),
        ];
        let corrected = apply_code_corrections(&mut records);
        assert_eq!(corrected, 2);
        let codes: Vec<_> = records.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["FRA", "NOR", "-99", "-99", "FJI", "-99"]);
    }

    #[test]
    fn simplify_should_reduce_vertices() {
        // A square with many nearly collinear points along its bottom edge
        let mut exterior: Vec<Coord<f64>> = (0..=100)
            .map(|i| Coord {
                x: i as f64 / 10.0,
                y: if i % 2 == 0 { 0.0 } else { 0.001 },
            })
            .collect();
        exterior.extend([
            Coord { x: 10.0, y: 10.0 },
            Coord { x: 0.0, y: 10.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        let geometry =
            MultiPolygon::new(vec![geo::Polygon::new(LineString::new(exterior), vec![])]);
        for config in [
            SimplifyConfig::default(),
            SimplifyConfig {
                tolerance: 0.05,
                method: SimplifyMethod::DouglasPeucker,
            },
        ] {
            let simplified = simplify(&geometry, &config);
            assert!(!is_empty(&simplified), "{config:?}");
            assert!(simplified.0[0].exterior().0.len() <= 6, "{config:?}");
        }
    }

    #[test]
    fn default_simplification_smooths_jagged_borders() {
        // Two neighbours sharing a jagged border whose teeth are below the default tolerance
        let border: Vec<Coord<f64>> = (0..=20)
            .map(|i| Coord {
                x: if i % 2 == 0 { 5.0 } else { 5.01 },
                y: i as f64 / 2.0,
            })
            .collect();
        let mut west = vec![Coord { x: 0.0, y: 10.0 }, Coord { x: 0.0, y: 0.0 }];
        west.extend(border.iter().copied());
        let mut east = border.iter().rev().copied().collect::<Vec<_>>();
        east.extend([Coord { x: 10.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 }]);
        let config = SimplifyConfig::default();
        assert_eq!(config.method, SimplifyMethod::VisvalingamWhyatt);
        for ring in [west, east] {
            let geometry =
                MultiPolygon::new(vec![geo::Polygon::new(LineString::new(ring), vec![])]);
            let simplified = simplify(&geometry, &config);
            assert_eq!(simplified.0.len(), 1);
            assert!(simplified.0[0].exterior().0.len() < geometry.0[0].exterior().0.len());
            assert!(
                (simplified.unsigned_area() - 50.0).abs() < 0.5,
                "area {}",
                simplified.unsigned_area()
            );
        }
    }

    #[test]
    fn simplify_should_drop_collapsed_polygons() {
        let sliver = geo::Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]),
            vec![],
        );
        let mut geometry = square(5.0, 5.0, 1.0);
        geometry.0.insert(0, sliver);
        let simplified = simplify(&geometry, &SimplifyConfig::default());
        assert_eq!(simplified.0.len(), 1, "the collapsed ring should be removed");
    }

    #[test]
    fn empty_multipolygon_is_empty() {
        assert!(is_empty(&MultiPolygon::new(vec![])));
        assert!(!is_empty(&square(0.0, 0.0, 1.0)));
    }

    #[test]
    fn wkt_should_round_trip_through_dataframe() -> anyhow::Result<()> {
        let mut antarctica = record("ATA", Some("Antarctica"));
        antarctica.geometry = None;
        let records = vec![record("FRA", Some("French Republic")), antarctica];
        let df = boundaries_to_df(&records)?;
        assert_eq!(df.shape(), (2, 4));
        let geometries: Vec<_> = df.column(COL::GEOMETRY)?.str()?.into_iter().collect();
        assert!(geometries[1].is_none(), "empty geometry should be null");
        let parsed = from_wkt(geometries[0].unwrap())?;
        assert_eq!(parsed, square(0.0, 0.0, 1.0));
        Ok(())
    }

    #[test]
    fn simplify_method_should_parse() {
        use std::str::FromStr;
        assert_eq!(
            SimplifyMethod::from_str("visvalingamwhyatt").unwrap(),
            SimplifyMethod::VisvalingamWhyatt
        );
    }
}
