//! Equal-area map projections on the unit sphere.
//!
//! Projections are configured with proj-style definitions such as `+proj=eqearth` or
//! `+proj=moll +lon_0=10`. Only the parameters listed in `EqualAreaProjection::from_str` are
//! understood; anything else is rejected rather than silently ignored.

use std::f64::consts::{FRAC_PI_2, PI};
use std::str::FromStr;

use geo::{BooleanOps, BoundingRect, Coord, MapCoords, MultiPolygon, Polygon, Rect, Translate};

use crate::error::WdimapError;

// Equal Earth polynomial coefficients
const A1: f64 = 1.340264;
const A2: f64 = -0.081106;
const A3: f64 = 0.000893;
const A4: f64 = 0.003796;

const MOLLWEIDE_MAX_ITERATIONS: usize = 50;

/// Latitude bound of the clipping window, past the poles so no ring shares an edge with it
const CLIP_LATITUDE: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EqualAreaProjection {
    /// Šavrič, Patterson & Jenny (2018)
    EqualEarth { lon_0: f64 },
    Mollweide { lon_0: f64 },
}

impl Default for EqualAreaProjection {
    fn default() -> Self {
        EqualAreaProjection::EqualEarth { lon_0: 0.0 }
    }
}

impl FromStr for EqualAreaProjection {
    type Err = WdimapError;

    fn from_str(definition: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| WdimapError::InvalidProjection(reason);
        let mut name = None;
        let mut lon_0 = 0.0;
        for token in definition.split_whitespace() {
            let parameter = token
                .strip_prefix('+')
                .ok_or_else(|| invalid(format!("'{token}' should start with '+'")))?;
            let (key, value) = parameter.split_once('=').unwrap_or((parameter, ""));
            match key {
                "proj" => name = Some(value),
                "lon_0" => {
                    lon_0 = value
                        .parse()
                        .map_err(|_| invalid(format!("'{value}' is not a longitude")))?;
                }
                // Accepted for compatibility with full proj strings, no effect on a sphere
                "no_defs" | "type" | "units" | "ellps" | "datum" => {}
                other => return Err(invalid(format!("unsupported parameter '{other}'"))),
            }
        }
        match name {
            Some("eqearth") => Ok(EqualAreaProjection::EqualEarth { lon_0 }),
            Some("moll") => Ok(EqualAreaProjection::Mollweide { lon_0 }),
            Some(other) => Err(invalid(format!(
                "'{other}' is not a supported equal-area projection"
            ))),
            None => Err(invalid(format!("no +proj in '{definition}'"))),
        }
    }
}

impl EqualAreaProjection {
    fn lon_0(&self) -> f64 {
        match self {
            EqualAreaProjection::EqualEarth { lon_0 } | EqualAreaProjection::Mollweide { lon_0 } => {
                *lon_0
            }
        }
    }

    /// Project a longitude and latitude in degrees to planar coordinates on the unit sphere.
    pub fn project(&self, lon: f64, lat: f64) -> Coord<f64> {
        self.project_centered(wrap_longitude(lon - self.lon_0()), lat)
    }

    /// Project a longitude already relative to the central meridian.
    fn project_centered(&self, lon: f64, lat: f64) -> Coord<f64> {
        let lambda = lon.clamp(-180.0, 180.0).to_radians();
        let phi = lat.clamp(-90.0, 90.0).to_radians();
        match self {
            EqualAreaProjection::EqualEarth { .. } => equal_earth(lambda, phi),
            EqualAreaProjection::Mollweide { .. } => mollweide(lambda, phi),
        }
    }

    /// Half the width and half the height of the projected world.
    pub fn half_extent(&self) -> (f64, f64) {
        (
            self.project_centered(180.0, 0.0).x,
            self.project_centered(0.0, 90.0).y,
        )
    }

    /// Project a geometry, cutting polygons that cross the antimeridian of the central meridian
    /// so that each piece is drawn on its own side of the map.
    pub fn project_multipolygon(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        self.recenter(geometry)
            .map_coords(|Coord { x, y }| self.project_centered(x, y))
    }

    /// Longitudes relative to the central meridian, with every polygon inside [-180, 180].
    fn recenter(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        let lon_0 = wrap_longitude(self.lon_0());
        if lon_0 == 0.0 {
            return geometry.clone();
        }
        let world = MultiPolygon::new(vec![Rect::new(
            Coord {
                x: -180.0,
                y: -CLIP_LATITUDE,
            },
            Coord {
                x: 180.0,
                y: CLIP_LATITUDE,
            },
        )
        .to_polygon()]);
        let mut polygons: Vec<Polygon<f64>> = vec![];
        for polygon in geometry.translate(-lon_0, 0.0) {
            let Some(bounds) = polygon.bounding_rect() else {
                continue;
            };
            if bounds.min().x >= -180.0 && bounds.max().x <= 180.0 {
                polygons.push(polygon);
            } else if bounds.min().x >= 180.0 {
                polygons.push(polygon.translate(-360.0, 0.0));
            } else if bounds.max().x <= -180.0 {
                polygons.push(polygon.translate(360.0, 0.0));
            } else {
                let straddling = MultiPolygon::new(vec![polygon]);
                for offset in [-360.0, 0.0, 360.0] {
                    polygons.extend(straddling.translate(offset, 0.0).intersection(&world));
                }
            }
        }
        MultiPolygon::new(polygons)
    }
}

/// Wrap a longitude difference into [-180, 180].
fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

fn equal_earth(lambda: f64, phi: f64) -> Coord<f64> {
    let m = 3f64.sqrt() / 2.0;
    let theta = (m * phi.sin()).asin();
    let theta2 = theta * theta;
    let theta6 = theta2 * theta2 * theta2;
    let x = lambda * theta.cos()
        / (m * (A1 + 3.0 * A2 * theta2 + theta6 * (7.0 * A3 + 9.0 * A4 * theta2)));
    let y = theta * (A1 + A2 * theta2 + theta6 * (A3 + A4 * theta2));
    Coord { x, y }
}

fn mollweide(lambda: f64, phi: f64) -> Coord<f64> {
    // Solve 2θ + sin 2θ = π sin φ for the auxiliary angle θ by Newton's method
    let theta = if (phi.abs() - FRAC_PI_2).abs() < 1e-12 {
        phi
    } else {
        let target = PI * phi.sin();
        let mut two_theta = 2.0 * phi;
        for _ in 0..MOLLWEIDE_MAX_ITERATIONS {
            let step = (two_theta + two_theta.sin() - target) / (1.0 + two_theta.cos());
            two_theta -= step;
            if step.abs() < 1e-12 {
                break;
            }
        }
        two_theta / 2.0
    };
    Coord {
        x: 2.0 * 2f64.sqrt() / PI * lambda * theta.cos(),
        y: 2f64.sqrt() * theta.sin(),
    }
}

#[cfg(test)]
mod tests {
    use geo::{Area, LineString};

    use super::*;

    /// A lon/lat cell with each edge split into many segments, since meridians are curved once
    /// projected.
    fn cell(lon: f64, lat: f64, size: f64) -> MultiPolygon<f64> {
        let steps = 200;
        let edge = |from: (f64, f64), to: (f64, f64)| {
            (0..steps).map(move |i| {
                let t = i as f64 / steps as f64;
                Coord {
                    x: from.0 + (to.0 - from.0) * t,
                    y: from.1 + (to.1 - from.1) * t,
                }
            })
        };
        let corners = [
            (lon, lat),
            (lon + size, lat),
            (lon + size, lat + size),
            (lon, lat + size),
        ];
        let ring: Vec<Coord<f64>> = (0..4)
            .flat_map(|i| edge(corners[i], corners[(i + 1) % 4]))
            .collect();
        MultiPolygon::new(vec![Polygon::new(LineString::new(ring), vec![])])
    }

    /// Area of a lon/lat cell on the unit sphere
    fn sphere_area(lat: f64, size: f64) -> f64 {
        size.to_radians() * ((lat + size).to_radians().sin() - lat.to_radians().sin())
    }

    fn projections() -> [EqualAreaProjection; 2] {
        [
            EqualAreaProjection::EqualEarth { lon_0: 0.0 },
            EqualAreaProjection::Mollweide { lon_0: 0.0 },
        ]
    }

    #[test]
    fn definitions_should_parse() {
        assert_eq!(
            "+proj=eqearth".parse::<EqualAreaProjection>().unwrap(),
            EqualAreaProjection::EqualEarth { lon_0: 0.0 }
        );
        assert_eq!(
            "+proj=moll +lon_0=10 +units=m +no_defs"
                .parse::<EqualAreaProjection>()
                .unwrap(),
            EqualAreaProjection::Mollweide { lon_0: 10.0 }
        );
    }

    #[test]
    fn unsupported_definitions_should_fail() {
        for definition in ["+proj=merc", "", "+lon_0=10", "proj=moll", "+proj=moll +lat_0=5"] {
            assert!(
                matches!(
                    definition.parse::<EqualAreaProjection>(),
                    Err(WdimapError::InvalidProjection(_))
                ),
                "'{definition}' should not parse"
            );
        }
    }

    #[test]
    fn origin_maps_to_origin() {
        for projection in projections() {
            let origin = projection.project(0.0, 0.0);
            assert!(origin.x.abs() < 1e-12 && origin.y.abs() < 1e-12);
        }
    }

    #[test]
    fn projection_is_symmetric() {
        for projection in projections() {
            let p = projection.project(40.0, 30.0);
            let q = projection.project(-40.0, -30.0);
            assert!((p.x + q.x).abs() < 1e-12);
            assert!((p.y + q.y).abs() < 1e-12);
        }
    }

    #[test]
    fn central_meridian_shifts_longitudes() {
        let shifted = EqualAreaProjection::EqualEarth { lon_0: 20.0 };
        let p = shifted.project(20.0, 45.0);
        assert!(p.x.abs() < 1e-12);
        let wrapped = shifted.project(-170.0, 0.0);
        let direct = EqualAreaProjection::default().project(170.0, 0.0);
        assert!((wrapped.x - direct.x).abs() < 1e-9);
    }

    #[test]
    fn projected_areas_match_sphere_areas() {
        for projection in projections() {
            for (lon, lat) in [(0.0, 0.0), (100.0, 40.0), (-60.0, -70.0), (170.0, 70.0)] {
                let projected = projection.project_multipolygon(&cell(lon, lat, 10.0));
                let expected = sphere_area(lat, 10.0);
                let relative_error = (projected.unsigned_area() - expected).abs() / expected;
                assert!(
                    relative_error < 0.01,
                    "{projection:?} cell at ({lon}, {lat}) off by {relative_error}"
                );
            }
        }
    }

    #[test]
    fn shifted_projection_splits_polygons_at_the_antimeridian() {
        // Ten degrees wide and just east of the antimeridian, which moves to 10°W with lon_0=10
        let square = cell(-178.0, 60.0, 10.0);
        for projection in [
            EqualAreaProjection::EqualEarth { lon_0: 10.0 },
            EqualAreaProjection::Mollweide { lon_0: 10.0 },
        ] {
            let projected = projection.project_multipolygon(&square);
            assert_eq!(projected.0.len(), 2, "{projection:?} should cut the square in two");
            let (half_width, _) = projection.half_extent();
            for piece in projected.iter() {
                let bounds = piece.bounding_rect().unwrap();
                assert!(
                    bounds.width() < 0.2 * half_width,
                    "{projection:?} piece spans {} of {half_width}",
                    bounds.width()
                );
            }
            let expected = sphere_area(60.0, 10.0);
            let relative_error = (projected.unsigned_area() - expected).abs() / expected;
            assert!(relative_error < 0.01, "area changed by {relative_error}");
        }
    }

    #[test]
    fn shifted_projection_moves_whole_polygons_across() {
        let projection = EqualAreaProjection::EqualEarth { lon_0: 90.0 };
        let projected = projection.project_multipolygon(&cell(-100.0, 0.0, 10.0));
        assert_eq!(projected.0.len(), 1);
        let bounds = projected.bounding_rect().unwrap();
        // -100..-90 becomes 170..180 east of the central meridian
        assert!(bounds.min().x > 0.0);
        assert!((bounds.max().x - projection.half_extent().0).abs() < 1e-9);
    }

    #[test]
    fn mollweide_poles_are_points() {
        let projection = EqualAreaProjection::Mollweide { lon_0: 0.0 };
        let pole = projection.project(120.0, 90.0);
        assert!(pole.x.abs() < 1e-9);
        assert!((pole.y - 2f64.sqrt()).abs() < 1e-9);
    }
}
