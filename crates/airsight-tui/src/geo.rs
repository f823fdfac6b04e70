//! World outline geometry and the city-distribution map.

use crate::error::{Result, TuiError};
use crate::theme::{ComponentType, ThemeManager};
use airsight_core::models::CityPoint;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Map, MapResolution};
use ratatui::widgets::Widget;
use serde::Deserialize;
use std::path::Path;

/// Degrees of marker radius per square root of a city's weight.
pub const MARKER_SCALE: f64 = 0.35;
const MIN_MARKER_RADIUS: f64 = 0.6;

/// Country outlines as closed rings of `(longitude, latitude)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldGeometry {
    rings: Vec<Vec<(f64, f64)>>,
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

fn ring(positions: Vec<Vec<f64>>) -> Vec<(f64, f64)> {
    positions
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}

impl WorldGeometry {
    /// Parse a GeoJSON `FeatureCollection` of polygons.
    pub fn from_geojson(source: &str) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_str(source).map_err(|e| TuiError::GeometryLoadFailed {
                path: "<inline>".to_string(),
                reason: e.to_string(),
            })?;

        let mut rings = Vec::new();
        for geometry in collection.features.into_iter().filter_map(|f| f.geometry) {
            match geometry {
                Geometry::Polygon { coordinates } => {
                    rings.extend(coordinates.into_iter().map(ring));
                }
                Geometry::MultiPolygon { coordinates } => {
                    rings.extend(coordinates.into_iter().flatten().map(ring));
                }
                Geometry::Unsupported => {}
            }
        }
        rings.retain(|r| r.len() >= 2);
        Ok(Self { rings })
    }

    pub fn rings(&self) -> &[Vec<(f64, f64)>] {
        &self.rings
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// Read and parse a GeoJSON world outline.
pub async fn load_geometry(path: &Path) -> Result<WorldGeometry> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TuiError::GeometryLoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    WorldGeometry::from_geojson(&source).map_err(|e| match e {
        TuiError::GeometryLoadFailed { reason, .. } => TuiError::GeometryLoadFailed {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// Marker radius in degrees, proportional to the square root of `weight`.
pub fn marker_radius(weight: f64) -> f64 {
    (weight.max(0.0).sqrt() * MARKER_SCALE).max(MIN_MARKER_RADIUS)
}

/// Draw `points` over the world outline. Without loaded geometry the
/// built-in low-detail map is used.
pub fn render_map(
    area: Rect,
    buf: &mut Buffer,
    theme: &ThemeManager,
    geometry: Option<&WorldGeometry>,
    points: &[CityPoint],
    marker: Color,
) {
    let outline = theme.get_color(ComponentType::Muted);
    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-180.0, 180.0])
        .y_bounds([-90.0, 90.0])
        .paint(|ctx| {
            match geometry {
                Some(world) if !world.is_empty() => {
                    for ring in world.rings() {
                        for pair in ring.windows(2) {
                            ctx.draw(&CanvasLine {
                                x1: pair[0].0,
                                y1: pair[0].1,
                                x2: pair[1].0,
                                y2: pair[1].1,
                                color: outline,
                            });
                        }
                    }
                }
                _ => ctx.draw(&Map {
                    color: outline,
                    resolution: MapResolution::High,
                }),
            }
            ctx.layer();
            for point in points {
                ctx.draw(&Circle {
                    x: point.lon,
                    y: point.lat,
                    radius: marker_radius(point.weight),
                    color: marker,
                });
            }
        })
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Square"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                 [[[20,20,5],[30,20,5],[30,30,5],[20,20,5]]],
                 [[[40,40],[50,40],[40,40]]]
             ]}},
            {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1,2]}},
            {"type": "Feature", "properties": {}, "geometry": null}
        ]
    }"#;

    #[test]
    fn test_parse_polygons() {
        let world = WorldGeometry::from_geojson(SQUARE).unwrap();
        assert_eq!(world.rings().len(), 3);
        assert_eq!(world.rings()[0][1], (10.0, 0.0));
        // Altitude is ignored
        assert_eq!(world.rings()[1][0], (20.0, 20.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            WorldGeometry::from_geojson("not json"),
            Err(TuiError::GeometryLoadFailed { .. })
        ));
    }

    #[test]
    fn test_marker_radius_grows_with_sqrt() {
        assert_eq!(marker_radius(0.0), MIN_MARKER_RADIUS);
        let small = marker_radius(25.0);
        let large = marker_radius(100.0);
        assert!((large / small - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_load_geometry_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SQUARE.as_bytes()).unwrap();
        let world = load_geometry(file.path()).await.unwrap();
        assert!(!world.is_empty());
    }

    #[tokio::test]
    async fn test_load_geometry_missing_file() {
        let err = load_geometry(Path::new("/nonexistent/world.json"))
            .await
            .unwrap_err();
        match err {
            TuiError::GeometryLoadFailed { path, .. } => assert!(path.ends_with("world.json")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_render_marks_points() {
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        let points = vec![CityPoint {
            name: Some("Doha".to_string()),
            lon: 51.5,
            lat: 25.3,
            weight: 400.0,
        }];
        render_map(area, &mut buf, &ThemeManager::new(), None, &points, Color::Red);
        let has_marker = buf.content().iter().any(|cell| cell.fg == Color::Red);
        assert!(has_marker);
    }
}
