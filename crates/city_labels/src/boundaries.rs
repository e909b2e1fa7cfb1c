use crate::error::Result;
use crate::frame::Bounds;

use geojson::{Feature, GeoJson, Geometry, Value};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Property keys that may hold a feature's display name.
const NAME_KEYS: [&str; 3] = ["name", "NAME", "ADMIN"];

/// Outline polylines of the world map backdrop, in lon/lat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundaries {
    pub lines: Vec<Vec<(f64, f64)>>,
}

impl Boundaries {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Extent of every outline point, if any.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::covering(self.lines.iter().flatten().copied())
    }
}

/// Load boundary outlines from a GeoJSON file, dropping features named in `excluded_regions`
pub fn load_boundaries(path: &Path, excluded_regions: &[String]) -> Result<Boundaries> {
    let content = fs::read_to_string(path)?;
    let boundaries = parse_boundaries(&content, excluded_regions)?;
    info!(
        "Loaded {} boundary lines from {}",
        boundaries.lines.len(),
        path.display()
    );
    Ok(boundaries)
}

pub fn parse_boundaries(content: &str, excluded_regions: &[String]) -> Result<Boundaries> {
    let geojson: GeoJson = content.parse()?;
    let mut boundaries = Boundaries::default();
    let mut add_line = |line: Vec<(f64, f64)>| {
        if line.len() >= 2 {
            boundaries.lines.push(line);
        }
    };

    match &geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if is_excluded(feature, excluded_regions) {
                    continue;
                }
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if !is_excluded(f, excluded_regions)
                && let Some(ref geometry) = f.geometry
            {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }

    Ok(boundaries)
}

fn is_excluded(feature: &Feature, excluded_regions: &[String]) -> bool {
    let name = NAME_KEYS
        .iter()
        .find_map(|key| feature.property(*key).and_then(|v| v.as_str()));
    match name {
        Some(name) if excluded_regions.iter().any(|r| r == name) => {
            debug!("Dropping boundary of {name}");
            true
        }
        _ => false,
    }
}

/// Every ring of polygons is kept: the map draws boundaries, not fills.
fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    let to_line = |coords: &Vec<Vec<f64>>| -> Vec<(f64, f64)> {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            for ring in rings {
                add_line(to_line(ring));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                for ring in rings {
                    add_line(to_line(ring));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}
