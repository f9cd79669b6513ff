mod relations;

pub use relations::{RelationEntry, RelationTable, UNKNOWN_CODE};

use crate::error::MapError;
use crate::geo::GeoPoint;
use crate::map::{CountryEntry, CountryIndex, Polygon, Shape};
use geojson::{Feature, GeoJson, Geometry, JsonObject, PolygonType, Value};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Load Natural Earth admin-0 country outlines into an index.
///
/// Any read or parse failure is a `GeometryLoadFailure`; callers fall back to
/// an empty index rather than aborting.
pub fn load_country_index(path: &Path) -> Result<CountryIndex, MapError> {
    let content = fs::read_to_string(path)
        .map_err(|e| MapError::GeometryLoadFailure(format!("{}: {e}", path.display())))?;
    let geojson: GeoJson = content
        .parse()
        .map_err(|e| MapError::GeometryLoadFailure(format!("{}: {e}", path.display())))?;
    let entries = parse_countries(&geojson);
    if entries.is_empty() {
        return Err(MapError::GeometryLoadFailure(format!(
            "{}: no country polygons found",
            path.display()
        )));
    }
    Ok(CountryIndex::new(entries))
}

/// Extract country entries in file order. Features without a usable code or
/// without (multi)polygon geometry are skipped.
pub fn parse_countries(geojson: &GeoJson) -> Vec<CountryEntry> {
    match geojson {
        GeoJson::FeatureCollection(fc) => fc
            .features
            .par_iter()
            .filter_map(country_from_feature)
            .collect(),
        GeoJson::Feature(f) => country_from_feature(f).into_iter().collect(),
        GeoJson::Geometry(_) => Vec::new(),
    }
}

fn country_from_feature(feature: &Feature) -> Option<CountryEntry> {
    let props = feature.properties.as_ref()?;
    let code = country_code(props)?;
    let name = ["NAME", "name", "ADMIN", "admin"]
        .iter()
        .find_map(|key| props.get(*key).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&code)
        .to_string();

    let shape = shape_from_geometry(feature.geometry.as_ref()?);
    if shape.is_empty() {
        return None;
    }
    Some(CountryEntry { code, name, shape })
}

/// ISO_A3 with ADM0_A3 as fallback. Natural Earth marks a few countries
/// (France, Norway) with ISO_A3 = "-99".
fn country_code(props: &JsonObject) -> Option<String> {
    ["ISO_A3", "iso_a3", "ADM0_A3", "adm0_a3"]
        .iter()
        .filter_map(|key| props.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|code| !code.is_empty() && *code != "-99")
        .map(str::to_string)
}

fn shape_from_geometry(geometry: &Geometry) -> Shape {
    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons);
    Shape::new(polygons)
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match &geometry.value {
        Value::Polygon(rings) => out.extend(polygon_from_rings(rings)),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(polygon_from_rings));
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

fn polygon_from_rings(rings: &PolygonType) -> Option<Polygon> {
    let mut rings = rings.iter().map(|ring| {
        ring.iter()
            .filter(|c| c.len() >= 2)
            .map(|c| GeoPoint::new(c[0], c[1]))
            .collect::<Vec<_>>()
    });
    let exterior = rings.next().filter(|r| r.len() >= 3)?;
    let holes = rings.filter(|r| r.len() >= 3).collect();
    Some(Polygon::new(exterior, holes))
}
