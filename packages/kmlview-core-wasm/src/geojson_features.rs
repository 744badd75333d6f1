use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::console_log;
use crate::error::{GeometryError, Result};
use crate::models::{Feature, FeatureCollection, FeatureProperties};

// GeoJSON-like collection as handed over by a converter
#[derive(Deserialize)]
pub struct RawFeatureCollection {
    pub features: Vec<RawFeature>,
}

#[derive(Deserialize)]
pub struct RawFeature {
    #[serde(default)]
    pub geometry: Option<RawGeometry>,
    #[serde(default)]
    pub properties: Option<Value>,
}

// Geometry part of a feature, coordinates kept untyped until the tag is known
#[derive(Deserialize)]
pub struct RawGeometry {
    pub r#type: String,
    #[serde(default)]
    pub coordinates: Value,
    #[serde(default)]
    pub geometries: Vec<RawGeometry>,
}

/// Read a `{ features: [ { geometry: { type, coordinates } } ] }` document.
///
/// Only invalid JSON fails the call. A feature whose coordinates do not fit
/// its tag keeps the tag and loses the geometry; features without any
/// geometry are dropped.
pub fn parse_feature_collection(json: &str) -> Result<FeatureCollection> {
    let raw: RawFeatureCollection = serde_json::from_str(json)?;
    let mut features = Vec::with_capacity(raw.features.len());

    for (index, raw_feature) in raw.features.into_iter().enumerate() {
        let Some(raw_geometry) = raw_feature.geometry else {
            console_log!("Skipping feature {} without geometry", index);
            continue;
        };
        let properties = raw_feature
            .properties
            .as_ref()
            .map(properties_from_value)
            .unwrap_or_default();

        let feature = match geometry_from_raw(&raw_geometry) {
            Ok(geometry) => Feature {
                geometry_type: raw_geometry.r#type.clone(),
                geometry: Some(geometry),
                properties,
            },
            Err(err) => {
                console_log!("Feature {} ({}): {}", index, raw_geometry.r#type, err);
                Feature::malformed(raw_geometry.r#type.clone()).with_properties(properties)
            }
        };
        features.push(feature);
    }

    Ok(FeatureCollection::new(features))
}

fn properties_from_value(value: &Value) -> FeatureProperties {
    let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
    FeatureProperties {
        name: text("name"),
        description: text("description"),
    }
}

/// Convert untyped coordinates into the geometry variant named by the tag.
pub fn geometry_from_raw(raw: &RawGeometry) -> std::result::Result<Geometry<f64>, GeometryError> {
    let tag = raw.r#type.as_str();
    let coords = &raw.coordinates;

    let geometry = match tag {
        "Point" => Geometry::Point(Point(position(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(
            positions(coords, tag)?.into_iter().map(Point).collect(),
        )),
        "LineString" => Geometry::LineString(LineString::new(positions(coords, tag)?)),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString::new(nested(
            coords,
            tag,
            "a list of lines",
            |line| positions(line, tag).map(LineString::new),
        )?)),
        "Polygon" => Geometry::Polygon(polygon(coords, tag)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon::new(nested(
            coords,
            tag,
            "a list of polygons",
            |rings| polygon(rings, tag),
        )?)),
        "GeometryCollection" => Geometry::GeometryCollection(GeometryCollection::new_from(
            raw.geometries
                .iter()
                .map(geometry_from_raw)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        )),
        other => return Err(GeometryError::UnsupportedType(other.to_string())),
    };
    Ok(geometry)
}

// [lng, lat, alt?] -> Coord, altitude dropped
fn position(value: &Value) -> std::result::Result<Coord<f64>, GeometryError> {
    match value.as_array().map(Vec::as_slice) {
        Some([x, y, ..]) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Ok(Coord { x, y }),
            _ => Err(GeometryError::BadPosition),
        },
        _ => Err(GeometryError::BadPosition),
    }
}

fn positions(value: &Value, tag: &str) -> std::result::Result<Vec<Coord<f64>>, GeometryError> {
    nested(value, tag, "a list of positions", position)
}

// Absent coordinates read as an empty list
fn nested<T, F>(
    value: &Value,
    tag: &str,
    expected: &'static str,
    item: F,
) -> std::result::Result<Vec<T>, GeometryError>
where
    F: Fn(&Value) -> std::result::Result<T, GeometryError>,
{
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(item).collect(),
        _ => Err(GeometryError::WrongNesting {
            geometry_type: tag.to_string(),
            expected,
        }),
    }
}

fn polygon(value: &Value, tag: &str) -> std::result::Result<Polygon<f64>, GeometryError> {
    let mut rings = nested(value, tag, "a list of rings", |ring| {
        positions(ring, tag).map(LineString::new)
    })?
    .into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect()))
}

/// GeoJSON value of a whole collection, ready for the map widget.
pub fn feature_collection_to_geojson(collection: &FeatureCollection) -> Value {
    let features: Vec<Value> = collection
        .features
        .iter()
        .map(|feature| {
            json!({
                "type": "Feature",
                "geometry": feature.geometry.as_ref().map(geometry_to_geojson),
                "properties": feature.properties,
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

pub fn geometry_to_geojson(geometry: &Geometry<f64>) -> Value {
    match geometry {
        Geometry::Point(point) => json!({
            "type": "Point",
            "coordinates": coord_value(&point.0),
        }),
        Geometry::Line(line) => json!({
            "type": "LineString",
            "coordinates": [coord_value(&line.start), coord_value(&line.end)],
        }),
        Geometry::LineString(line) => json!({
            "type": "LineString",
            "coordinates": line_value(line),
        }),
        Geometry::Polygon(polygon) => json!({
            "type": "Polygon",
            "coordinates": polygon_value(polygon),
        }),
        Geometry::Rect(rect) => json!({
            "type": "Polygon",
            "coordinates": polygon_value(&rect.to_polygon()),
        }),
        Geometry::Triangle(triangle) => json!({
            "type": "Polygon",
            "coordinates": polygon_value(&triangle.to_polygon()),
        }),
        Geometry::MultiPoint(points) => json!({
            "type": "MultiPoint",
            "coordinates": points.0.iter().map(|p| coord_value(&p.0)).collect::<Vec<_>>(),
        }),
        Geometry::MultiLineString(lines) => json!({
            "type": "MultiLineString",
            "coordinates": lines.0.iter().map(line_value).collect::<Vec<_>>(),
        }),
        Geometry::MultiPolygon(polygons) => json!({
            "type": "MultiPolygon",
            "coordinates": polygons.0.iter().map(polygon_value).collect::<Vec<_>>(),
        }),
        Geometry::GeometryCollection(collection) => json!({
            "type": "GeometryCollection",
            "geometries": collection.0.iter().map(geometry_to_geojson).collect::<Vec<_>>(),
        }),
    }
}

fn coord_value(coord: &Coord<f64>) -> Value {
    json!([coord.x, coord.y])
}

fn line_value(line: &LineString<f64>) -> Value {
    Value::Array(line.0.iter().map(coord_value).collect())
}

fn polygon_value(polygon: &Polygon<f64>) -> Value {
    let mut rings = vec![line_value(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(line_value));
    Value::Array(rings)
}
