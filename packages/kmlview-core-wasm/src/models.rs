// This is the models module containing shared data structures
use geo_types::Geometry;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Number of decimals kept for derived lengths
pub const LENGTH_DECIMALS: usize = 2;

/// Text shown in place of a length for non path-like geometries
pub const NOT_APPLICABLE: &str = "N/A";

/// One geographic element of an imported document.
///
/// `geometry` is `None` when the source carried a type tag but its
/// coordinate data could not be read; the tag is still counted.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry_type: String,
    pub geometry: Option<Geometry<f64>>,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Feature {
    pub fn new(geometry: Geometry<f64>) -> Self {
        Feature {
            geometry_type: geometry_type_name(&geometry).to_string(),
            geometry: Some(geometry),
            properties: FeatureProperties::default(),
        }
    }

    /// A feature whose coordinates could not be read
    pub fn malformed(geometry_type: impl Into<String>) -> Self {
        Feature {
            geometry_type: geometry_type.into(),
            geometry: None,
            properties: FeatureProperties::default(),
        }
    }

    pub fn with_properties(mut self, properties: FeatureProperties) -> Self {
        self.properties = properties;
        self
    }
}

/// Ordered features from one imported document, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        FeatureCollection { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// GeoJSON tag of a geometry
pub fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) | Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Occurrence count per geometry tag, keys in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryCounts {
    entries: Vec<(String, usize)>,
}

impl SummaryCounts {
    pub fn increment(&mut self, geometry_type: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == geometry_type) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((geometry_type.to_string(), 1)),
        }
    }

    pub fn get(&self, geometry_type: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(key, _)| key == geometry_type)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

// Serialized as a plain object so the table keeps insertion order
impl Serialize for SummaryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// Per-feature row of the detailed view.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRecord {
    pub geometry_type: String,
    /// Rounded length for path-like geometries, `None` when not applicable
    pub length: Option<f64>,
}

impl DetailRecord {
    /// Length with two decimals, or "N/A"
    pub fn length_label(&self) -> String {
        match self.length {
            Some(length) => format!("{:.*}", LENGTH_DECIMALS, length),
            None => NOT_APPLICABLE.to_string(),
        }
    }
}

impl Serialize for DetailRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("DetailRecord", 2)?;
        record.serialize_field("type", &self.geometry_type)?;
        record.serialize_field("length", &self.length_label())?;
        record.end()
    }
}

/// A (latitude, longitude) pair as the map widget expects it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl Serialize for LatLng {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lat, self.lng].serialize(serializer)
    }
}

/// Corners of the box that fits every coordinate of a collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Serialize for ViewportBounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.south_west, self.north_east].serialize(serializer)
    }
}
