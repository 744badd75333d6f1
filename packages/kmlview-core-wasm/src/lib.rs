use serde::Serialize;
use wasm_bindgen::prelude::*;

// Create a console module for logging
pub mod console;
// Error types shared by the importers
pub mod error;
// Feature collection, summary and detail models
pub mod models;
// GeoJSON-shaped input and output
pub mod geojson_features;
// KML importer
pub mod kml_import;
// Geometry counting and detail rows
pub mod classify;
// Viewport bounds of a collection
pub mod bounds;
// Import our geometry functions
#[path = "../geometry_functions/length.rs"]
pub mod length;
// Load sequencing for file reads
pub mod cancellation;
// Viewer application state
pub mod viewer_state;
// JS-facing viewer class
mod viewer;

pub use bounds::compute_bounds;
pub use classify::{classify, compute_details, is_path_like};
pub use error::{GeometryError, ImportError};
pub use geojson_features::parse_feature_collection;
pub use kml_import::import_kml;
pub use length::{compute_length, normalize_lines};
pub use models::{
    DetailRecord, Feature, FeatureCollection, FeatureProperties, LatLng, SummaryCounts,
    ViewportBounds,
};
pub use viewer::KmlViewer;
pub use viewer_state::{ViewMode, ViewerState};

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => ($crate::console::log(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("KML viewer core initialized");
    });
}

// Plain JS objects rather than Maps, so key order survives in the tables
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Convert KML text into a GeoJSON FeatureCollection
#[wasm_bindgen]
pub fn import_kml_document(kml_text: &str) -> Result<JsValue, JsValue> {
    let collection = import_kml(kml_text)?;
    to_js(&geojson_features::feature_collection_to_geojson(&collection))
}

/// Geometry tag -> count for a GeoJSON-shaped feature collection
#[wasm_bindgen]
pub fn classify_features(collection_json: &str) -> Result<JsValue, JsValue> {
    let collection = parse_feature_collection(collection_json)?;
    to_js(&classify(&collection))
}

/// `[{ type, length }]` rows, one per feature
#[wasm_bindgen]
pub fn compute_feature_details(collection_json: &str) -> Result<JsValue, JsValue> {
    let collection = parse_feature_collection(collection_json)?;
    to_js(&compute_details(&collection))
}

/// `[[south, west], [north, east]]`, or `undefined` when there is nothing to fit
#[wasm_bindgen]
pub fn compute_feature_bounds(collection_json: &str) -> Result<JsValue, JsValue> {
    let collection = parse_feature_collection(collection_json)?;
    match compute_bounds(&collection) {
        Some(bounds) => to_js(&bounds),
        None => Ok(JsValue::UNDEFINED),
    }
}

/// Length of one `{ type, coordinates }` geometry, rounded to two decimals.
/// `undefined` for kinds without a length or unreadable coordinates.
#[wasm_bindgen]
pub fn path_length(geometry_json: &str) -> Result<Option<f64>, JsValue> {
    let raw: geojson_features::RawGeometry = serde_json::from_str(geometry_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid geometry: {}", e)))?;
    Ok(geometry_length(&raw))
}

fn geometry_length(raw: &geojson_features::RawGeometry) -> Option<f64> {
    if !is_path_like(&raw.r#type) {
        return None;
    }
    let geometry = geojson_features::geometry_from_raw(raw).ok()?;
    normalize_lines(&geometry).map(|lines| compute_length(&lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> geojson_features::RawGeometry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn geometry_length_by_tag() {
        assert_eq!(
            geometry_length(&raw(r#"{"type": "LineString", "coordinates": [[0, 0], [3, 4]]}"#)),
            Some(5.0)
        );
        assert_eq!(
            geometry_length(&raw(
                r#"{"type": "MultiLineString", "coordinates": [[[0, 0], [1, 0]], [[0, 0], [0, 2]]]}"#
            )),
            Some(3.0)
        );
        assert_eq!(
            geometry_length(&raw(r#"{"type": "Point", "coordinates": [1, 1]}"#)),
            None
        );
        assert_eq!(
            geometry_length(&raw(r#"{"type": "LineString", "coordinates": [[0, 0]]}"#)),
            Some(0.0)
        );
        assert_eq!(
            geometry_length(&raw(r#"{"type": "LineString", "coordinates": 7}"#)),
            None
        );
    }

    #[test]
    fn pipeline_from_geojson_text() {
        let collection = parse_feature_collection(
            r#"{"features": [
                {"geometry": {"type": "Point", "coordinates": [1, 1]}},
                {"geometry": {"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 0]]]}}
            ]}"#,
        )
        .unwrap();

        let summary = classify(&collection);
        assert_eq!(summary.iter().collect::<Vec<_>>(), vec![("Point", 1), ("Polygon", 1)]);
        let labels: Vec<_> = compute_details(&collection)
            .iter()
            .map(|d| d.length_label())
            .collect();
        assert_eq!(labels, vec!["N/A", "N/A"]);

        let bounds = compute_bounds(&collection).unwrap();
        assert_eq!(bounds.south_west, LatLng { lat: 0.0, lng: 0.0 });
        assert_eq!(bounds.north_east, LatLng { lat: 2.0, lng: 2.0 });
    }

    #[test]
    fn empty_collection_pipeline() {
        let collection = parse_feature_collection(r#"{"features": []}"#).unwrap();
        assert!(classify(&collection).is_empty());
        assert!(compute_details(&collection).is_empty());
        assert!(compute_bounds(&collection).is_none());
    }
}
