//! Browser tests for the exported JS surface, run with `wasm-pack test`.
#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Object, Reflect};
use kmlview_core_wasm::{
    classify_features, compute_feature_bounds, compute_feature_details, import_kml_document,
    path_length, KmlViewer,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const ROUTE: &str = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
    <Placemark><name>Walk</name><LineString><coordinates>0,0 3,4</coordinates></LineString></Placemark>
    <Placemark><Point><coordinates>1,1</coordinates></Point></Placemark>
</Document></kml>"#;

fn get(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn summary_is_a_plain_object_in_first_seen_order() {
    let summary = classify_features(
        r#"{"features": [
            {"geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
            {"geometry": {"type": "Point", "coordinates": [1, 1]}},
            {"geometry": {"type": "Polygon", "coordinates": []}}
        ]}"#,
    )
    .unwrap();

    let keys: Vec<String> = Object::keys(&Object::from(summary.clone()))
        .iter()
        .filter_map(|k| k.as_string())
        .collect();
    assert_eq!(keys, vec!["Polygon", "Point"]);
    assert_eq!(get(&summary, "Polygon").as_f64(), Some(2.0));
}

#[wasm_bindgen_test]
fn details_rows_carry_length_labels() {
    let details = compute_feature_details(
        r#"{"features": [{"geometry": {"type": "LineString", "coordinates": [[0, 0], [3, 4]]}}]}"#,
    )
    .unwrap();
    let rows = Array::from(&details);
    assert_eq!(rows.length(), 1);
    assert_eq!(get(&rows.get(0), "type").as_string().as_deref(), Some("LineString"));
    assert_eq!(get(&rows.get(0), "length").as_string().as_deref(), Some("5.00"));
}

#[wasm_bindgen_test]
fn bounds_of_nothing_are_undefined() {
    assert!(compute_feature_bounds(r#"{"features": []}"#)
        .unwrap()
        .is_undefined());

    let bounds = compute_feature_bounds(
        r#"{"features": [{"geometry": {"type": "Point", "coordinates": [10, 20]}}]}"#,
    )
    .unwrap();
    let corners = Array::from(&bounds);
    let south_west = Array::from(&corners.get(0));
    assert_eq!(south_west.get(0).as_f64(), Some(20.0));
    assert_eq!(south_west.get(1).as_f64(), Some(10.0));
}

#[wasm_bindgen_test]
fn path_length_of_raw_geometries() {
    assert_eq!(
        path_length(r#"{"type": "MultiLineString", "coordinates": [[[0, 0], [1, 0]], [[0, 0], [0, 2]]]}"#)
            .unwrap(),
        Some(3.0)
    );
    assert_eq!(path_length(r#"{"type": "Point", "coordinates": [1, 1]}"#).unwrap(), None);
    assert!(path_length("{").is_err());
}

#[wasm_bindgen_test]
fn imported_kml_is_geojson() {
    let geojson = import_kml_document(ROUTE).unwrap();
    assert_eq!(get(&geojson, "type").as_string().as_deref(), Some("FeatureCollection"));
    let features = Array::from(&get(&geojson, "features"));
    assert_eq!(features.length(), 2);
    let first = features.get(0);
    assert_eq!(
        get(&get(&first, "properties"), "name").as_string().as_deref(),
        Some("Walk")
    );
    assert!(import_kml_document("<svg/>").is_err());
}

#[wasm_bindgen_test]
fn viewer_switches_views() {
    let viewer = KmlViewer::new();
    assert!(!viewer.has_document());
    assert!(viewer.load_text(ROUTE).unwrap());
    assert_eq!(viewer.view_mode(), "summary");
    assert!(viewer.details().unwrap().is_undefined());

    viewer.show_details();
    assert_eq!(viewer.view_mode(), "detailed");
    assert_eq!(Array::from(&viewer.details().unwrap()).length(), 2);

    viewer.show_summary();
    assert!(viewer.details().unwrap().is_undefined());
    assert!(!viewer.bounds().unwrap().is_undefined());
    assert!(!viewer.feature_collection().unwrap().is_undefined());
}

#[wasm_bindgen_test]
fn viewer_keeps_failure_visible() {
    let viewer = KmlViewer::new();
    assert!(viewer.load_text("<kml><Placemark></kml>").is_err());
    assert!(!viewer.has_document());
    assert!(viewer.last_error().is_some());
    assert!(viewer.bounds().unwrap().is_undefined());
}

#[wasm_bindgen_test]
async fn loading_without_a_file_is_a_no_op() {
    let viewer = KmlViewer::new();
    let applied = JsFuture::from(viewer.load_file(None)).await.unwrap();
    assert_eq!(applied.as_bool(), Some(false));
    assert!(!viewer.has_document());
}
