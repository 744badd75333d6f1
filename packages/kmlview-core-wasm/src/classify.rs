use crate::length::{compute_length, normalize_lines};
use crate::models::{DetailRecord, Feature, FeatureCollection, SummaryCounts};

/// Geometry tags that carry a length
pub const PATH_LIKE_TYPES: [&str; 2] = ["LineString", "MultiLineString"];

pub fn is_path_like(geometry_type: &str) -> bool {
    PATH_LIKE_TYPES.contains(&geometry_type)
}

/// Count features per geometry tag.
pub fn classify(collection: &FeatureCollection) -> SummaryCounts {
    let mut counts = SummaryCounts::default();
    for feature in &collection.features {
        counts.increment(&feature.geometry_type);
    }
    counts
}

/// One detail row per feature, in feature order.
pub fn compute_details(collection: &FeatureCollection) -> Vec<DetailRecord> {
    collection.features.iter().map(detail_record).collect()
}

fn detail_record(feature: &Feature) -> DetailRecord {
    DetailRecord {
        geometry_type: feature.geometry_type.clone(),
        length: feature_length(feature),
    }
}

// Malformed coordinates or a tag/shape mismatch both read as not applicable
fn feature_length(feature: &Feature) -> Option<f64> {
    if !is_path_like(&feature.geometry_type) {
        return None;
    }
    let lines = normalize_lines(feature.geometry.as_ref()?)?;
    Some(compute_length(&lines))
}
