use geo::BoundingRect;
use geo_types::{coord, Rect};

use crate::models::{FeatureCollection, LatLng, ViewportBounds};

/// Box around every coordinate of every feature, as (lat, lng) corners.
///
/// Returns `None` when the collection holds no coordinate at all.
pub fn compute_bounds(collection: &FeatureCollection) -> Option<ViewportBounds> {
    let rect = collection
        .features
        .iter()
        .filter_map(|feature| feature.geometry.as_ref()?.bounding_rect())
        .reduce(merge_rects)?;

    // Features keep (lng, lat); the map widget wants (lat, lng)
    Some(ViewportBounds {
        south_west: LatLng {
            lat: rect.min().y,
            lng: rect.min().x,
        },
        north_east: LatLng {
            lat: rect.max().y,
            lng: rect.max().x,
        },
    })
}

fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}
