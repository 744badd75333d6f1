use geo_types::{Geometry, LineString, MultiLineString};

/// Path-like geometries as a uniform collection of lines.
///
/// A single LineString becomes a one-line collection, a MultiLineString is
/// used as is. Every other kind has no length and yields `None`.
pub fn normalize_lines(geometry: &Geometry<f64>) -> Option<MultiLineString<f64>> {
    match geometry {
        Geometry::LineString(line) => Some(MultiLineString::new(vec![line.clone()])),
        Geometry::Line(line) => Some(MultiLineString::new(vec![LineString::from(vec![
            line.start, line.end,
        ])])),
        Geometry::MultiLineString(lines) => Some(lines.clone()),
        _ => None,
    }
}

/// Planar length of one line: sum of the straight segments between
/// consecutive points, (lng, lat) read as (x, y).
pub fn line_length(line: &LineString<f64>) -> f64 {
    line.lines().map(|segment| segment.dx().hypot(segment.dy())).sum()
}

/// Total length over every line of the collection, rounded to two decimals.
pub fn compute_length(lines: &MultiLineString<f64>) -> f64 {
    let total: f64 = lines.0.iter().map(line_length).sum();
    round_to_hundredths(total)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
