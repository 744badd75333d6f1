/*!
Reads KML text into a [`FeatureCollection`].

Every `Placemark` becomes one feature, in document order, whatever
`Document`/`Folder` nesting surrounds it. Elements are matched on their
local name, so `kml:Placemark` and `gx:Track` are recognised without any
namespace resolution. Styles, icons and schema data are not read.
 */
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::console_log;
use crate::error::{ImportError, Result};
use crate::models::{Feature, FeatureCollection, FeatureProperties};

/// Parse a whole KML document.
///
/// Fails only when the text is not well-formed XML or is not rooted at a
/// `<kml>` element. Bad coordinate tuples are dropped, Placemarks without
/// geometry are skipped.
pub fn import_kml(text: &str) -> Result<FeatureCollection> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut builder = KmlBuilder::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                builder.open(name)?;
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                builder.open(name)?;
                builder.close();
            }
            Event::End(_) => builder.close(),
            // Text outside the captured elements is never unescaped
            Event::Text(e) if builder.capturing() => match e.unescape() {
                Ok(content) => builder.text(&content),
                Err(err) => {
                    console_log!("Keeping raw text after escape error: {}", err);
                    builder.text(&String::from_utf8_lossy(&e));
                }
            },
            Event::CData(e) => builder.text(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => break,
            _ => {}
        }
    }

    builder.finish()
}

// Geometry under construction that spans several elements
enum Frame {
    Multi(Vec<Geometry<f64>>),
    Polygon {
        outer: Option<LineString<f64>>,
        inner: Vec<LineString<f64>>,
    },
    Track(Vec<Coord<f64>>),
}

#[derive(Default)]
struct Placemark {
    properties: FeatureProperties,
    geometries: Vec<Geometry<f64>>,
}

#[derive(Default)]
struct KmlBuilder {
    // Local names of the currently open elements, root first
    path: Vec<String>,
    seen_root: bool,
    placemark: Option<Placemark>,
    frames: Vec<Frame>,
    coords: Vec<Coord<f64>>,
    text: String,
    features: Vec<Feature>,
}

impl KmlBuilder {
    fn open(&mut self, name: String) -> Result<()> {
        if !self.seen_root {
            if name != "kml" {
                return Err(ImportError::NotKml(format!("root element is <{}>", name)));
            }
            self.seen_root = true;
        }

        match name.as_str() {
            "Placemark" => {
                self.placemark = Some(Placemark::default());
                self.frames.clear();
            }
            "MultiGeometry" if self.placemark.is_some() => self.frames.push(Frame::Multi(Vec::new())),
            "Polygon" if self.placemark.is_some() => self.frames.push(Frame::Polygon {
                outer: None,
                inner: Vec::new(),
            }),
            "Track" if self.placemark.is_some() => self.frames.push(Frame::Track(Vec::new())),
            "Point" | "LineString" | "LinearRing" => self.coords.clear(),
            "coordinates" | "coord" | "name" | "description" => self.text.clear(),
            _ => {}
        }

        self.path.push(name);
        Ok(())
    }

    fn capturing(&self) -> bool {
        matches!(
            self.path.last().map(String::as_str),
            Some("coordinates" | "coord" | "name" | "description")
        )
    }

    fn text(&mut self, content: &str) {
        if self.capturing() {
            self.text.push_str(content);
        }
    }

    fn close(&mut self) {
        let Some(name) = self.path.last().cloned() else {
            return;
        };
        let parent = self.path.iter().rev().nth(1).cloned().unwrap_or_default();

        if self.placemark.is_some() {
            self.close_in_placemark(&name, &parent);
        }
        self.path.pop();
    }

    fn close_in_placemark(&mut self, name: &str, parent: &str) {
        match name {
            "coordinates" => self.coords = parse_coordinates(&self.text),
            "coord" => {
                if let (Some(Frame::Track(points)), Some(point)) =
                    (self.frames.last_mut(), parse_track_coord(&self.text))
                {
                    points.push(point);
                }
            }
            "name" | "description" if parent == "Placemark" => {
                let value = Some(self.text.trim().to_string());
                if let Some(placemark) = self.placemark.as_mut() {
                    if name == "name" {
                        placemark.properties.name = value;
                    } else {
                        placemark.properties.description = value;
                    }
                }
            }
            "Point" => match self.coords.first().copied() {
                Some(coord) => self.emit(Geometry::Point(Point(coord))),
                None => console_log!("Skipping Point without coordinates"),
            },
            "LineString" => {
                let line = LineString::new(std::mem::take(&mut self.coords));
                self.emit(Geometry::LineString(line));
            }
            "LinearRing" => {
                let ring = LineString::new(std::mem::take(&mut self.coords));
                match self.frames.last_mut() {
                    Some(Frame::Polygon { inner, .. }) if parent == "innerBoundaryIs" => {
                        inner.push(ring)
                    }
                    Some(Frame::Polygon { outer, .. }) => *outer = Some(ring),
                    _ => self.emit(Geometry::LineString(ring)),
                }
            }
            "Polygon" => {
                if let Some(Frame::Polygon { outer, inner }) = self.pop_frame(name) {
                    let exterior = outer.unwrap_or_else(|| LineString::new(Vec::new()));
                    self.emit(Geometry::Polygon(Polygon::new(exterior, inner)));
                }
            }
            "Track" => {
                if let Some(Frame::Track(points)) = self.pop_frame(name) {
                    self.emit(Geometry::LineString(LineString::new(points)));
                }
            }
            "MultiGeometry" => {
                if let Some(Frame::Multi(children)) = self.pop_frame(name) {
                    match self.frames.last_mut() {
                        // Nested MultiGeometry flattens into its parent
                        Some(Frame::Multi(siblings)) => siblings.extend(children),
                        _ if children.is_empty() => console_log!("Skipping empty MultiGeometry"),
                        _ => self.emit(fold_geometries(children)),
                    }
                }
            }
            "Placemark" => self.finish_placemark(),
            _ => {}
        }
    }

    fn pop_frame(&mut self, name: &str) -> Option<Frame> {
        let frame = self.frames.pop();
        if frame.is_none() {
            console_log!("Closing <{}> without an open geometry", name);
        }
        frame
    }

    // Attach a finished geometry to the innermost open container
    fn emit(&mut self, geometry: Geometry<f64>) {
        match self.frames.last_mut() {
            Some(Frame::Multi(children)) => children.push(geometry),
            _ => {
                if let Some(placemark) = self.placemark.as_mut() {
                    placemark.geometries.push(geometry);
                }
            }
        }
    }

    fn finish_placemark(&mut self) {
        let Some(mut placemark) = self.placemark.take() else {
            return;
        };
        self.frames.clear();

        let geometry = match placemark.geometries.len() {
            0 => {
                console_log!(
                    "Skipping Placemark {:?} without geometry",
                    placemark.properties.name.as_deref().unwrap_or("")
                );
                return;
            }
            1 => placemark.geometries.remove(0),
            _ => fold_geometries(placemark.geometries),
        };
        self.features
            .push(Feature::new(geometry).with_properties(placemark.properties));
    }

    fn finish(self) -> Result<FeatureCollection> {
        if let Some(open) = self.path.last() {
            return Err(ImportError::UnexpectedEof(open.clone()));
        }
        if !self.seen_root {
            return Err(ImportError::NotKml("document has no root element".to_string()));
        }
        Ok(FeatureCollection::new(self.features))
    }
}

/// Children of one kind fold into the matching Multi- geometry, mixed
/// kinds into a GeometryCollection.
///
/// togeojson keeps every multi-part Placemark as a GeometryCollection, so
/// a two-segment track it reports as "GeometryCollection" (length N/A)
/// comes out here as "MultiLineString" with a length.
fn fold_geometries(children: Vec<Geometry<f64>>) -> Geometry<f64> {
    if children.iter().all(|g| matches!(g, Geometry::Point(_))) {
        let points = children
            .into_iter()
            .filter_map(|g| Point::try_from(g).ok())
            .collect::<Vec<_>>();
        return Geometry::MultiPoint(MultiPoint(points));
    }
    if children.iter().all(|g| matches!(g, Geometry::LineString(_))) {
        let lines = children
            .into_iter()
            .filter_map(|g| LineString::try_from(g).ok())
            .collect();
        return Geometry::MultiLineString(MultiLineString::new(lines));
    }
    if children.iter().all(|g| matches!(g, Geometry::Polygon(_))) {
        let polygons = children
            .into_iter()
            .filter_map(|g| Polygon::try_from(g).ok())
            .collect();
        return Geometry::MultiPolygon(MultiPolygon::new(polygons));
    }
    Geometry::GeometryCollection(GeometryCollection::new_from(children))
}

/// `lng,lat[,alt]` tuples separated by whitespace; spaces around commas
/// are tolerated and altitude is ignored.
fn parse_coordinates(text: &str) -> Vec<Coord<f64>> {
    let compact = text.split(',').map(str::trim).collect::<Vec<_>>().join(",");
    compact
        .split_whitespace()
        .filter_map(|tuple| {
            let coord = parse_position(tuple.split(','));
            if coord.is_none() {
                console_log!("Dropping coordinate tuple '{}'", tuple);
            }
            coord
        })
        .collect()
}

// gx:coord is "lng lat alt" separated by spaces
fn parse_track_coord(text: &str) -> Option<Coord<f64>> {
    parse_position(text.split_whitespace())
}

fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Option<Coord<f64>> {
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    // `parse` also accepts "nan" and "inf"
    if !(x.is_finite() && y.is_finite()) {
        return None;
    }
    Some(Coord { x, y })
}
