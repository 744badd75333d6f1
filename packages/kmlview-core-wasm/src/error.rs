//! Error types for importing documents into a feature collection.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures that stop a whole document from being imported.
///
/// Per-feature problems (bad coordinates, unknown geometry tags) never end
/// up here; they degrade the single affected feature instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The KML text is not well-formed XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formed XML without a `<kml>` root element
    #[error("Not a KML document: {0}")]
    NotKml(String),

    /// The text ended while elements were still open
    #[error("Unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    /// The feature collection JSON could not be read
    #[error("Invalid feature collection: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why one feature's coordinate data could not be turned into a geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("unsupported geometry type '{0}'")]
    UnsupportedType(String),

    #[error("expected {expected} for {geometry_type}")]
    WrongNesting {
        geometry_type: String,
        expected: &'static str,
    },

    #[error("position needs at least two numeric components")]
    BadPosition,
}

impl From<ImportError> for JsValue {
    fn from(err: ImportError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Result type for import operations
pub type Result<T> = std::result::Result<T, ImportError>;
