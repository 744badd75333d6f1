use crate::bounds::compute_bounds;
use crate::cancellation::{LoadSequencer, LoadToken};
use crate::classify::{classify, compute_details};
use crate::console_log;
use crate::error::ImportError;
use crate::kml_import::import_kml;
use crate::models::{DetailRecord, FeatureCollection, SummaryCounts, ViewportBounds};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Summary,
    Detailed,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Summary => "summary",
            ViewMode::Detailed => "detailed",
        }
    }
}

/// Everything the page shows for the one loaded document.
///
/// The summary is computed as soon as a document is applied; details only
/// when the detailed view is requested.
#[derive(Debug, Default)]
pub struct ViewerState {
    collection: Option<FeatureCollection>,
    summary: SummaryCounts,
    details: Option<Vec<DetailRecord>>,
    mode: ViewMode,
    last_error: Option<String>,
    loads: LoadSequencer,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a read; any read started earlier loses the right to apply.
    pub fn begin_load(&mut self) -> LoadToken {
        self.loads.begin()
    }

    /// Import `text` if `token` is still the latest read.
    ///
    /// Returns `Ok(false)` for a superseded read and leaves the state as is.
    /// A document that fails to import clears the current one and keeps the
    /// error for display.
    pub fn apply_document(&mut self, token: &LoadToken, text: &str) -> Result<bool, ImportError> {
        if let Err(reason) = token.throw_if_cancelled() {
            console_log!("{}", reason);
            return Ok(false);
        }
        if !self.loads.is_current(token) {
            return Ok(false);
        }

        match import_kml(text) {
            Ok(collection) => {
                self.set_collection(collection);
                Ok(true)
            }
            Err(err) => {
                console_log!("Failed to import document: {}", err);
                self.show_failure(err.to_string());
                Err(err)
            }
        }
    }

    /// Record a read that failed before any text arrived.
    ///
    /// Only the latest read may replace what is shown; returns whether the
    /// failure was recorded.
    pub fn fail_load(&mut self, token: &LoadToken, message: &str) -> bool {
        if !self.loads.is_current(token) {
            return false;
        }
        console_log!("Failed to read document: {}", message);
        self.show_failure(message.to_string());
        true
    }

    fn show_failure(&mut self, message: String) {
        self.collection = None;
        self.summary = SummaryCounts::default();
        self.details = None;
        self.mode = ViewMode::Summary;
        self.last_error = Some(message);
    }

    /// Replace the current document wholesale
    pub fn set_collection(&mut self, collection: FeatureCollection) {
        self.summary = classify(&collection);
        console_log!(
            "Loaded {} features of {} geometry types",
            collection.len(),
            self.summary.iter().count()
        );
        self.collection = Some(collection);
        self.details = None;
        self.mode = ViewMode::Summary;
        self.last_error = None;
    }

    pub fn show_summary(&mut self) {
        self.mode = ViewMode::Summary;
        self.details = None;
    }

    /// Switch to the detailed view, computing rows for the current document.
    /// Does nothing while no document is loaded.
    pub fn show_details(&mut self) {
        let Some(collection) = self.collection.as_ref() else {
            return;
        };
        self.details = Some(compute_details(collection));
        self.mode = ViewMode::Detailed;
    }

    /// Drop the document and forget any read still in flight
    pub fn clear(&mut self) {
        self.loads.cancel_all();
        self.collection = None;
        self.summary = SummaryCounts::default();
        self.details = None;
        self.mode = ViewMode::Summary;
        self.last_error = None;
    }

    pub fn collection(&self) -> Option<&FeatureCollection> {
        self.collection.as_ref()
    }

    pub fn summary(&self) -> &SummaryCounts {
        &self.summary
    }

    pub fn details(&self) -> Option<&[DetailRecord]> {
        self.details.as_deref()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn bounds(&self) -> Option<ViewportBounds> {
        self.collection.as_ref().and_then(compute_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE: &str = r#"<kml><Document>
        <Placemark><LineString><coordinates>0,0 3,4</coordinates></LineString></Placemark>
        <Placemark><Point><coordinates>1,1</coordinates></Point></Placemark>
    </Document></kml>"#;

    const PIN: &str = r#"<kml><Placemark><Point><coordinates>10,20</coordinates></Point></Placemark></kml>"#;

    #[test]
    fn applying_a_document_computes_the_summary() {
        let mut state = ViewerState::new();
        let token = state.begin_load();
        assert!(state.apply_document(&token, ROUTE).unwrap());

        assert_eq!(state.summary().get("LineString"), Some(1));
        assert_eq!(state.summary().get("Point"), Some(1));
        assert_eq!(state.mode(), ViewMode::Summary);
        assert!(state.details().is_none());

        let bounds = state.bounds().unwrap();
        assert_eq!(bounds.north_east.lat, 4.0);
        assert_eq!(bounds.north_east.lng, 3.0);
    }

    #[test]
    fn details_are_computed_on_request() {
        let mut state = ViewerState::new();
        let token = state.begin_load();
        state.apply_document(&token, ROUTE).unwrap();

        state.show_details();
        assert_eq!(state.mode(), ViewMode::Detailed);
        let labels: Vec<_> = state
            .details()
            .unwrap()
            .iter()
            .map(|d| d.length_label())
            .collect();
        assert_eq!(labels, vec!["5.00", "N/A"]);

        state.show_summary();
        assert_eq!(state.mode(), ViewMode::Summary);
        assert!(state.details().is_none());
    }

    #[test]
    fn details_without_a_document_is_a_no_op() {
        let mut state = ViewerState::new();
        state.show_details();
        assert_eq!(state.mode(), ViewMode::Summary);
        assert!(state.details().is_none());
    }

    #[test]
    fn stale_read_does_not_overwrite_newer_document() {
        let mut state = ViewerState::new();
        let slow = state.begin_load();
        let fast = state.begin_load();

        assert!(state.apply_document(&fast, PIN).unwrap());
        assert!(!state.apply_document(&slow, ROUTE).unwrap());

        assert_eq!(state.collection().unwrap().len(), 1);
        assert_eq!(state.summary().get("LineString"), None);
    }

    #[test]
    fn new_document_replaces_old_one() {
        let mut state = ViewerState::new();
        let first = state.begin_load();
        state.apply_document(&first, ROUTE).unwrap();
        state.show_details();

        let second = state.begin_load();
        state.apply_document(&second, PIN).unwrap();
        assert_eq!(state.summary().iter().collect::<Vec<_>>(), vec![("Point", 1)]);
        assert!(state.details().is_none());
        assert_eq!(state.mode(), ViewMode::Summary);
    }

    #[test]
    fn failed_import_shows_nothing() {
        let mut state = ViewerState::new();
        let first = state.begin_load();
        state.apply_document(&first, ROUTE).unwrap();

        let broken = state.begin_load();
        assert!(state.apply_document(&broken, "<kml><Placemark></kml>").is_err());
        assert!(state.collection().is_none());
        assert!(state.summary().is_empty());
        assert!(state.bounds().is_none());
        assert!(state.last_error().is_some());
    }

    #[test]
    fn failed_read_of_latest_file_is_shown() {
        let mut state = ViewerState::new();
        let first = state.begin_load();
        state.apply_document(&first, ROUTE).unwrap();

        let unreadable = state.begin_load();
        assert!(state.fail_load(&unreadable, "NotReadableError"));
        assert!(state.collection().is_none());
        assert!(state.summary().is_empty());
        assert_eq!(state.last_error(), Some("NotReadableError"));
    }

    #[test]
    fn failed_read_of_superseded_file_is_ignored() {
        let mut state = ViewerState::new();
        let slow = state.begin_load();
        let fast = state.begin_load();
        state.apply_document(&fast, PIN).unwrap();

        assert!(!state.fail_load(&slow, "NotReadableError"));
        assert_eq!(state.collection().unwrap().len(), 1);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn empty_document_is_a_valid_state() {
        let mut state = ViewerState::new();
        let token = state.begin_load();
        assert!(state.apply_document(&token, "<kml><Document/></kml>").unwrap());
        assert!(state.summary().is_empty());
        assert!(state.bounds().is_none());
        state.show_details();
        assert_eq!(state.details(), Some(&[][..]));
    }

    #[test]
    fn clear_drops_pending_reads() {
        let mut state = ViewerState::new();
        let token = state.begin_load();
        state.clear();
        assert!(!state.apply_document(&token, PIN).unwrap());
        assert!(state.collection().is_none());
    }
}
