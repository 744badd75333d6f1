use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::console_log;
use crate::geojson_features::feature_collection_to_geojson;
use crate::to_js;
use crate::viewer_state::ViewerState;

/// Application state for the viewer page, one instance per page.
///
/// File reads are asynchronous; each read takes a load token when it
/// starts, so when two files are picked in quick succession only the later
/// one ends up displayed.
#[wasm_bindgen]
pub struct KmlViewer {
    state: Rc<RefCell<ViewerState>>,
}

impl Default for KmlViewer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl KmlViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> KmlViewer {
        KmlViewer {
            state: Rc::new(RefCell::new(ViewerState::new())),
        }
    }

    /// Read and apply a picked file. Resolves to `true` when the document
    /// was applied, `false` when no file was given or a newer read won.
    #[wasm_bindgen(js_name = loadFile)]
    pub fn load_file(&self, file: Option<web_sys::File>) -> js_sys::Promise {
        let Some(file) = file else {
            return js_sys::Promise::resolve(&JsValue::FALSE);
        };

        let state = Rc::clone(&self.state);
        let token = state.borrow_mut().begin_load();
        console_log!("Reading {} ({} bytes), load {}", file.name(), file.size(), token.id);

        future_to_promise(async move {
            let content = JsFuture::from(file.text()).await;
            // The borrow starts after the await, never across it
            let text = match content.map(|value| value.as_string()) {
                Ok(Some(text)) => text,
                Ok(None) => {
                    state
                        .borrow_mut()
                        .fail_load(&token, "File content is not text");
                    return Err(JsValue::from_str("File content is not text"));
                }
                Err(err) => {
                    let message = err
                        .as_string()
                        .unwrap_or_else(|| format!("Failed to read {}", file.name()));
                    state.borrow_mut().fail_load(&token, &message);
                    return Err(err);
                }
            };
            let applied = state.borrow_mut().apply_document(&token, &text)?;
            Ok(JsValue::from_bool(applied))
        })
    }

    /// Apply KML text that is already in memory
    #[wasm_bindgen(js_name = loadText)]
    pub fn load_text(&self, text: &str) -> Result<bool, JsValue> {
        let mut state = self.state.borrow_mut();
        let token = state.begin_load();
        Ok(state.apply_document(&token, text)?)
    }

    #[wasm_bindgen(js_name = showSummary)]
    pub fn show_summary(&self) {
        self.state.borrow_mut().show_summary();
    }

    #[wasm_bindgen(js_name = showDetails)]
    pub fn show_details(&self) {
        self.state.borrow_mut().show_details();
    }

    pub fn clear(&self) {
        self.state.borrow_mut().clear();
    }

    #[wasm_bindgen(js_name = hasDocument)]
    pub fn has_document(&self) -> bool {
        self.state.borrow().collection().is_some()
    }

    #[wasm_bindgen(js_name = viewMode)]
    pub fn view_mode(&self) -> String {
        self.state.borrow().mode().as_str().to_string()
    }

    #[wasm_bindgen(js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error().map(str::to_string)
    }

    /// Geometry tag -> count for the loaded document
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(self.state.borrow().summary())
    }

    /// Detail rows, or `undefined` while the summary view is active
    pub fn details(&self) -> Result<JsValue, JsValue> {
        match self.state.borrow().details() {
            Some(details) => to_js(&details),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// `[[south, west], [north, east]]`, or `undefined` with nothing to fit
    pub fn bounds(&self) -> Result<JsValue, JsValue> {
        match self.state.borrow().bounds() {
            Some(bounds) => to_js(&bounds),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// GeoJSON of the loaded document for the map layer
    #[wasm_bindgen(js_name = featureCollection)]
    pub fn feature_collection(&self) -> Result<JsValue, JsValue> {
        match self.state.borrow().collection() {
            Some(collection) => to_js(&feature_collection_to_geojson(collection)),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}
