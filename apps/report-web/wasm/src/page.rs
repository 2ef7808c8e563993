//! Page binding: event wiring around the view filter
//!
//! Every control event runs one synchronous pass: read controls, compute
//! visibility, write hidden classes, then (optionally) push the URL. The
//! shared state lives in an `Rc<RefCell<_>>` captured by the listeners;
//! the browser event loop guarantees passes never overlap.

use crate::controls::DomControls;
use crate::dom::{to_js, warn, DomReport};
use report_filter::{
    FilterConfig, FilterControls, FilterState, FoldState, UrlSync, ViewFilter, ViolationId,
    VisibilitySummary,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, Window};

/// Attribute on `<body>` that may carry a JSON [`FilterConfig`]
pub const CONFIG_ATTRIBUTE: &str = "data-filter-config";

struct PageState {
    config: FilterConfig,
    window: Window,
    report: DomReport,
    dom_controls: DomControls,
    controls: FilterControls,
    filter: ViewFilter,
    folds: FoldState,
    url_sync: Option<UrlSync>,
    counter: Option<Element>,
    summary: Option<VisibilitySummary>,
}

impl PageState {
    fn refresh(&mut self, push_history: bool) -> Result<VisibilitySummary, JsValue> {
        let search = self.dom_controls.read_into(&mut self.controls);
        let state = FilterState::new(&self.controls, &search);

        let visibility =
            self.filter
                .compute_visibility(self.report.snapshot(), &self.report, &state);
        self.report.apply(&visibility, &self.config.classes.hidden)?;

        let summary = visibility.summary();
        if let Some(counter) = &self.counter {
            counter.set_text_content(Some(&summary.visible_violations.to_string()));
        }
        self.summary = Some(summary);

        if push_history {
            self.push_url(&state)?;
        }
        Ok(summary)
    }

    fn push_url(&self, state: &FilterState) -> Result<(), JsValue> {
        let Some(sync) = &self.url_sync else {
            return Ok(());
        };
        let current = self.window.location().href()?;
        if let Some(next) = sync.next_entry(&current, state).map_err(to_js)? {
            self.window
                .history()?
                .push_state_with_url(&JsValue::NULL, "", Some(&next))?;
        }
        Ok(())
    }

    /// Load the control state encoded in the current URL into the page
    fn restore_from_location(&mut self) -> Result<(), JsValue> {
        let Some(sync) = &self.url_sync else {
            return Ok(());
        };
        let current = self.window.location().href()?;
        match sync.restore(&mut self.controls, &current) {
            Ok(search) => self.dom_controls.write_from(&self.controls, &search),
            Err(e) => {
                warn(&format!("ignoring filter state in URL: {}", e));
                Ok(())
            }
        }
    }

    fn unfold(&mut self, violation: ViolationId, list: &Element) -> Result<(), JsValue> {
        if self.folds.unfold(violation) {
            list.class_list().remove_1(&self.config.classes.folded)?;
        }
        Ok(())
    }
}

fn report_error(err: JsValue) {
    web_sys::console::error_1(&err);
}

fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // listeners live as long as the page
    closure.forget();
    Ok(())
}

fn config_from_body(document: &Document) -> Result<FilterConfig, JsValue> {
    let attribute = document
        .body()
        .and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE));
    match attribute {
        Some(json) => parse_config(&json),
        None => Ok(FilterConfig::default()),
    }
}

fn parse_config(json: &str) -> Result<FilterConfig, JsValue> {
    FilterConfig::from_json(json).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

/// Live filter attached to the current report page
#[wasm_bindgen]
pub struct ReportPage {
    state: Rc<RefCell<PageState>>,
}

#[wasm_bindgen]
impl ReportPage {
    /// Scan the document, restore state from the URL and wire all controls
    ///
    /// `config_json` overrides the `data-filter-config` attribute on `<body>`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ReportPage, JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object available"))?;

        let config = match config_json {
            Some(json) => parse_config(&json)?,
            None => config_from_body(&document)?,
        };

        let report = DomReport::scan(&document, &config)?;
        let fields = report.snapshot().field_values();
        let dom_controls = DomControls::scan(&document, &config, &fields)?;
        let mut controls = dom_controls.model(&config);
        dom_controls.read_into(&mut controls);

        let counter = match &config.selectors.counter {
            Some(selector) => document.query_selector(selector)?,
            None => None,
        };

        let state = PageState {
            folds: FoldState::from_snapshot(report.snapshot()),
            url_sync: config.sync_url.then(|| UrlSync::from_config(&config)),
            config,
            window,
            report,
            dom_controls,
            controls,
            filter: ViewFilter::new(),
            counter,
            summary: None,
        };

        let page = ReportPage {
            state: Rc::new(RefCell::new(state)),
        };
        page.initialize()?;
        page.attach()?;
        Ok(page)
    }

    /// Recompute visibility from the current controls
    ///
    /// Returns the visibility summary as a plain object.
    pub fn refresh(&self) -> Result<JsValue, JsValue> {
        let summary = self.state.borrow_mut().refresh(true)?;
        serde_wasm_bindgen::to_value(&summary)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Summary of the last pass, or null before the first one
    #[wasm_bindgen(js_name = getSummary)]
    pub fn get_summary(&self) -> Result<JsValue, JsValue> {
        match self.state.borrow().summary {
            Some(summary) => serde_wasm_bindgen::to_value(&summary)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e))),
            None => Ok(JsValue::NULL),
        }
    }

    /// Scanned report structure as JSON (for debugging generator output)
    #[wasm_bindgen(js_name = getSnapshotJson)]
    pub fn get_snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.state.borrow().report.snapshot())
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize snapshot: {}", e)))
    }

    #[wasm_bindgen(js_name = foldedCount)]
    pub fn folded_count(&self) -> usize {
        self.state.borrow().folds.folded_count()
    }
}

impl ReportPage {
    fn initialize(&self) -> Result<(), JsValue> {
        let mut state = self.state.borrow_mut();
        let has_query = !state.window.location().search()?.is_empty();
        if has_query {
            state.restore_from_location()?;
        }
        state.refresh(false)?;
        Ok(())
    }

    fn attach(&self) -> Result<(), JsValue> {
        let state = self.state.borrow();

        if let Some(input) = state.dom_controls.search_input() {
            let shared = Rc::clone(&self.state);
            listen(input, "input", move |_| {
                if let Err(e) = shared.borrow_mut().refresh(true) {
                    report_error(e);
                }
            })?;
        }

        for select in state.dom_controls.selects() {
            let shared = Rc::clone(&self.state);
            listen(select, "change", move |_| {
                if let Err(e) = shared.borrow_mut().refresh(true) {
                    report_error(e);
                }
            })?;
        }

        for button in state.dom_controls.buttons() {
            let shared = Rc::clone(&self.state);
            let element = button.element.clone();
            let pressed_class = state.config.classes.pressed.clone();
            listen(&button.element, "click", move |event| {
                event.prevent_default();
                let toggled = element.class_list().toggle(&pressed_class);
                let result = toggled.and_then(|_| shared.borrow_mut().refresh(true));
                if let Err(e) = result {
                    report_error(e);
                }
            })?;
        }

        for (violation, list) in state.report.instance_lists() {
            let unfolders = list.query_selector_all(&state.config.selectors.unfolder)?;
            for link in crate::dom::elements(&unfolders) {
                let shared = Rc::clone(&self.state);
                let list = list.clone();
                listen(&link, "click", move |event| {
                    event.prevent_default();
                    if let Err(e) = shared.borrow_mut().unfold(violation, &list) {
                        report_error(e);
                    }
                })?;
            }
        }

        if state.url_sync.is_some() {
            let shared = Rc::clone(&self.state);
            listen(&state.window, "popstate", move |_| {
                let mut state = shared.borrow_mut();
                if let Err(e) = state.restore_from_location() {
                    report_error(e);
                }
                if let Err(e) = state.refresh(false) {
                    report_error(e);
                }
            })?;
        }

        Ok(())
    }
}
