//! WASM bindings for the violation report page
//!
//! Filtering, search, folding and URL state live in `report-filter`; this
//! crate only scans the rendered report, reads and writes the header
//! controls, and wires browser events.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { ReportPage } from './pkg/report_web_wasm.js';
//!
//! await init();
//!
//! // Uses <body data-filter-config="..."> if present, defaults otherwise
//! const page = new ReportPage();
//! console.log(page.getSummary()); // { visible_violations: 12, ... }
//! ```

pub mod controls;
pub mod dom;
pub mod page;

use wasm_bindgen::prelude::*;

pub use controls::DomControls;
pub use dom::DomReport;
pub use page::{ReportPage, CONFIG_ATTRIBUTE};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Attach a filter to the current page using the configuration on `<body>`
#[wasm_bindgen(js_name = attachReportFilter)]
pub fn attach_report_filter() -> Result<ReportPage, JsValue> {
    ReportPage::new(None)
}

/// Lowercased search terms as the filter sees them (for UI hints)
#[wasm_bindgen(js_name = parseSearchTerms)]
pub fn parse_search_terms(input: &str) -> Vec<String> {
    report_filter::SearchTerms::parse(input).terms().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_parse_search_terms() {
        assert_eq!(parse_search_terms("  Null  Pointer "), vec!["null", "pointer"]);
        assert!(parse_search_terms("   ").is_empty());
    }
}
