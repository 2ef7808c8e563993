//! Report markup scanning
//!
//! Walks the rendered report once, building a [`ReportSnapshot`] and keeping
//! the element behind every node so visibility can be written back.

use report_filter::{
    first_line, DetailsSource, FilterConfig, FilterError, ReportSnapshot, SnapshotBuilder,
    ViolationId, Visibility,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, NodeList};

/// Element nodes of a query result
pub(crate) fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

pub(crate) fn to_js(err: FilterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Classification attributes of an element: `data-layer="app"` -> ("layer", "app")
pub(crate) fn classification(element: &Element, config: &FilterConfig) -> Vec<(String, String)> {
    let names: js_sys::Array = element.get_attribute_names();
    names
        .iter()
        .filter_map(|name| name.as_string())
        .filter_map(|name| {
            let field = config.field_for_attribute(&name)?.to_string();
            let value = element.get_attribute(&name)?;
            Some((field, value))
        })
        .collect()
}

struct ViolationElements {
    item: Element,
    details: Option<Element>,
    instance_list: Option<Element>,
}

/// A scanned report: the snapshot plus the element behind each node
pub struct DomReport {
    snapshot: ReportSnapshot,
    checks: Vec<Element>,
    violations: Vec<ViolationElements>,
    instances: Vec<Element>,
}

impl DomReport {
    pub fn scan(document: &Document, config: &FilterConfig) -> Result<Self, JsValue> {
        let selectors = &config.selectors;
        let mut builder = SnapshotBuilder::new();
        let mut checks = Vec::new();
        let mut violations = Vec::new();
        let mut instances = Vec::new();

        let check_elements = elements(&document.query_selector_all(&selectors.check)?);
        for (index, check_element) in check_elements.into_iter().enumerate() {
            let name = check_element
                .get_attribute("id")
                .unwrap_or_else(|| format!("check-{}", index));
            let check = builder.check(name);

            for item in elements(&check_element.query_selector_all(&selectors.violation)?) {
                // details text is read lazily through DetailsSource
                let violation = builder.violation(check, String::new()).map_err(to_js)?;

                let instance_list = item.query_selector(&selectors.instance_list)?;
                let folded = instance_list
                    .as_ref()
                    .map(|list| list.class_list().contains(&config.classes.folded))
                    .unwrap_or(false);
                if folded {
                    builder.fold(violation).map_err(to_js)?;
                }

                let instance_elements = elements(&item.query_selector_all(&selectors.instance)?);
                if instance_elements.is_empty() {
                    warn(&format!(
                        "violation {} in check {} has no instances and will stay hidden",
                        violation.0, index
                    ));
                }
                for element in instance_elements {
                    builder
                        .instance(violation, classification(&element, config))
                        .map_err(to_js)?;
                    instances.push(element);
                }

                let details = item.query_selector(&selectors.details)?;
                if details.is_none() {
                    warn(&format!(
                        "violation {} in check {} has no {:?} block, searching its whole text",
                        violation.0, index, selectors.details
                    ));
                }
                violations.push(ViolationElements {
                    details,
                    item,
                    instance_list,
                });
            }
            checks.push(check_element);
        }

        Ok(Self {
            snapshot: builder.build(),
            checks,
            violations,
            instances,
        })
    }

    pub fn snapshot(&self) -> &ReportSnapshot {
        &self.snapshot
    }

    /// Instance lists of every violation that has one
    pub fn instance_lists(&self) -> impl Iterator<Item = (ViolationId, &Element)> {
        self.violations
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.instance_list.as_ref().map(|list| (ViolationId(i), list)))
    }

    /// Toggle the hidden class on every scanned element
    pub fn apply(&self, visibility: &Visibility, hidden_class: &str) -> Result<(), JsValue> {
        for (id, visible) in visibility.instances() {
            if let Some(element) = self.instances.get(id.0) {
                element.class_list().toggle_with_force(hidden_class, !visible)?;
            }
        }
        for (id, visible) in visibility.violations() {
            if let Some(entry) = self.violations.get(id.0) {
                entry.item.class_list().toggle_with_force(hidden_class, !visible)?;
            }
        }
        for (id, visible) in visibility.checks() {
            if let Some(element) = self.checks.get(id.0) {
                element.class_list().toggle_with_force(hidden_class, !visible)?;
            }
        }
        Ok(())
    }
}

impl DetailsSource for DomReport {
    fn details_text(&self, violation: ViolationId) -> String {
        let Some(entry) = self.violations.get(violation.0) else {
            return String::new();
        };
        let text = entry
            .details
            .as_ref()
            .unwrap_or(&entry.item)
            .text_content()
            .unwrap_or_default();
        first_line(&text).to_string()
    }
}
