//! Filter controls in the page header
//!
//! Reads the search box, the named selects of the filter form and the toggle
//! buttons into a [`FilterControls`] model, and writes the model back when it
//! was changed from elsewhere (URL restore on load or back/forward).

use crate::dom::{classification, elements, warn};
use report_filter::{FilterConfig, FilterControls};
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

pub struct ToggleButtonElement {
    pub element: Element,
    pub field: String,
    pub value: String,
}

/// Field and value a toggle button filters on
///
/// Buttons may carry unrelated `data-*` attributes, so the first attribute
/// naming a field the report's instances actually use wins. Without one the
/// first classification attribute is used.
pub(crate) fn button_classification(
    attributes: Vec<(String, String)>,
    fields: &BTreeMap<String, Vec<String>>,
) -> Option<(String, String)> {
    let known = attributes
        .iter()
        .position(|(field, _)| fields.contains_key(field))
        .unwrap_or(0);
    attributes.into_iter().nth(known)
}

pub struct DomControls {
    search_input: Option<HtmlInputElement>,
    selects: Vec<HtmlSelectElement>,
    buttons: Vec<ToggleButtonElement>,
    pressed_class: String,
}

impl DomControls {
    /// `fields` are the instance fields of the scanned report, see
    /// [`report_filter::ReportSnapshot::field_values`]
    pub fn scan(
        document: &Document,
        config: &FilterConfig,
        fields: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, JsValue> {
        let selectors = &config.selectors;

        let search_input = document
            .query_selector(&selectors.search_input)?
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok());
        if search_input.is_none() {
            warn(&format!("no search input matches {:?}", selectors.search_input));
        }

        let selects = match document.query_selector(&selectors.filter_form)? {
            Some(form) => elements(&form.query_selector_all("select")?)
                .into_iter()
                .filter_map(|e| e.dyn_into::<HtmlSelectElement>().ok())
                .filter(|s| !s.name().is_empty())
                .collect(),
            None => Vec::new(),
        };

        let mut buttons = Vec::new();
        for element in elements(&document.query_selector_all(&selectors.toggle_button)?) {
            match button_classification(classification(&element, config), fields) {
                Some((field, value)) => {
                    if !fields.contains_key(&field) {
                        warn(&format!("toggle button filters on {:?}, which no instance has", field));
                    }
                    buttons.push(ToggleButtonElement {
                        element,
                        field,
                        value,
                    })
                }
                None => warn("toggle button without a classification attribute ignored"),
            }
        }

        Ok(Self {
            search_input,
            selects,
            buttons,
            pressed_class: config.classes.pressed.clone(),
        })
    }

    pub fn search_input(&self) -> Option<&HtmlInputElement> {
        self.search_input.as_ref()
    }

    pub fn selects(&self) -> &[HtmlSelectElement] {
        &self.selects
    }

    pub fn buttons(&self) -> &[ToggleButtonElement] {
        &self.buttons
    }

    /// Control model with the options found in the markup
    pub fn model(&self, config: &FilterConfig) -> FilterControls {
        let mut controls = FilterControls::new(config.wildcard.clone());

        for select in &self.selects {
            let options = select.options();
            let values: Vec<String> = (0..options.length())
                .filter_map(|i| options.item(i))
                .filter_map(|e| e.dyn_into::<HtmlOptionElement>().ok())
                .map(|o| o.value())
                .collect();
            controls = controls.with_select(select.name(), values);
        }

        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for button in &self.buttons {
            match groups.iter_mut().find(|(field, _)| *field == button.field) {
                Some((_, values)) => values.push(button.value.clone()),
                None => groups.push((button.field.clone(), vec![button.value.clone()])),
            }
        }
        for (field, values) in groups {
            controls = controls.with_toggle_group(field, values);
        }

        controls
    }

    /// Copy the live control state into `controls`, returning the search text
    pub fn read_into(&self, controls: &mut FilterControls) -> String {
        for select in &self.selects {
            controls.select(&select.name(), &select.value());
        }
        for button in &self.buttons {
            let pressed = button.element.class_list().contains(&self.pressed_class);
            if let Some(group) = controls.toggle_group_mut(&button.field) {
                group.set_pressed(&button.value, pressed);
            }
        }
        self.search_input
            .as_ref()
            .map(|input| input.value())
            .unwrap_or_default()
    }

    /// Make the page controls show `controls` and `search`
    pub fn write_from(&self, controls: &FilterControls, search: &str) -> Result<(), JsValue> {
        for select in &self.selects {
            let name = select.name();
            if let Some(control) = controls.selects.iter().find(|c| c.field == name) {
                select.set_value(&control.selected);
            }
        }
        for button in &self.buttons {
            let pressed = controls
                .toggles
                .iter()
                .find(|g| g.field == button.field)
                .map(|g| g.pressed_values().any(|v| v == button.value))
                .unwrap_or(true);
            button
                .element
                .class_list()
                .toggle_with_force(&self.pressed_class, pressed)?;
        }
        if let Some(input) = &self.search_input {
            input.set_value(search);
        }
        Ok(())
    }
}
