//! Filter control model
//!
//! Two control styles exist on rendered reports:
//! - select boxes (one or many, inside a form), where the wildcard option
//!   means "no constraint"
//! - toggle button groups, where an instance passes if its value is among
//!   the pressed buttons of the group
//!
//! Both can coexist; each contributes constraints independently.

use crate::search::SearchTerms;
use crate::snapshot::Instance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default wildcard option value
pub const WILDCARD: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectControl {
    pub field: String,
    /// Valid option values, including the wildcard
    pub options: Vec<String>,
    pub selected: String,
}

impl SelectControl {
    pub fn new<I, S>(field: impl Into<String>, options: I, wildcard: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options: Vec<String> = options.into_iter().map(Into::into).collect();
        if !options.iter().any(|o| o == wildcard) {
            options.insert(0, wildcard.to_string());
        }
        Self {
            field: field.into(),
            options,
            selected: wildcard.to_string(),
        }
    }

    pub fn is_valid(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }

    /// Select `value`, falling back to the wildcard when it is not one of
    /// the options. Returns whether `value` was accepted as given.
    pub fn select(&mut self, value: &str, wildcard: &str) -> bool {
        if self.is_valid(value) {
            self.selected = value.to_string();
            true
        } else {
            self.selected = wildcard.to_string();
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleButton {
    pub value: String,
    pub pressed: bool,
}

/// Buttons sharing one classification field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleGroup {
    pub field: String,
    pub buttons: Vec<ToggleButton>,
}

impl ToggleGroup {
    /// New group with every button pressed (no constraint)
    pub fn new<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            buttons: values
                .into_iter()
                .map(|v| ToggleButton {
                    value: v.into(),
                    pressed: true,
                })
                .collect(),
        }
    }

    /// Flip the button carrying `value`. Returns false if there is none.
    pub fn toggle(&mut self, value: &str) -> bool {
        match self.buttons.iter_mut().find(|b| b.value == value) {
            Some(button) => {
                button.pressed = !button.pressed;
                true
            }
            None => false,
        }
    }

    pub fn set_pressed(&mut self, value: &str, pressed: bool) -> bool {
        match self.buttons.iter_mut().find(|b| b.value == value) {
            Some(button) => {
                button.pressed = pressed;
                true
            }
            None => false,
        }
    }

    pub fn press_all(&mut self) {
        for button in &mut self.buttons {
            button.pressed = true;
        }
    }

    pub fn press_none(&mut self) {
        for button in &mut self.buttons {
            button.pressed = false;
        }
    }

    /// Press exactly the known values in `values`. If none of them is known
    /// the group falls back to all pressed. Returns the number accepted.
    pub fn press_only<'a, I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let wanted: BTreeSet<&str> = values.into_iter().collect();
        let accepted = self
            .buttons
            .iter()
            .filter(|b| wanted.contains(b.value.as_str()))
            .count();
        if accepted == 0 {
            self.press_all();
        } else {
            for button in &mut self.buttons {
                button.pressed = wanted.contains(button.value.as_str());
            }
        }
        accepted
    }

    pub fn pressed_values(&self) -> impl Iterator<Item = &str> {
        self.buttons
            .iter()
            .filter(|b| b.pressed)
            .map(|b| b.value.as_str())
    }

    /// A group constrains nothing while every button is pressed
    pub fn is_active(&self) -> bool {
        self.buttons.iter().any(|b| !b.pressed)
    }
}

/// One active restriction on an instance classification field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Equals { field: String, value: String },
    OneOf { field: String, values: BTreeSet<String> },
}

impl Constraint {
    pub fn field(&self) -> &str {
        match self {
            Constraint::Equals { field, .. } | Constraint::OneOf { field, .. } => field,
        }
    }

    /// Exact, case-sensitive comparison. A missing value never passes.
    pub fn admits(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (_, None) => false,
            (Constraint::Equals { value: want, .. }, Some(have)) => want == have,
            (Constraint::OneOf { values, .. }, Some(have)) => values.contains(have),
        }
    }

    /// `(field, value)` pairs written to the URL query
    ///
    /// A `OneOf` with no values is written as a single `field=` so that it
    /// stays distinct from an absent constraint.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        match self {
            Constraint::Equals { field, value } => vec![(field.as_str(), value.as_str())],
            Constraint::OneOf { field, values } if values.is_empty() => {
                vec![(field.as_str(), "")]
            }
            Constraint::OneOf { field, values } => values
                .iter()
                .map(|v| (field.as_str(), v.as_str()))
                .collect(),
        }
    }
}

/// Live state of every filter control on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterControls {
    pub wildcard: String,
    pub selects: Vec<SelectControl>,
    pub toggles: Vec<ToggleGroup>,
}

impl Default for FilterControls {
    fn default() -> Self {
        Self::new(WILDCARD)
    }
}

impl FilterControls {
    pub fn new(wildcard: impl Into<String>) -> Self {
        Self {
            wildcard: wildcard.into(),
            selects: Vec::new(),
            toggles: Vec::new(),
        }
    }

    pub fn with_select<I, S>(mut self, field: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let control = SelectControl::new(field, options, &self.wildcard);
        self.selects.push(control);
        self
    }

    pub fn with_toggle_group<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.toggles.push(ToggleGroup::new(field, values));
        self
    }

    pub fn select_control_mut(&mut self, field: &str) -> Option<&mut SelectControl> {
        self.selects.iter_mut().find(|s| s.field == field)
    }

    pub fn toggle_group_mut(&mut self, field: &str) -> Option<&mut ToggleGroup> {
        self.toggles.iter_mut().find(|g| g.field == field)
    }

    /// Set a select control. Unknown fields are ignored, invalid values fall
    /// back to the wildcard. Returns whether `value` was accepted as given.
    pub fn select(&mut self, field: &str, value: &str) -> bool {
        let wildcard = self.wildcard.clone();
        match self.select_control_mut(field) {
            Some(control) => control.select(value, &wildcard),
            None => false,
        }
    }

    pub fn toggle(&mut self, field: &str, value: &str) -> bool {
        self.toggle_group_mut(field)
            .map(|group| group.toggle(value))
            .unwrap_or(false)
    }

    /// Back to the unconstrained state
    pub fn reset(&mut self) {
        for control in &mut self.selects {
            control.selected = self.wildcard.clone();
        }
        for group in &mut self.toggles {
            group.press_all();
        }
    }

    pub fn constraints(&self) -> Vec<Constraint> {
        let selects = self
            .selects
            .iter()
            .filter(|s| s.selected != self.wildcard)
            .map(|s| Constraint::Equals {
                field: s.field.clone(),
                value: s.selected.clone(),
            });
        let toggles = self
            .toggles
            .iter()
            .filter(|g| g.is_active())
            .map(|g| Constraint::OneOf {
                field: g.field.clone(),
                values: g.pressed_values().map(str::to_string).collect(),
            });
        selects.chain(toggles).collect()
    }
}

/// Everything one recomputation needs from the controls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub constraints: Vec<Constraint>,
    pub search: SearchTerms,
}

impl FilterState {
    pub fn new(controls: &FilterControls, search_text: &str) -> Self {
        Self {
            constraints: controls.constraints(),
            search: SearchTerms::parse(search_text),
        }
    }

    pub fn admits_instance(&self, instance: &Instance) -> bool {
        self.constraints
            .iter()
            .all(|c| c.admits(instance.attribute(c.field())))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty() && self.search.is_empty()
    }
}
