//! Page contract configuration
//!
//! Describes where the report generator puts things: selectors for the report
//! structure and controls, the class names toggled on them, and the URL
//! parameter names. Every field has a default matching the stock report
//! markup, so an empty JSON object is a valid configuration.

use crate::controls::WILDCARD;
use crate::error::FilterError;
use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Report structure
    pub selectors: SelectorConfig,
    /// Class names toggled by the filter
    pub classes: ClassConfig,
    /// Prefix of instance and button classification attributes
    pub attribute_prefix: String,
    /// Option value meaning "no constraint"
    pub wildcard: String,
    /// URL parameter holding the search terms
    pub search_param: String,
    /// Mirror filter state into the address bar
    pub sync_url: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub check: String,
    pub violation: String,
    pub details: String,
    pub instance: String,
    pub instance_list: String,
    pub unfolder: String,
    pub search_input: String,
    pub filter_form: String,
    pub toggle_button: String,
    /// Optional element receiving the visible violation count
    pub counter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassConfig {
    pub hidden: String,
    pub folded: String,
    pub pressed: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            selectors: SelectorConfig::default(),
            classes: ClassConfig::default(),
            attribute_prefix: "data-".to_string(),
            wildcard: WILDCARD.to_string(),
            search_param: "search".to_string(),
            sync_url: true,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            check: "section.check".to_string(),
            violation: "li.violation".to_string(),
            details: ".violation-details".to_string(),
            instance: ".violation-instance".to_string(),
            instance_list: ".violation-instances".to_string(),
            unfolder: ".unfolder a".to_string(),
            search_input: "header input.search".to_string(),
            filter_form: "header form".to_string(),
            toggle_button: "header button.filter-toggle".to_string(),
            counter: None,
        }
    }
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            hidden: "hidden".to_string(),
            folded: "folded".to_string(),
            pressed: "active".to_string(),
        }
    }
}

impl FilterConfig {
    /// Parse configuration from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result fails
    /// [`FilterConfig::validate`].
    ///
    /// # Example
    ///
    /// ```
    /// use report_filter::config::FilterConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = FilterConfig::from_json(r#"{"sync_url": false, "classes": {"hidden": "d-none"}}"#)?;
    /// assert!(!config.sync_url);
    /// assert_eq!(config.classes.hidden, "d-none");
    /// assert_eq!(config.classes.folded, "folded");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let config: FilterConfig =
            serde_json::from_str(s).context("Failed to parse filter configuration JSON")?;
        config.validate().context("Filter configuration is invalid")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        let required = [
            ("wildcard", &self.wildcard),
            ("search_param", &self.search_param),
            ("classes.hidden", &self.classes.hidden),
            ("classes.folded", &self.classes.folded),
            ("classes.pressed", &self.classes.pressed),
            ("selectors.check", &self.selectors.check),
            ("selectors.violation", &self.selectors.violation),
            ("selectors.instance", &self.selectors.instance),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(FilterError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        if !self.attribute_prefix.ends_with('-') {
            return Err(FilterError::InvalidConfig(format!(
                "attribute_prefix must end with '-', got {:?}",
                self.attribute_prefix
            )));
        }
        Ok(())
    }

    /// Classification field named by an attribute, if it carries the prefix
    pub fn field_for_attribute<'a>(&self, attribute: &'a str) -> Option<&'a str> {
        attribute
            .strip_prefix(self.attribute_prefix.as_str())
            .filter(|field| !field.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_object_is_default() {
        let config = FilterConfig::from_json("{}").unwrap();
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.wildcard, "all");
        assert_eq!(config.search_param, "search");
        assert!(config.sync_url);
    }

    #[test]
    fn test_partial_override() {
        let config = FilterConfig::from_json(
            r##"{"selectors": {"check": "div.check", "counter": "#visible-count"}}"##,
        )
        .unwrap();
        assert_eq!(config.selectors.check, "div.check");
        assert_eq!(config.selectors.counter.as_deref(), Some("#visible-count"));
        assert_eq!(config.selectors.violation, "li.violation");
    }

    #[test]
    fn test_malformed_json() {
        let err = FilterConfig::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_empty_wildcard_rejected() {
        let err = FilterConfig::from_json(r#"{"wildcard": ""}"#).unwrap_err();
        let root = err.root_cause().to_string();
        assert!(root.contains("wildcard must not be empty"), "{}", root);
    }

    #[test]
    fn test_field_for_attribute() {
        let config = FilterConfig::default();
        assert_eq!(config.field_for_attribute("data-layer"), Some("layer"));
        assert_eq!(config.field_for_attribute("data-"), None);
        assert_eq!(config.field_for_attribute("class"), None);
    }
}
