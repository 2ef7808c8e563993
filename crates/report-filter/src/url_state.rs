//! Filter state <-> URL query string
//!
//! Query parameters map one-to-one to active constraints (`field=value`,
//! repeated for toggle groups, a lone `field=` for a group with nothing
//! pressed) plus an optional search parameter holding the
//! space-joined terms. Reading tolerates unknown, absent and invalid
//! parameters by falling back to the unconstrained default.

use crate::config::FilterConfig;
use crate::controls::{FilterControls, FilterState};
use crate::error::FilterError;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::{Position, Url};

/// Query pairs for a filter state, in control order, search last
pub fn query_pairs(state: &FilterState, search_param: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = state
        .constraints
        .iter()
        .flat_map(|c| c.query_pairs())
        .map(|(field, value)| (field.to_string(), value.to_string()))
        .collect();
    if !state.search.is_empty() {
        pairs.push((search_param.to_string(), state.search.joined()));
    }
    pairs
}

/// `current` with its query replaced by the filter state. Path and fragment
/// are kept.
pub fn render_url(
    current: &str,
    state: &FilterState,
    search_param: &str,
) -> Result<String, FilterError> {
    let mut url = Url::parse(current).map_err(|e| FilterError::InvalidUrl(e.to_string()))?;
    let pairs = query_pairs(state, search_param);

    url.set_query(None);
    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in &pairs {
            query.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}

/// Whether two URLs point at the same page with the same decoded query
///
/// Browsers and the serializer disagree on details like `%20` vs `+`, so the
/// query is compared pairwise after decoding.
pub fn same_location(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => {
            a[..Position::AfterPath] == b[..Position::AfterPath]
                && a.query_pairs().eq(b.query_pairs())
                && a.fragment() == b.fragment()
        }
        _ => false,
    }
}

/// Keeps the address bar in step with the filter controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSync {
    search_param: String,
}

impl UrlSync {
    pub fn new(search_param: impl Into<String>) -> Self {
        Self {
            search_param: search_param.into(),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.search_param.clone())
    }

    pub fn search_param(&self) -> &str {
        &self.search_param
    }

    /// URL to push as a new history entry, or `None` when the state already
    /// matches `current`
    pub fn next_entry(
        &self,
        current: &str,
        state: &FilterState,
    ) -> Result<Option<String>, FilterError> {
        let next = render_url(current, state, &self.search_param)?;
        if same_location(current, &next) {
            Ok(None)
        } else {
            debug!(url = %next, "filter state changed, new history entry");
            Ok(Some(next))
        }
    }

    /// Load control state from `current`'s query and return the search text
    ///
    /// Controls not mentioned in the query are reset. Values that are not
    /// valid options fall back to the wildcard (selects) or all pressed
    /// (toggle groups). A toggle group given only empty values is restored
    /// with nothing pressed.
    pub fn restore(
        &self,
        controls: &mut FilterControls,
        current: &str,
    ) -> Result<String, FilterError> {
        let url = Url::parse(current).map_err(|e| FilterError::InvalidUrl(e.to_string()))?;

        let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }

        controls.reset();
        let mut search = String::new();

        for (key, values) in &params {
            if *key == self.search_param {
                if let Some(last) = values.last() {
                    search = last.clone();
                }
                continue;
            }

            let wildcard = controls.wildcard.clone();
            if let Some(select) = controls.select_control_mut(key) {
                if let Some(value) = values.last() {
                    if !select.select(value, &wildcard) {
                        warn!(field = %key, value = %value, "unknown filter value in URL, using wildcard");
                    }
                }
            } else if let Some(group) = controls.toggle_group_mut(key) {
                if values.iter().all(String::is_empty) {
                    group.press_none();
                    continue;
                }
                let named: Vec<&str> = values
                    .iter()
                    .map(String::as_str)
                    .filter(|v| !v.is_empty())
                    .collect();
                let accepted = group.press_only(named.iter().copied());
                if accepted < named.len() {
                    warn!(
                        field = %key,
                        ignored = named.len() - accepted,
                        "unknown toggle values in URL"
                    );
                }
            } else {
                debug!(param = %key, "ignoring URL parameter without a matching control");
            }
        }

        Ok(search)
    }
}
