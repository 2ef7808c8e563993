//! Report structure as seen by the filter
//!
//! A rendered report is a tree of checks, violations and instances. The filter
//! never mutates that tree, so it is captured once into an arena and addressed
//! by index newtypes. Parent and child links are plain ids.

use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CheckId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViolationId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub usize);

/// A named section grouping violations (one policy check)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub violations: Vec<ViolationId>,
}

/// One reported finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub check: CheckId,
    /// Searchable summary line. May be left empty when the text is supplied
    /// lazily through a [`DetailsSource`].
    pub details: String,
    pub instances: Vec<InstanceId>,
    /// Whether the instance list was rendered folded
    pub folded: bool,
}

/// One concrete occurrence of a violation with its classification attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub violation: ViolationId,
    pub attributes: BTreeMap<String, String>,
}

impl Instance {
    /// Value recorded for a classification field (e.g. "layer")
    pub fn attribute(&self, field: &str) -> Option<&str> {
        self.attributes.get(field).map(String::as_str)
    }
}

/// Supplies the details text of a violation on demand
///
/// The filter memoizes whatever this returns, so implementations may be
/// expensive (e.g. reading rendered text out of the DOM).
pub trait DetailsSource {
    fn details_text(&self, violation: ViolationId) -> String;
}

/// Immutable arena of the rendered report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    checks: Vec<Check>,
    violations: Vec<Violation>,
    instances: Vec<Instance>,
}

impl ReportSnapshot {
    /// Parse the nested JSON form:
    ///
    /// ```json
    /// {"checks": [{"name": "...", "violations": [
    ///     {"details": "...", "folded": false, "instances": [{"layer": "..."}]}
    /// ]}]}
    /// ```
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        let doc: ReportDoc =
            serde_json::from_str(json).map_err(|e| FilterError::InvalidSnapshot(e.to_string()))?;

        let mut builder = SnapshotBuilder::new();
        for check_doc in doc.checks {
            let check = builder.check(check_doc.name);
            for violation_doc in check_doc.violations {
                let violation = builder.violation(check, violation_doc.details)?;
                if violation_doc.folded {
                    builder.fold(violation)?;
                }
                for attributes in violation_doc.instances {
                    builder.instance(violation, attributes)?;
                }
            }
        }
        Ok(builder.build())
    }

    pub fn checks(&self) -> impl Iterator<Item = (CheckId, &Check)> {
        self.checks.iter().enumerate().map(|(i, c)| (CheckId(i), c))
    }

    pub fn violations(&self) -> impl Iterator<Item = (ViolationId, &Violation)> {
        self.violations
            .iter()
            .enumerate()
            .map(|(i, v)| (ViolationId(i), v))
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(i, inst)| (InstanceId(i), inst))
    }

    pub fn check(&self, id: CheckId) -> Result<&Check, FilterError> {
        self.checks.get(id.0).ok_or(FilterError::UnknownNode {
            kind: "check",
            index: id.0,
        })
    }

    pub fn violation(&self, id: ViolationId) -> Result<&Violation, FilterError> {
        self.violations.get(id.0).ok_or(FilterError::UnknownNode {
            kind: "violation",
            index: id.0,
        })
    }

    pub fn instance(&self, id: InstanceId) -> Result<&Instance, FilterError> {
        self.instances.get(id.0).ok_or(FilterError::UnknownNode {
            kind: "instance",
            index: id.0,
        })
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Distinct values per classification field, sorted. Used to derive the
    /// valid options of a filter control when the markup does not list them.
    pub fn field_values(&self) -> BTreeMap<String, Vec<String>> {
        let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for instance in &self.instances {
            for (field, value) in &instance.attributes {
                let entry = values.entry(field.clone()).or_default();
                if !entry.contains(value) {
                    entry.push(value.clone());
                }
            }
        }
        for list in values.values_mut() {
            list.sort();
        }
        values
    }
}

impl DetailsSource for ReportSnapshot {
    fn details_text(&self, violation: ViolationId) -> String {
        self.violations
            .get(violation.0)
            .map(|v| v.details.clone())
            .unwrap_or_default()
    }
}

/// Incrementally assembles a [`ReportSnapshot`] in document order
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: ReportSnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, name: impl Into<String>) -> CheckId {
        let id = CheckId(self.snapshot.checks.len());
        self.snapshot.checks.push(Check {
            name: name.into(),
            violations: Vec::new(),
        });
        id
    }

    pub fn violation(
        &mut self,
        check: CheckId,
        details: impl Into<String>,
    ) -> Result<ViolationId, FilterError> {
        let id = ViolationId(self.snapshot.violations.len());
        let parent = self
            .snapshot
            .checks
            .get_mut(check.0)
            .ok_or(FilterError::UnknownNode {
                kind: "check",
                index: check.0,
            })?;
        parent.violations.push(id);
        self.snapshot.violations.push(Violation {
            check,
            details: details.into(),
            instances: Vec::new(),
            folded: false,
        });
        Ok(id)
    }

    pub fn instance<I, K, V>(
        &mut self,
        violation: ViolationId,
        attributes: I,
    ) -> Result<InstanceId, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let id = InstanceId(self.snapshot.instances.len());
        let parent = self
            .snapshot
            .violations
            .get_mut(violation.0)
            .ok_or(FilterError::UnknownNode {
                kind: "violation",
                index: violation.0,
            })?;
        parent.instances.push(id);
        self.snapshot.instances.push(Instance {
            violation,
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        });
        Ok(id)
    }

    /// Mark the violation's instance list as rendered folded
    pub fn fold(&mut self, violation: ViolationId) -> Result<(), FilterError> {
        let entry = self
            .snapshot
            .violations
            .get_mut(violation.0)
            .ok_or(FilterError::UnknownNode {
                kind: "violation",
                index: violation.0,
            })?;
        entry.folded = true;
        Ok(())
    }

    pub fn build(self) -> ReportSnapshot {
        self.snapshot
    }
}

#[derive(Deserialize)]
struct ReportDoc {
    #[serde(default)]
    checks: Vec<CheckDoc>,
}

#[derive(Deserialize)]
struct CheckDoc {
    name: String,
    #[serde(default)]
    violations: Vec<ViolationDoc>,
}

#[derive(Deserialize)]
struct ViolationDoc {
    #[serde(default)]
    details: String,
    #[serde(default)]
    folded: bool,
    #[serde(default)]
    instances: Vec<BTreeMap<String, String>>,
}
