//! Visibility computation
//!
//! One pass, bottom-up: instances against the constraints, violations against
//! their instances and the search terms, checks against their violations.
//! The pass is a pure function of the snapshot and the filter state (apart
//! from filling the details cache), so repeating it is idempotent.

use crate::controls::FilterState;
use crate::search::DetailsCache;
use crate::snapshot::{CheckId, DetailsSource, InstanceId, ReportSnapshot, ViolationId};
use serde::Serialize;
use tracing::debug;

/// Visibility flag for every node of a snapshot, indexed by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    instances: Vec<bool>,
    violations: Vec<bool>,
    checks: Vec<bool>,
}

impl Visibility {
    /// Unknown ids are reported hidden
    pub fn is_instance_visible(&self, id: InstanceId) -> bool {
        self.instances.get(id.0).copied().unwrap_or(false)
    }

    pub fn is_violation_visible(&self, id: ViolationId) -> bool {
        self.violations.get(id.0).copied().unwrap_or(false)
    }

    pub fn is_check_visible(&self, id: CheckId) -> bool {
        self.checks.get(id.0).copied().unwrap_or(false)
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, bool)> + '_ {
        self.instances
            .iter()
            .enumerate()
            .map(|(i, v)| (InstanceId(i), *v))
    }

    pub fn violations(&self) -> impl Iterator<Item = (ViolationId, bool)> + '_ {
        self.violations
            .iter()
            .enumerate()
            .map(|(i, v)| (ViolationId(i), *v))
    }

    pub fn checks(&self) -> impl Iterator<Item = (CheckId, bool)> + '_ {
        self.checks
            .iter()
            .enumerate()
            .map(|(i, v)| (CheckId(i), *v))
    }

    pub fn summary(&self) -> VisibilitySummary {
        let count = |flags: &[bool]| flags.iter().filter(|v| **v).count();
        VisibilitySummary {
            visible_checks: count(&self.checks),
            visible_violations: count(&self.violations),
            visible_instances: count(&self.instances),
            total_checks: self.checks.len(),
            total_violations: self.violations.len(),
            total_instances: self.instances.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibilitySummary {
    pub visible_checks: usize,
    pub visible_violations: usize,
    pub visible_instances: usize,
    pub total_checks: usize,
    pub total_violations: usize,
    pub total_instances: usize,
}

/// Owns the per-page details cache and runs visibility passes
#[derive(Debug, Default)]
pub struct ViewFilter {
    details: DetailsCache,
}

impl ViewFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn details_cache(&self) -> &DetailsCache {
        &self.details
    }

    /// Visibility using the details text stored in the snapshot itself
    pub fn compute(&mut self, snapshot: &ReportSnapshot, state: &FilterState) -> Visibility {
        self.compute_visibility(snapshot, snapshot, state)
    }

    pub fn compute_visibility<D: DetailsSource + ?Sized>(
        &mut self,
        snapshot: &ReportSnapshot,
        details: &D,
        state: &FilterState,
    ) -> Visibility {
        let instances: Vec<bool> = snapshot
            .instances()
            .map(|(_, instance)| state.admits_instance(instance))
            .collect();

        let violations: Vec<bool> = snapshot
            .violations()
            .map(|(id, violation)| {
                let any_instance = violation
                    .instances
                    .iter()
                    .any(|i| instances.get(i.0).copied().unwrap_or(false));
                // only touch the details text when it can change the outcome
                any_instance
                    && (state.search.is_empty()
                        || state.search.matches(self.details.get_or_fetch(id, details)))
            })
            .collect();

        let checks: Vec<bool> = snapshot
            .checks()
            .map(|(_, check)| {
                check
                    .violations
                    .iter()
                    .any(|v| violations.get(v.0).copied().unwrap_or(false))
            })
            .collect();

        let visibility = Visibility {
            instances,
            violations,
            checks,
        };
        let summary = visibility.summary();
        debug!(
            constraints = state.constraints.len(),
            terms = state.search.terms().len(),
            visible_checks = summary.visible_checks,
            visible_violations = summary.visible_violations,
            visible_instances = summary.visible_instances,
            "recomputed report visibility"
        );
        visibility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::FilterControls;
    use crate::snapshot::SnapshotBuilder;
    use pretty_assertions::assert_eq;

    /// Two checks:
    /// - "api": v0 "Null pointer in handler" [app/critical, infra/info]
    ///          v1 "Deprecated field" [app/info]
    /// - "limits": v2 "Missing memory limit" [infra/critical]
    fn fixture() -> ReportSnapshot {
        let mut b = SnapshotBuilder::new();
        let api = b.check("api");
        let v0 = b.violation(api, "Null pointer in handler").unwrap();
        b.instance(v0, [("layer", "app"), ("type", "critical")]).unwrap();
        b.instance(v0, [("layer", "infra"), ("type", "info")]).unwrap();
        let v1 = b.violation(api, "Deprecated field").unwrap();
        b.instance(v1, [("layer", "app"), ("type", "info")]).unwrap();
        let limits = b.check("limits");
        let v2 = b.violation(limits, "Missing memory limit").unwrap();
        b.instance(v2, [("layer", "infra"), ("type", "critical")]).unwrap();
        b.build()
    }

    fn controls() -> FilterControls {
        FilterControls::default()
            .with_select("layer", ["app", "infra"])
            .with_select("type", ["critical", "info"])
    }

    #[test]
    fn test_unconstrained_shows_everything() {
        let snapshot = fixture();
        let visibility = ViewFilter::new().compute(&snapshot, &FilterState::new(&controls(), ""));
        let summary = visibility.summary();
        assert_eq!(summary.visible_checks, 2);
        assert_eq!(summary.visible_violations, 3);
        assert_eq!(summary.visible_instances, 4);
    }

    #[test]
    fn test_constraint_propagates_up() {
        let snapshot = fixture();
        let mut c = controls();
        c.select("layer", "app");
        c.select("type", "info");
        let visibility = ViewFilter::new().compute(&snapshot, &FilterState::new(&c, ""));

        let instances: Vec<bool> = visibility.instances().map(|(_, v)| v).collect();
        assert_eq!(instances, vec![false, false, true, false]);
        assert!(!visibility.is_violation_visible(ViolationId(0)));
        assert!(visibility.is_violation_visible(ViolationId(1)));
        assert!(visibility.is_check_visible(CheckId(0)));
        assert!(!visibility.is_check_visible(CheckId(1)));
    }

    #[test]
    fn test_search_hides_violation_but_not_instances() {
        let snapshot = fixture();
        let visibility =
            ViewFilter::new().compute(&snapshot, &FilterState::new(&controls(), "MEMORY"));

        assert!(visibility.is_instance_visible(InstanceId(0)));
        assert!(!visibility.is_violation_visible(ViolationId(0)));
        assert!(visibility.is_violation_visible(ViolationId(2)));
        assert!(!visibility.is_check_visible(CheckId(0)));
        assert!(visibility.is_check_visible(CheckId(1)));
    }

    #[test]
    fn test_details_fetched_only_when_searching() {
        let snapshot = fixture();
        let mut filter = ViewFilter::new();

        filter.compute(&snapshot, &FilterState::new(&controls(), ""));
        assert!(filter.details_cache().is_empty());

        filter.compute(&snapshot, &FilterState::new(&controls(), "limit"));
        assert_eq!(filter.details_cache().len(), 3);
    }

    #[test]
    fn test_violation_without_instances_is_hidden() {
        let mut b = SnapshotBuilder::new();
        let check = b.check("empty");
        b.violation(check, "no instances").unwrap();
        let snapshot = b.build();

        let visibility = ViewFilter::new().compute(&snapshot, &FilterState::default());
        assert!(!visibility.is_violation_visible(ViolationId(0)));
        assert!(!visibility.is_check_visible(CheckId(0)));
    }

    #[test]
    fn test_unknown_ids_are_hidden() {
        let visibility = Visibility::default();
        assert!(!visibility.is_instance_visible(InstanceId(9)));
        assert!(!visibility.is_violation_visible(ViolationId(9)));
        assert!(!visibility.is_check_visible(CheckId(9)));
    }
}
