//! End-to-end filter scenarios over a small rendered report

use pretty_assertions::assert_eq;
use report_filter::{
    CheckId, FilterControls, FilterState, FoldState, ReportSnapshot, UrlSync, ViewFilter,
    ViolationId,
};

const REPORT: &str = r#"{
    "checks": [
        {
            "name": "memory-safety",
            "violations": [
                {
                    "details": "Possible NULL POINTER dereference in handler",
                    "instances": [
                        {"layer": "app", "type": "critical"},
                        {"layer": "infra", "type": "info"}
                    ]
                },
                {
                    "details": "Unchecked array index",
                    "instances": [{"layer": "app", "type": "warning"}]
                }
            ]
        },
        {
            "name": "deprecations",
            "violations": [
                {
                    "details": "Null pointer check is redundant",
                    "folded": true,
                    "instances": [
                        {"layer": "infra", "type": "info"},
                        {"layer": "infra", "type": "info"},
                        {"layer": "app", "type": "info"}
                    ]
                }
            ]
        },
        {
            "name": "style",
            "violations": [
                {
                    "details": "Line too long",
                    "instances": [{"layer": "app", "type": "warning"}]
                }
            ]
        }
    ]
}"#;

const PAGE: &str = "https://doop.example.com/index.html";

fn report() -> ReportSnapshot {
    ReportSnapshot::from_json(REPORT).expect("fixture report parses")
}

fn select_controls() -> FilterControls {
    FilterControls::default()
        .with_select("layer", ["app", "infra"])
        .with_select("type", ["critical", "warning", "info"])
}

fn visible_violations(
    filter: &mut ViewFilter,
    snapshot: &ReportSnapshot,
    state: &FilterState,
) -> Vec<usize> {
    filter
        .compute(snapshot, state)
        .violations()
        .filter(|(_, visible)| *visible)
        .map(|(id, _)| id.0)
        .collect()
}

#[test]
fn search_with_wildcard_layer_matches_case_insensitively() {
    let snapshot = report();
    let mut controls = select_controls();
    controls.select("layer", "all");
    let state = FilterState::new(&controls, "null pointer");

    let mut filter = ViewFilter::new();
    let visibility = filter.compute(&snapshot, &state);

    assert_eq!(
        visibility.summary().visible_instances,
        snapshot.instance_count()
    );
    assert!(visibility.is_violation_visible(ViolationId(0)));
    assert!(!visibility.is_violation_visible(ViolationId(1)));
    assert!(visibility.is_violation_visible(ViolationId(2)));
    assert!(!visibility.is_violation_visible(ViolationId(3)));
    assert!(!visibility.is_check_visible(CheckId(2)));
}

#[test]
fn type_filter_hides_checks_without_matches() {
    let snapshot = report();
    let mut controls = select_controls();
    controls.select("type", "critical");
    let state = FilterState::new(&controls, "");

    let visibility = ViewFilter::new().compute(&snapshot, &state);

    let visible_instances: Vec<usize> = visibility
        .instances()
        .filter(|(_, v)| *v)
        .map(|(id, _)| id.0)
        .collect();
    assert_eq!(visible_instances, vec![0]);
    assert!(visibility.is_violation_visible(ViolationId(0)));
    assert!(visibility.is_check_visible(CheckId(0)));
    assert!(!visibility.is_check_visible(CheckId(1)));
    assert!(!visibility.is_check_visible(CheckId(2)));
}

#[test]
fn bogus_url_value_behaves_like_no_constraint() {
    let snapshot = report();
    let sync = UrlSync::new("search");

    let mut from_url = select_controls();
    let search = sync
        .restore(&mut from_url, &format!("{}?layer=bogus", PAGE))
        .unwrap();
    assert_eq!(from_url.selects[0].selected, "all");

    let mut filter = ViewFilter::new();
    let restored_state = FilterState::new(&from_url, &search);
    let baseline_state = FilterState::new(&select_controls(), "");
    let restored = visible_violations(&mut filter, &snapshot, &restored_state);
    let baseline = visible_violations(&mut filter, &snapshot, &baseline_state);
    assert_eq!(restored, baseline);
}

#[test]
fn recomputation_is_idempotent_and_pushes_history_once() {
    let snapshot = report();
    let sync = UrlSync::new("search");
    let mut controls = select_controls();
    controls.select("layer", "infra");
    let state = FilterState::new(&controls, "Null");

    let mut filter = ViewFilter::new();
    let first = filter.compute(&snapshot, &state);
    let second = filter.compute(&snapshot, &state);
    assert_eq!(first, second);

    let mut location = PAGE.to_string();
    let mut pushes = 0;
    for _ in 0..2 {
        if let Some(next) = sync.next_entry(&location, &state).unwrap() {
            location = next;
            pushes += 1;
        }
    }
    assert_eq!(pushes, 1);
    assert_eq!(location, format!("{}?layer=infra&search=null", PAGE));
}

#[test]
fn back_navigation_restores_previous_filter() {
    let snapshot = report();
    let sync = UrlSync::new("search");
    let mut filter = ViewFilter::new();

    let mut controls = select_controls();
    controls.select("type", "warning");
    let warning_state = FilterState::new(&controls, "");
    let warning_url = sync.next_entry(PAGE, &warning_state).unwrap().unwrap();
    let warning_visible = visible_violations(&mut filter, &snapshot, &warning_state);

    controls.select("type", "info");
    let info_state = FilterState::new(&controls, "");
    assert!(sync.next_entry(&warning_url, &info_state).unwrap().is_some());

    // popstate back to the warning entry
    let search = sync.restore(&mut controls, &warning_url).unwrap();
    let restored = FilterState::new(&controls, &search);
    assert_eq!(restored, warning_state);
    assert_eq!(
        visible_violations(&mut filter, &snapshot, &restored),
        warning_visible
    );
}

#[test]
fn toggle_buttons_filter_by_pressed_values() {
    let snapshot = report();
    let mut controls = FilterControls::default()
        .with_toggle_group("layer", ["app", "infra"])
        .with_toggle_group("type", ["critical", "warning", "info"]);
    controls.toggle("layer", "app");
    controls.toggle("type", "critical");

    let state = FilterState::new(&controls, "");
    let mut filter = ViewFilter::new();
    assert_eq!(visible_violations(&mut filter, &snapshot, &state), vec![0, 2]);

    let url = report_filter::render_url(PAGE, &state, "search").unwrap();
    assert_eq!(url, format!("{}?layer=infra&type=info&type=warning", PAGE));
}

#[test]
fn folded_list_unfolds_once() {
    let snapshot = report();
    let mut folds = FoldState::from_snapshot(&snapshot);

    assert!(folds.is_folded(ViolationId(2)));
    assert!(folds.unfold(ViolationId(2)));
    assert!(!folds.unfold(ViolationId(2)));
    assert!(!folds.is_folded(ViolationId(2)));
    assert_eq!(folds.folded_count(), 0);
}
