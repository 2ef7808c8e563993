//! View filtering for rendered violation reports
//!
//! A report page lists checks, each holding violations, each backed by one or
//! more classified instances. This crate decides which of them are visible for
//! a given set of filter controls and search text, and keeps that state in the
//! page URL. It knows nothing about the DOM: the page binding scans markup
//! into a [`ReportSnapshot`] and applies the resulting [`Visibility`].
//!
//! ```
//! use report_filter::{FilterControls, FilterState, SnapshotBuilder, ViewFilter};
//!
//! let mut builder = SnapshotBuilder::new();
//! let check = builder.check("deprecated-apis");
//! let violation = builder.violation(check, "Ingress uses extensions/v1beta1").unwrap();
//! builder.instance(violation, [("layer", "app"), ("type", "critical")]).unwrap();
//! let snapshot = builder.build();
//!
//! let mut controls = FilterControls::default().with_select("type", ["critical", "info"]);
//! controls.select("type", "critical");
//!
//! let mut filter = ViewFilter::new();
//! let visibility = filter.compute(&snapshot, &FilterState::new(&controls, "ingress"));
//! assert!(visibility.is_check_visible(check));
//! ```

pub mod config;
pub mod controls;
pub mod error;
pub mod fold;
pub mod search;
pub mod snapshot;
pub mod url_state;
pub mod visibility;

pub use config::FilterConfig;
pub use controls::{
    Constraint, FilterControls, FilterState, SelectControl, ToggleButton, ToggleGroup, WILDCARD,
};
pub use error::FilterError;
pub use fold::FoldState;
pub use search::{first_line, DetailsCache, SearchTerms};
pub use snapshot::{
    Check, CheckId, DetailsSource, Instance, InstanceId, ReportSnapshot, SnapshotBuilder,
    Violation, ViolationId,
};
pub use url_state::{render_url, same_location, UrlSync};
pub use visibility::{ViewFilter, Visibility, VisibilitySummary};
