//! Folded instance lists
//!
//! Long instance lists are rendered folded; an unfold control expands them.
//! Unfolding is one-way for the lifetime of the page.

use crate::snapshot::{ReportSnapshot, ViolationId};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldState {
    folded: BTreeSet<ViolationId>,
}

impl FoldState {
    pub fn from_snapshot(snapshot: &ReportSnapshot) -> Self {
        Self {
            folded: snapshot
                .violations()
                .filter(|(_, v)| v.folded)
                .map(|(id, _)| id)
                .collect(),
        }
    }

    pub fn is_folded(&self, id: ViolationId) -> bool {
        self.folded.contains(&id)
    }

    /// Returns true only for the call that actually unfolded the list
    pub fn unfold(&mut self, id: ViolationId) -> bool {
        self.folded.remove(&id)
    }

    pub fn folded_count(&self) -> usize {
        self.folded.len()
    }
}
