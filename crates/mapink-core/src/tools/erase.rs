//! Feature collection for the erase tool.

use crate::layers::FeatureRef;
use std::collections::BTreeSet;

/// Features marked for deletion during one erase gesture.
///
/// Repeated hits on the same feature are no-ops, so the set only ever holds
/// distinct references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EraseSet {
    features: BTreeSet<FeatureRef>,
}

impl EraseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a feature. Returns `true` the first time it is seen.
    pub fn insert(&mut self, feature: FeatureRef) -> bool {
        self.features.insert(feature)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRef> {
        self.features.iter()
    }

    /// Flush the set into a delete batch, leaving it empty.
    pub fn drain(&mut self) -> Vec<FeatureRef> {
        std::mem::take(&mut self.features).into_iter().collect()
    }
}
