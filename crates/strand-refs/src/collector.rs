//! Accumulation of references encountered while reading.

use std::collections::BTreeSet;

use strand_types::Reference;

use crate::format::encode_reference;
use crate::refs_map::RefsMap;

/// De-duplicating, ordered set of references seen during one read.
///
/// The persistence layer drains the collector after deserialization to
/// resolve all targets in a single batch.
#[derive(Clone, Debug, Default)]
pub struct ReferenceCollector {
    seen: BTreeSet<Reference>,
}

impl ReferenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference. Returns `true` if it was not seen before.
    pub fn record(&mut self, reference: &Reference) -> bool {
        if self.seen.contains(reference) {
            return false;
        }
        self.seen.insert(reference.clone())
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.seen.contains(reference)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.seen.iter()
    }

    /// References that have no entry in `resolved` yet.
    pub fn unresolved<'a, T>(
        &'a self,
        resolved: &'a RefsMap<T>,
    ) -> impl Iterator<Item = &'a Reference> {
        self.seen
            .iter()
            .filter(move |r| !resolved.contains(&encode_reference(r)))
    }

    pub fn into_references(self) -> Vec<Reference> {
        self.seen.into_iter().collect()
    }
}
