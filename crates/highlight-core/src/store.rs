//! In-memory highlight store
//!
//! Append-only collection of highlight records with a full clear. Insertion
//! order is the only ordering guarantee; page partitioning is derived on
//! every query from the records themselves.

use crate::error::HighlightError;
use crate::types::HighlightRecord;
use std::collections::BTreeSet;

/// Serialized only through [`HighlightStore::to_json`] and rebuilt only
/// through [`HighlightStore::from_json`], so every record is validated
#[derive(Debug, Clone, Default)]
pub struct HighlightStore {
    highlights: Vec<HighlightRecord>,
}

impl HighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record after checking its invariants and id uniqueness
    pub fn append(&mut self, record: HighlightRecord) -> Result<(), HighlightError> {
        record.validate()?;
        if self.highlights.iter().any(|h| h.id == record.id) {
            return Err(HighlightError::DuplicateId(record.id));
        }
        self.highlights.push(record);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.highlights.clear();
    }

    /// Records on one page, in insertion order
    pub fn by_page(&self, page_number: u32) -> impl Iterator<Item = &HighlightRecord> + '_ {
        self.highlights
            .iter()
            .filter(move |h| h.page_number == page_number)
    }

    pub fn count(&self) -> usize {
        self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    pub fn records(&self) -> &[HighlightRecord] {
        &self.highlights
    }

    /// Distinct pages that carry at least one highlight, ascending
    pub fn pages(&self) -> Vec<u32> {
        self.highlights
            .iter()
            .map(|h| h.page_number)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn to_json(&self) -> Result<String, HighlightError> {
        Ok(serde_json::to_string(&self.highlights)?)
    }

    /// Rebuild a store from a JSON array of records, validating each one
    pub fn from_json(json: &str) -> Result<Self, HighlightError> {
        let records: Vec<HighlightRecord> = serde_json::from_str(json)?;
        let mut store = Self::new();
        for record in records {
            store.append(record)?;
        }
        Ok(store)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::types::{HighlightColor, HighlightPosition, LayerRect};
    use proptest::prelude::*;

    fn record(index: usize, page: u32) -> HighlightRecord {
        let rect = LayerRect::from_edges(0.0, 0.0, 50.0, 12.0);
        HighlightRecord {
            id: format!("highlight-{}", index),
            page_number: page,
            position: HighlightPosition {
                bounding_rect: rect,
                rects: vec![rect],
                page_width: 612.0,
                page_height: 792.0,
            },
            color: HighlightColor::Blue,
            content: String::from("x"),
            created_at: 0,
        }
    }

    proptest! {
        /// Property: by_page(n) never yields a record from another page
        #[test]
        fn page_isolation(pages in prop::collection::vec(1u32..10, 0..40), query in 1u32..12) {
            let mut store = HighlightStore::new();
            for (i, page) in pages.iter().enumerate() {
                store.append(record(i, *page)).unwrap();
            }
            prop_assert!(store.by_page(query).all(|h| h.page_number == query));
            let expected = pages.iter().filter(|p| **p == query).count();
            prop_assert_eq!(store.by_page(query).count(), expected);
        }

        /// Property: clear() leaves nothing behind on any page
        #[test]
        fn clear_is_complete(pages in prop::collection::vec(1u32..10, 0..40)) {
            let mut store = HighlightStore::new();
            for (i, page) in pages.iter().enumerate() {
                store.append(record(i, *page)).unwrap();
            }
            store.clear();
            prop_assert_eq!(store.count(), 0);
            for page in 1u32..12 {
                prop_assert_eq!(store.by_page(page).count(), 0);
            }
        }
    }
}
