use crate::matcher::{SubstringMatcher, matches_category};
use crate::model::{CategoryIndex, Entry, FilterState};

/// Immutable catalog snapshot plus the current filter and its derived result set.
pub struct CatalogState {
    entries: Vec<Entry>,

    pub filter: FilterState,

    pub category_index: CategoryIndex,

    pub filtered_indices: Vec<usize>,
}

impl CatalogState {
    pub fn new(entries: Vec<Entry>) -> Self {
        let category_index = CategoryIndex::build(&entries);
        let filtered_indices = (0..entries.len()).collect();
        Self {
            entries,
            filter: FilterState::default(),
            category_index,
            filtered_indices,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn set_query(&mut self, raw: &str) {
        self.filter.query = raw.to_string();
    }

    pub fn set_category(&mut self, name: Option<&str>) {
        self.filter.selected_category = FilterState::normalize_category(name);
    }

    /// Recomputes the result set from scratch: category first, then text.
    pub fn update_filter(&mut self) {
        let matcher = SubstringMatcher::new(&self.filter.query);
        let selected = self.filter.selected_category.as_deref();

        self.filtered_indices = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matches_category(e, selected))
            .filter(|(_, e)| matcher.matches(e))
            .map(|(i, _)| i)
            .collect();

        log::info!(
            "CatalogState: query='{}', category={:?}, filtered_count={}",
            self.filter.query.trim(),
            selected,
            self.filtered_indices.len()
        );
    }

    /// Visible entries in original snapshot order.
    pub fn results(&self) -> Vec<&Entry> {
        self.filtered_indices.iter().map(|&idx| &self.entries[idx]).collect()
    }
}
