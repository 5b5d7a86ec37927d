use std::collections::BTreeMap;

/// Label of the pseudo-category that imposes no restriction.
pub const ALL_CATEGORY: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub description: String,
    pub version: String,
    pub maintainer_name: String,
    pub maintainer_email: String,
    pub query: String,         // Command string copied by the user
    pub tags: String,          // Space-joined
    pub license: String,
    pub category: String,      // Exact-match filter key, not searched
}

impl Entry {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    /// The eight free-text searchable fields.
    pub fn searchable_fields(&self) -> [&str; 8] {
        [
            &self.name,
            &self.description,
            &self.version,
            &self.maintainer_name,
            &self.maintainer_email,
            &self.query,
            &self.tags,
            &self.license,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Raw text as typed, untrimmed.
    pub query: String,
    /// `None` is the "All" state.
    pub selected_category: Option<String>,
}

impl FilterState {
    /// Maps the null sentinel and the literal "All" to `None`.
    pub fn normalize_category(name: Option<&str>) -> Option<String> {
        match name {
            None => None,
            Some(n) if n.is_empty() || n == ALL_CATEGORY => None,
            Some(n) => Some(n.to_string()),
        }
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn has_category(&self) -> bool {
        self.selected_category.is_some()
    }
}

/// Per-category entry counts over the full, unfiltered snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    counts: BTreeMap<String, usize>,
    total: usize,
}

impl CategoryIndex {
    pub fn build(entries: &[Entry]) -> Self {
        let mut counts = BTreeMap::new();
        for entry in entries {
            *counts.entry(entry.category.clone()).or_insert(0) += 1;
        }
        Self {
            counts,
            total: entries.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    #[cfg(test)]
    pub fn count(&self, category: &str) -> usize {
        if category == ALL_CATEGORY {
            return self.total;
        }
        self.counts.get(category).copied().unwrap_or(0)
    }

    /// Distinct categories in alphabetical order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The "All" row followed by one row per category, flagged against `selected`.
    pub fn options(&self, selected: Option<&str>) -> Vec<CategoryOption> {
        let mut rows = Vec::with_capacity(self.counts.len() + 1);
        rows.push(CategoryOption {
            label: ALL_CATEGORY.to_string(),
            count: self.total,
            selected: selected.is_none(),
        });
        rows.extend(self.categories().map(|(label, count)| CategoryOption {
            label: label.to_string(),
            count,
            selected: selected == Some(label),
        }));
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub label: String,
    pub count: usize,
    pub selected: bool,
}
