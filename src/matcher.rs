use crate::model::Entry;

/// Case-folded substring matching over an entry's searchable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstringMatcher {
    needle: String,
}

impl SubstringMatcher {
    /// Builds a matcher from a raw query; surrounding whitespace is ignored.
    pub fn new(raw: &str) -> Self {
        Self {
            needle: raw.trim().to_lowercase(),
        }
    }

    /// Keeps surrounding whitespace as part of the needle.
    pub fn verbatim(raw: &str) -> Self {
        Self {
            needle: raw.to_lowercase(),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        entry
            .searchable_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    /// Matches an arbitrary label, used for category option rows.
    pub fn matches_label(&self, label: &str) -> bool {
        self.needle.is_empty() || label.to_lowercase().contains(&self.needle)
    }
}

/// Exact, case-sensitive category equality; `None` admits every entry.
pub fn matches_category(entry: &Entry, selected: Option<&str>) -> bool {
    match selected {
        None => true,
        Some(category) => entry.category == category,
    }
}
