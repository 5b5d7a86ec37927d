use crate::model::FilterState;

/// Which qualifiers apply to the visible count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Unfiltered,
    Search,
    Filter,
    SearchAndFilter,
}

impl SummaryKind {
    pub fn of(filter: &FilterState) -> Self {
        match (filter.has_query(), filter.has_category()) {
            (false, false) => Self::Unfiltered,
            (true, false) => Self::Search,
            (false, true) => Self::Filter,
            (true, true) => Self::SearchAndFilter,
        }
    }
}

fn noun(label: &str, count: usize) -> String {
    if count == 1 {
        label.to_string()
    } else {
        format!("{label}s")
    }
}

/// Summary line for `count` visible entries under `filter`.
pub fn summary_text(filter: &FilterState, count: usize, total: usize, label: &str) -> String {
    match SummaryKind::of(filter) {
        SummaryKind::Unfiltered => format!("{total} {}", noun(label, total)),
        SummaryKind::Search => format!("{count} {} found with search", noun(label, count)),
        SummaryKind::Filter => format!(
            "{count} {} found with filter '{}'",
            noun(label, count),
            filter.selected_category.as_deref().unwrap_or_default()
        ),
        SummaryKind::SearchAndFilter => format!(
            "{count} {} found with search and filter '{}'",
            noun(label, count),
            filter.selected_category.as_deref().unwrap_or_default()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(query: &str, category: Option<&str>) -> FilterState {
        FilterState {
            query: query.to_string(),
            selected_category: FilterState::normalize_category(category),
        }
    }

    #[test]
    fn unfiltered_shows_total_without_qualifier() {
        assert_eq!(summary_text(&filter("", None), 5, 5, "package"), "5 packages");
        assert_eq!(summary_text(&filter("  ", None), 5, 5, "package"), "5 packages");
        assert_eq!(summary_text(&filter("", None), 1, 1, "package"), "1 package");
    }

    #[test]
    fn search_only() {
        assert_eq!(
            summary_text(&filter("foo", None), 1, 2, "package"),
            "1 package found with search"
        );
    }

    #[test]
    fn all_plus_search_reads_as_search_only() {
        assert_eq!(
            summary_text(&filter("foo", Some("All")), 0, 2, "package"),
            "0 packages found with search"
        );
    }

    #[test]
    fn filter_only_and_combined() {
        assert_eq!(
            summary_text(&filter("", Some("io")), 3, 9, "package"),
            "3 packages found with filter 'io'"
        );
        assert_eq!(
            summary_text(&filter("x", Some("io")), 1, 9, "plugin"),
            "1 plugin found with search and filter 'io'"
        );
    }
}
