use std::time::Instant;

use crate::config::DebounceConfig;
use crate::debounce::{DebounceKey, Debouncer, Task};
use crate::matcher::SubstringMatcher;
use crate::model::{ALL_CATEGORY, Entry, FilterState};
use crate::state::CatalogState;
use crate::summary::summary_text;
use crate::ui::{Rebinder, RenderSink, UiError};

/// Owns the catalog snapshot and filter state and drives the injected
/// collaborators. UI steps are independent: a failing one is logged and
/// skipped, never propagated.
pub struct CatalogFilterEngine<R: RenderSink, B: Rebinder> {
    state: CatalogState,
    sink: R,
    rebinder: B,
    debouncer: Debouncer,
    delays: DebounceConfig,
    item_label: String,
    recomputes: usize,
}

fn attempt(step: &str, result: Result<(), UiError>) {
    if let Err(e) = result {
        log::warn!("CatalogFilterEngine: skipping {step}: {e}");
    }
}

impl<R: RenderSink, B: Rebinder> CatalogFilterEngine<R, B> {
    /// Captures the snapshot and performs the initial mount.
    pub fn new(entries: Vec<Entry>, sink: R, rebinder: B, delays: DebounceConfig, item_label: &str) -> Self {
        let mut engine = Self {
            state: CatalogState::new(entries),
            sink,
            rebinder,
            debouncer: Debouncer::new(),
            delays,
            item_label: item_label.to_string(),
            recomputes: 0,
        };
        log::info!(
            "CatalogFilterEngine: mounted {} entries in {} categories",
            engine.state.entries().len(),
            engine.state.category_index.categories().count()
        );
        engine.render_category_options();
        attempt("clear-search toggle", engine.sink.set_clear_search_visible(false));
        attempt("clear-filter toggle", engine.sink.set_clear_filter_visible(false));
        engine.recompute();
        engine
    }

    pub fn filter(&self) -> &FilterState {
        &self.state.filter
    }

    pub fn results(&self) -> Vec<&Entry> {
        self.state.results()
    }

    #[cfg(test)]
    pub fn sink(&self) -> &R {
        &self.sink
    }

    #[cfg(test)]
    pub fn rebinder(&self) -> &B {
        &self.rebinder
    }

    /// Number of recomputes run so far, including the initial mount.
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    pub fn set_query(&mut self, raw: &str, now: Instant) {
        self.state.set_query(raw);
        attempt("clear-search toggle", self.sink.set_clear_search_visible(!raw.is_empty()));
        self.debouncer
            .schedule(DebounceKey::QueryRecompute, now, self.delays.query(), Task::Recompute);
    }

    /// `None` and `"All"` both lift the category restriction. The option list
    /// and clear-filter affordance update immediately; results are debounced.
    pub fn set_category(&mut self, name: Option<&str>, now: Instant) {
        self.state.set_category(name);
        self.render_category_options();
        let specific = self.state.filter.has_category();
        attempt("clear-filter toggle", self.sink.set_clear_filter_visible(specific));
        self.debouncer
            .schedule(DebounceKey::CategoryRecompute, now, self.delays.category(), Task::Recompute);
    }

    pub fn clear_query(&mut self, now: Instant) {
        self.set_query("", now);
        attempt("search focus", self.sink.focus_search_input());
    }

    pub fn clear_category(&mut self, now: Instant) {
        self.set_category(None, now);
    }

    pub fn filter_category_options(&mut self, substring: &str, now: Instant) {
        self.debouncer.schedule(
            DebounceKey::CategoryOptionSearch,
            now,
            self.delays.category_search(),
            Task::FilterCategoryOptions(substring.to_string()),
        );
    }

    /// Keyboard clear on the option search box: applied at once, not debounced.
    pub fn clear_category_search(&mut self) {
        if self.debouncer.cancel(DebounceKey::CategoryOptionSearch) {
            log::debug!("CatalogFilterEngine: dropped pending option filter");
        }
        self.apply_option_filter("");
        attempt("category search blur", self.sink.blur_category_search());
    }

    pub fn recompute(&mut self) {
        self.recomputes += 1;
        self.state.update_filter();

        let results = self.state.results();
        let total = self.state.category_index.total();
        let summary = summary_text(&self.state.filter, results.len(), total, &self.item_label);

        attempt("entry render", self.sink.render_entries(&results));
        attempt("no-results toggle", self.sink.set_no_results_visible(results.is_empty()));
        attempt("summary", self.sink.set_summary(&summary));
        attempt("rebind", self.rebinder.rebind(&results));
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    #[cfg(test)]
    pub fn has_pending(&self) -> bool {
        self.debouncer.next_deadline().is_some()
    }

    /// Runs every debounced task whose quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) {
        for (key, task) in self.debouncer.take_due(now) {
            log::debug!("CatalogFilterEngine: firing {:?}", key);
            match task {
                Task::Recompute => self.recompute(),
                Task::FilterCategoryOptions(substring) => self.apply_option_filter(&substring),
            }
        }
    }

    /// Runs everything still pending, regardless of deadlines.
    pub fn flush(&mut self) {
        if let Some(deadline) = self.debouncer.latest_deadline() {
            self.poll(deadline);
        }
    }

    fn render_category_options(&mut self) {
        let options = self
            .state
            .category_index
            .options(self.state.filter.selected_category.as_deref());
        attempt("category options", self.sink.render_category_options(&options));
    }

    fn apply_option_filter(&mut self, substring: &str) {
        let matcher = SubstringMatcher::verbatim(substring);
        let mut visible = vec![ALL_CATEGORY];
        visible.extend(
            self.state
                .category_index
                .categories()
                .map(|(label, _)| label)
                .filter(|label| matcher.matches_label(label)),
        );
        attempt("category option filter", self.sink.show_category_options(&visible));
    }
}
