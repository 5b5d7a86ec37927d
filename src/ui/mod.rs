use crate::model::{CategoryOption, Entry};
use thiserror::Error;

pub mod render;
pub mod terminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    EntryGrid,
    NoResults,
    Summary,
    CategoryList,
    CategorySearch,
    SearchInput,
    ClearSearch,
    ClearFilter,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UiError {
    #[error("{0:?} is not mounted")]
    Missing(Widget),
    #[error("failed to draw {widget:?}: {reason}")]
    Draw { widget: Widget, reason: String },
}

/// Everything the engine draws into. Each call touches one widget and may
/// fail independently of the others.
pub trait RenderSink {
    fn render_entries(&mut self, entries: &[&Entry]) -> Result<(), UiError>;
    fn set_no_results_visible(&mut self, visible: bool) -> Result<(), UiError>;
    fn set_summary(&mut self, text: &str) -> Result<(), UiError>;
    fn render_category_options(&mut self, options: &[CategoryOption]) -> Result<(), UiError>;
    /// Shows only the option rows whose labels are listed; hides the rest.
    fn show_category_options(&mut self, visible: &[&str]) -> Result<(), UiError>;
    fn set_clear_search_visible(&mut self, visible: bool) -> Result<(), UiError>;
    fn set_clear_filter_visible(&mut self, visible: bool) -> Result<(), UiError>;
    fn focus_search_input(&mut self) -> Result<(), UiError>;
    fn blur_category_search(&mut self) -> Result<(), UiError>;
}

/// Re-attaches copy/interaction handlers to freshly rendered entries.
pub trait Rebinder {
    fn rebind(&mut self, entries: &[&Entry]) -> Result<(), UiError>;
}
