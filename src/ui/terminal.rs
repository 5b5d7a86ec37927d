use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::config::WidgetsConfig;
use crate::model::{CategoryOption, Entry};
use crate::ui::render::Renderer;
use crate::ui::{Rebinder, RenderSink, UiError, Widget};

/// Draws the catalog as text. Widgets disabled in config behave as unmounted.
pub struct TerminalSink<W: Write> {
    out: W,
    renderer: Renderer,
    widgets: WidgetsConfig,
    options: Vec<CategoryOption>,
    clear_search_shown: bool,
    clear_filter_shown: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, renderer: Renderer, widgets: WidgetsConfig) -> Self {
        Self {
            out,
            renderer,
            widgets,
            options: Vec::new(),
            clear_search_shown: false,
            clear_filter_shown: false,
        }
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    fn mounted(&self, widget: Widget) -> Result<(), UiError> {
        let on = match widget {
            Widget::CategoryList | Widget::CategorySearch => self.widgets.category_list,
            Widget::Summary => self.widgets.summary,
            Widget::NoResults => self.widgets.no_results,
            Widget::ClearSearch => self.widgets.clear_search,
            Widget::ClearFilter => self.widgets.clear_filter,
            Widget::EntryGrid | Widget::SearchInput => true,
        };
        if on { Ok(()) } else { Err(UiError::Missing(widget)) }
    }

    fn write_line(&mut self, widget: Widget, line: &str) -> Result<(), UiError> {
        writeln!(self.out, "{line}").map_err(|e| UiError::Draw {
            widget,
            reason: e.to_string(),
        })
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn render_entries(&mut self, entries: &[&Entry]) -> Result<(), UiError> {
        self.mounted(Widget::EntryGrid)?;
        let cards: Vec<String> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| self.renderer.draw_card(i, e))
            .collect();
        for card in cards {
            self.write_line(Widget::EntryGrid, &card)?;
        }
        Ok(())
    }

    fn set_no_results_visible(&mut self, visible: bool) -> Result<(), UiError> {
        self.mounted(Widget::NoResults)?;
        if visible {
            self.write_line(Widget::NoResults, "(no results)")?;
        }
        Ok(())
    }

    fn set_summary(&mut self, text: &str) -> Result<(), UiError> {
        self.mounted(Widget::Summary)?;
        self.write_line(Widget::Summary, &format!("== {text}"))
    }

    fn render_category_options(&mut self, options: &[CategoryOption]) -> Result<(), UiError> {
        self.mounted(Widget::CategoryList)?;
        self.options = options.to_vec();
        let rows: Vec<String> = options.iter().map(|o| self.renderer.draw_option(o)).collect();
        self.write_line(Widget::CategoryList, &format!("categories: {}", rows.join(" | ")))
    }

    fn show_category_options(&mut self, visible: &[&str]) -> Result<(), UiError> {
        self.mounted(Widget::CategorySearch)?;
        let rows: Vec<String> = self
            .options
            .iter()
            .filter(|o| visible.contains(&o.label.as_str()))
            .map(|o| self.renderer.draw_option(o))
            .collect();
        self.write_line(Widget::CategorySearch, &format!("categories: {}", rows.join(" | ")))
    }

    fn set_clear_search_visible(&mut self, visible: bool) -> Result<(), UiError> {
        self.mounted(Widget::ClearSearch)?;
        if visible != self.clear_search_shown {
            self.clear_search_shown = visible;
            let line = if visible { "[clear-search available]" } else { "[clear-search hidden]" };
            self.write_line(Widget::ClearSearch, line)?;
        }
        Ok(())
    }

    fn set_clear_filter_visible(&mut self, visible: bool) -> Result<(), UiError> {
        self.mounted(Widget::ClearFilter)?;
        if visible != self.clear_filter_shown {
            self.clear_filter_shown = visible;
            let line = if visible { "[clear-category available]" } else { "[clear-category hidden]" };
            self.write_line(Widget::ClearFilter, line)?;
        }
        Ok(())
    }

    fn focus_search_input(&mut self) -> Result<(), UiError> {
        self.mounted(Widget::SearchInput)?;
        log::debug!("TerminalSink: search input focused");
        Ok(())
    }

    fn blur_category_search(&mut self) -> Result<(), UiError> {
        self.mounted(Widget::CategorySearch)?;
        log::debug!("TerminalSink: category search blurred");
        Ok(())
    }
}

/// Command strings of the visible entries, by position, for `copy <n>`.
#[derive(Clone, Default)]
pub struct CopyTargets {
    queries: Rc<RefCell<Vec<String>>>,
}

impl CopyTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based lookup, matching the numbering on rendered cards.
    pub fn get(&self, position: usize) -> Option<String> {
        let queries = self.queries.borrow();
        position.checked_sub(1).and_then(|i| queries.get(i).cloned())
    }

    pub fn len(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl Rebinder for CopyTargets {
    fn rebind(&mut self, entries: &[&Entry]) -> Result<(), UiError> {
        let mut queries = self.queries.borrow_mut();
        queries.clear();
        queries.extend(entries.iter().map(|e| e.query.clone()));
        log::debug!("CopyTargets: bound {} copy targets", queries.len());
        Ok(())
    }
}
