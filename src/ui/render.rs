use crate::model::{CategoryOption, Entry};

/// Plain-text layout for entry cards and category rows.
pub struct Renderer {
    pub show_details: bool,
}

impl Renderer {
    pub fn new(show_details: bool) -> Self {
        Self { show_details }
    }

    pub fn draw_card(&self, position: usize, entry: &Entry) -> String {
        let mut card = format!("{:>3}. {}", position + 1, entry.name);
        if !entry.version.is_empty() {
            card.push_str(&format!(" {}", entry.version));
        }
        if !entry.category.is_empty() {
            card.push_str(&format!(" [{}]", entry.category));
        }

        if self.show_details {
            if !entry.description.is_empty() {
                card.push_str(&format!("\n     {}", entry.description));
            }
            let maintainer = match (entry.maintainer_name.is_empty(), entry.maintainer_email.is_empty()) {
                (false, false) => format!("{} <{}>", entry.maintainer_name, entry.maintainer_email),
                (false, true) => entry.maintainer_name.clone(),
                (true, false) => format!("<{}>", entry.maintainer_email),
                (true, true) => String::new(),
            };
            if !maintainer.is_empty() {
                card.push_str(&format!("\n     by {maintainer}"));
            }
            if !entry.license.is_empty() {
                card.push_str(&format!("\n     license: {}", entry.license));
            }
            if !entry.tags.is_empty() {
                card.push_str(&format!("\n     tags: {}", entry.tags));
            }
        }
        if !entry.query.is_empty() {
            card.push_str(&format!("\n     $ {}", entry.query));
        }
        card
    }

    pub fn draw_option(&self, option: &CategoryOption) -> String {
        let marker = if option.selected { '*' } else { ' ' };
        format!("{marker} {} ({})", option.label, option.count)
    }
}
