use std::str::FromStr;
use thiserror::Error;

/// One host-page interaction, read as a single stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Search(String),
    ClearSearch,
    Category(Option<String>),
    ClearCategory,
    CategorySearch(String),
    Escape,
    Copy(usize),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'copy' needs a positive entry number, got '{0}'")]
    BadPosition(String),
}

impl FromStr for InputEvent {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(rest) = line.strip_prefix('/') {
            return Ok(InputEvent::Search(rest.to_string()));
        }

        let trimmed = line.trim_start();
        let (verb, payload) = match trimmed.split_once(char::is_whitespace) {
            Some((verb, payload)) => (verb, payload),
            None => (trimmed.trim_end(), ""),
        };

        match verb {
            "search" => Ok(InputEvent::Search(payload.to_string())),
            "clear-search" => Ok(InputEvent::ClearSearch),
            "category" => {
                let name = payload.trim();
                Ok(InputEvent::Category(if name.is_empty() { None } else { Some(name.to_string()) }))
            }
            "clear-category" => Ok(InputEvent::ClearCategory),
            "options" => Ok(InputEvent::CategorySearch(payload.to_string())),
            "escape" => Ok(InputEvent::Escape),
            "copy" => payload
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(InputEvent::Copy)
                .ok_or_else(|| InputError::BadPosition(payload.trim().to_string())),
            "quit" | "exit" => Ok(InputEvent::Quit),
            other => Err(InputError::Unknown(other.to_string())),
        }
    }
}
