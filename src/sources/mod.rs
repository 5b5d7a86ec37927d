use crate::model::Entry;
use anyhow::Result;

pub trait Source {
    fn scan(&self) -> Result<Vec<Entry>>;
}

pub mod downloads;
pub mod index;
pub mod package;
pub mod packages;
