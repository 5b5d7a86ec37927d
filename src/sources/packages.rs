use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use log::{debug, info, warn};
use serde_json::Value;
use walkdir::WalkDir;

use crate::model::Entry;
use crate::sources::Source;
use crate::sources::package::{PackageRecord, ValidationError, validate_package};

/// A directory tree of per-package JSON files.
pub struct PackagesSource {
    pub dir: PathBuf,
    pub strict: bool,
}

/// Valid packages keyed by container, plus every problem found.
#[derive(Debug, Default)]
pub struct Collected {
    pub packages: BTreeMap<String, PackageRecord>,
    pub errors: Vec<ValidationError>,
}

impl Collected {
    /// Catalog entries in container order.
    pub fn entries(&self) -> Vec<Entry> {
        self.packages
            .iter()
            .map(|(container, record)| record.clone().into_entry(container))
            .collect()
    }
}

impl PackagesSource {
    pub fn new(dir: impl Into<PathBuf>, strict: bool) -> Self {
        Self {
            dir: dir.into(),
            strict,
        }
    }

    /// Every `*.json` file under the directory, in sorted path order.
    pub fn package_files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect()
    }

    pub fn display_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.dir)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    pub fn collect(&self) -> Collected {
        let files = self.package_files();
        if files.is_empty() {
            warn!("PackagesSource: no package JSON files found under {:?}", self.dir);
        }

        let mut collected = Collected::default();
        for path in files {
            let file = self.display_name(&path);
            debug!("PackagesSource: reading {}", file);

            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()));
            let raw = match parsed {
                Ok(raw) => raw,
                Err(reason) => {
                    collected.errors.push(ValidationError::InvalidJson { file, reason });
                    continue;
                }
            };

            let errors = validate_package(&raw, &file);
            if !errors.is_empty() {
                collected.errors.extend(errors);
                continue;
            }

            match serde_json::from_value::<PackageRecord>(raw) {
                Ok(record) => {
                    let container = record
                        .container
                        .as_deref()
                        .unwrap_or_default()
                        .trim_matches('/')
                        .to_string();
                    if collected.packages.insert(container.clone(), record).is_some() {
                        warn!("PackagesSource: {} replaces an earlier package for '{}'", file, container);
                    }
                }
                Err(e) => collected.errors.push(ValidationError::InvalidJson {
                    file,
                    reason: e.to_string(),
                }),
            }
        }
        collected
    }
}

impl Source for PackagesSource {
    fn scan(&self) -> Result<Vec<Entry>> {
        let collected = self.collect();
        let errors = &collected.errors;

        for e in errors {
            warn!("PackagesSource: {}", e);
        }
        if self.strict && !errors.is_empty() {
            let list: Vec<String> = errors.iter().map(|e| format!(" - {e}")).collect();
            bail!(
                "validation failed for one or more package files:\n{}",
                list.join("\n")
            );
        }
        if !errors.is_empty() {
            warn!("PackagesSource: skipped {} problem(s); catalog contains only valid packages", errors.len());
        }

        let entries = collected.entries();
        info!("PackagesSource: found {} entries", entries.len());
        Ok(entries)
    }
}
