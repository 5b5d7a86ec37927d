use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Entry;
use crate::sources::Source;
use crate::sources::package::PackageRecord;

pub const INDEX_VERSION: u32 = 1;

/// Built catalog index, keyed by container path.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Index {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub packages: BTreeMap<String, Value>,
}

#[derive(Serialize, Debug)]
struct IndexedMaintainer {
    name: String,
    email: String,
}

/// One package as written to the index.
#[derive(Serialize, Debug)]
struct IndexedPackage {
    name: String,
    version: String,
    query: String,
    tags: Vec<String>,
    maintainer: IndexedMaintainer,
    updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    includes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

impl IndexedPackage {
    fn from_record(record: &PackageRecord, updated: &str) -> Self {
        let mut tags = record.tags.clone().unwrap_or_default();
        tags.sort();
        tags.dedup();

        let maintainer = record.maintainer.clone().unwrap_or_default();
        Self {
            name: trimmed(&record.name),
            version: trimmed(&record.version),
            query: trimmed(&record.query),
            tags,
            maintainer: IndexedMaintainer {
                name: trimmed(&maintainer.name),
                email: trimmed(&maintainer.email),
            },
            updated: updated.to_string(),
            description: record.description.clone(),
            homepage: record.homepage.clone(),
            license: record.license.clone(),
            includes: record.includes.clone(),
            category: record.category.clone(),
        }
    }
}

/// Timestamp in the index's `updated` format.
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Assembles an index from validated packages keyed by container.
pub fn build_index(
    packages: &BTreeMap<String, PackageRecord>,
    owner: &str,
    repo: &str,
    prefix: &str,
    updated: &str,
) -> Result<Index> {
    let base = if owner.is_empty() || repo.is_empty() {
        String::new()
    } else {
        format!("ghcr.io/{owner}/{repo}")
    };

    let mut indexed = BTreeMap::new();
    for (container, record) in packages {
        let value = serde_json::to_value(IndexedPackage::from_record(record, updated))
            .with_context(|| format!("serializing package '{container}'"))?;
        indexed.insert(container.clone(), value);
    }

    Ok(Index {
        version: INDEX_VERSION,
        owner: owner.to_string(),
        repo: repo.to_string(),
        base,
        prefix: prefix.to_string(),
        updated: updated.to_string(),
        packages: indexed,
    })
}

/// Writes the index as pretty JSON with sorted keys, creating parent dirs.
pub fn write_index(index: &Index, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    // Going through Value sorts the top-level keys as well.
    let value = serde_json::to_value(index)?;
    let content = serde_json::to_string_pretty(&value)?;
    fs::write(path, content).with_context(|| format!("writing index {}", path.display()))?;
    Ok(())
}

pub struct IndexSource {
    pub path: PathBuf,
}

impl IndexSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Entries in ascending container order. Records that do not deserialize are
/// skipped with a warning.
pub fn entries_from_index(index: Index) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(index.packages.len());
    for (container, raw) in index.packages {
        match serde_json::from_value::<PackageRecord>(raw) {
            Ok(record) => entries.push(record.into_entry(&container)),
            Err(e) => warn!("IndexSource: skipping '{}': {}", container, e),
        }
    }
    entries
}

impl Source for IndexSource {
    fn scan(&self) -> Result<Vec<Entry>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading index {}", self.path.display()))?;
        let index: Index = serde_json::from_str(&content)
            .with_context(|| format!("parsing index {}", self.path.display()))?;
        info!(
            "IndexSource: index v{} for {}/{} at '{}' (prefix '{}') updated {}",
            index.version, index.owner, index.repo, index.base, index.prefix, index.updated
        );

        let entries = entries_from_index(index);
        info!("IndexSource: found {} entries", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"{
        "version": 1,
        "owner": "acme",
        "repo": "catalog",
        "base": "ghcr.io/acme/catalog",
        "prefix": "maven",
        "updated": "2025-01-01T00:00:00Z",
        "packages": {
            "viz/plotter": {
                "name": "Plotter",
                "version": "2.0",
                "query": "org.acme.plotter:2.0-*",
                "tags": ["2.0"],
                "maintainer": { "name": "Bo", "email": "bo@acme.org" }
            },
            "io/reader": {
                "name": "Reader",
                "version": "1.0",
                "query": "org.acme.reader:1.0-*",
                "tags": ["1.0"],
                "maintainer": { "name": "Ada", "email": "ada@acme.org" },
                "license": "MIT",
                "category": "Input"
            },
            "io/broken": { "name": 42 }
        }
    }"#;

    #[test]
    fn scan_orders_by_container_and_skips_bad_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        fs::write(&path, INDEX).unwrap();

        let entries = IndexSource::new(&path).scan().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Reader", "Plotter"]);
        assert_eq!(entries[0].category, "Input");
        assert_eq!(entries[1].category, "viz");
        assert_eq!(entries[1].license, "");
    }

    #[test]
    fn built_index_reads_back_like_the_package_dir() {
        use crate::sources::packages::PackagesSource;

        let dir = tempfile::tempdir().unwrap();
        let packages = dir.path().join("packages");
        fs::create_dir_all(packages.join("io")).unwrap();
        fs::write(
            packages.join("io/reader.json"),
            r#"{
                "name": "Reader",
                "version": "1.0",
                "query": "org.acme.reader:1.0-*",
                "container": "io/reader",
                "maintainer": { "name": "Ada", "email": "ada@acme.org" },
                "tags": ["1.0", "0.9", "1.0"],
                "license": "MIT",
                "homepage": "https://acme.org/reader",
                "includes": { "docs": true }
            }"#,
        )
        .unwrap();
        fs::write(
            packages.join("plotter.json"),
            r#"{
                "name": "Plotter",
                "version": "2.0",
                "query": "org.acme.plotter:2.0-*",
                "container": "viz/plotter",
                "maintainer": { "name": "Bo", "email": "bo@acme.org" },
                "tags": ["2.0"]
            }"#,
        )
        .unwrap();

        let source = PackagesSource::new(&packages, true);
        let collected = source.collect();
        assert!(collected.errors.is_empty());

        let index = build_index(&collected.packages, "acme", "catalog", "maven", "2025-01-01T00:00:00Z").unwrap();
        assert_eq!(index.base, "ghcr.io/acme/catalog");
        assert_eq!(index.version, 1);

        let out = dir.path().join("dist/index.json");
        write_index(&index, &out).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let reader = &written["packages"]["io/reader"];
        assert_eq!(reader["tags"], serde_json::json!(["0.9", "1.0"]));
        assert_eq!(reader["updated"], "2025-01-01T00:00:00Z");
        assert_eq!(reader["homepage"], "https://acme.org/reader");
        assert!(written["packages"]["viz/plotter"].get("license").is_none());
        assert_eq!(written["prefix"], "maven");

        let from_index = IndexSource::new(&out).scan().unwrap();
        assert_eq!(from_index, source.scan().unwrap());
    }

    #[test]
    fn base_is_empty_without_owner_and_repo() {
        let index = build_index(&BTreeMap::new(), "", "catalog", "maven", "t").unwrap();
        assert_eq!(index.base, "");
        assert!(index.packages.is_empty());
    }

    #[test]
    fn missing_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(IndexSource::new(dir.path().join("none.json")).scan().is_err());
    }
}
