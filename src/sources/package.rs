use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::Entry;

static CONTAINER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/ ](?:[^ ]*[^/ ])?$").expect("valid container pattern"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{file}: invalid JSON: {reason}")]
    InvalidJson { file: String, reason: String },
    #[error("{file}: missing or empty '{field}' (string required)")]
    MissingField { file: String, field: &'static str },
    #[error("{file}: 'maintainer' must be an object with non-empty 'name' and 'email'")]
    Maintainer { file: String },
    #[error("{file}: 'tags' must be an array of non-empty strings")]
    Tags { file: String },
    #[error("{file}: 'includes' must be an object if present")]
    Includes { file: String },
    #[error("{file}: 'container' should be a slash-separated path without leading/trailing slash or spaces (got '{container}')")]
    Container { file: String, container: String },
    #[error("{file}: 'query' must look like 'group.artifact:tagPattern' (e.g., org.foo.bar:1.0-*)")]
    Query { file: String },
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Maintainer {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// One package as it appears in a package file or in the built index.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PackageRecord {
    pub name: Option<String>,
    pub version: Option<String>,
    pub query: Option<String>,
    pub container: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<String>,
    pub includes: Option<Value>,
    pub category: Option<String>,
    pub maintainer: Option<Maintainer>,
    pub tags: Option<Vec<String>>,
}

fn field(value: Option<&String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

impl PackageRecord {
    /// Snapshot of the searchable fields. `container` is the path the package
    /// is published under; its first segment is the fallback category.
    pub fn into_entry(self, container: &str) -> Entry {
        let mut tags: Vec<String> = self
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();

        let category = match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => container
                .trim_matches('/')
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string(),
        };

        let maintainer = self.maintainer.unwrap_or_default();
        Entry {
            name: field(self.name.as_ref()),
            description: field(self.description.as_ref()),
            version: field(self.version.as_ref()),
            maintainer_name: field(maintainer.name.as_ref()),
            maintainer_email: field(maintainer.email.as_ref()),
            query: field(self.query.as_ref()),
            tags: tags.join(" "),
            license: field(self.license.as_ref()),
            category,
        }
    }
}

fn is_nonempty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Checks a raw package file. Every problem is reported, not just the first.
pub fn validate_package(pkg: &Value, file: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for key in ["name", "version", "query", "container"] {
        if !is_nonempty_str(pkg.get(key)) {
            errors.push(ValidationError::MissingField { file: file.to_string(), field: key });
        }
    }

    let maintainer_ok = pkg
        .get("maintainer")
        .and_then(Value::as_object)
        .is_some_and(|m| is_nonempty_str(m.get("name")) && is_nonempty_str(m.get("email")));
    if !maintainer_ok {
        errors.push(ValidationError::Maintainer { file: file.to_string() });
    }

    let tags_ok = pkg
        .get("tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().all(|t| is_nonempty_str(Some(t))));
    if !tags_ok {
        errors.push(ValidationError::Tags { file: file.to_string() });
    }

    if pkg.get("includes").is_some_and(|i| !i.is_object()) {
        errors.push(ValidationError::Includes { file: file.to_string() });
    }

    if let Some(container) = pkg.get("container").and_then(Value::as_str) {
        if !container.is_empty() && !CONTAINER_RE.is_match(container) {
            errors.push(ValidationError::Container {
                file: file.to_string(),
                container: container.to_string(),
            });
        }
    }

    if let Some(query) = pkg.get("query").and_then(Value::as_str) {
        if !query.contains(':') {
            errors.push(ValidationError::Query { file: file.to_string() });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "name": " Foo Reader ",
            "version": "1.0",
            "query": "org.foo.reader:1.0-*",
            "container": "io/foo-reader",
            "maintainer": { "name": "Ada", "email": "ada@example.org" },
            "tags": ["1.0", "1.0", "0.9"],
            "license": "MIT"
        })
    }

    #[test]
    fn valid_package_has_no_errors() {
        assert!(validate_package(&valid(), "foo.json").is_empty());
    }

    #[test]
    fn reports_every_problem() {
        let pkg = json!({
            "name": "  ",
            "version": "1.0",
            "query": "no-colon",
            "container": "/leading",
            "maintainer": { "name": "Ada" },
            "tags": ["ok", ""],
            "includes": []
        });
        let errors = validate_package(&pkg, "bad.json");
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingField { file: "bad.json".into(), field: "name" },
                ValidationError::Maintainer { file: "bad.json".into() },
                ValidationError::Tags { file: "bad.json".into() },
                ValidationError::Includes { file: "bad.json".into() },
                ValidationError::Container { file: "bad.json".into(), container: "/leading".into() },
                ValidationError::Query { file: "bad.json".into() },
            ]
        );
    }

    #[test]
    fn container_rules() {
        for ok in ["a", "io/foo", "a/b/c"] {
            assert!(CONTAINER_RE.is_match(ok), "{ok}");
        }
        for bad in ["/a", "a/", "a b", "/"] {
            assert!(!CONTAINER_RE.is_match(bad), "{bad}");
        }
    }

    #[test]
    fn record_normalizes_into_entry() {
        let record: PackageRecord = serde_json::from_value(valid()).unwrap();
        let entry = record.into_entry("io/foo-reader");
        assert_eq!(entry.name, "Foo Reader");
        assert_eq!(entry.tags, "0.9 1.0");
        assert_eq!(entry.maintainer_email, "ada@example.org");
        assert_eq!(entry.description, "");
        assert_eq!(entry.category, "io");
    }

    #[test]
    fn explicit_category_wins_over_container() {
        let record = PackageRecord {
            category: Some("Imaging".into()),
            ..PackageRecord::default()
        };
        let entry = record.into_entry("io/x");
        assert_eq!(entry.category, "Imaging");
        assert_eq!(entry.name, "");
    }
}
