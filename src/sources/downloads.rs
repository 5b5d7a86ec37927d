use std::fmt;
use std::fs;

use log::{info, warn};
use serde_json::Value;
use thiserror::Error;

use crate::sources::packages::PackagesSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    Http,
    Oras,
}

impl fmt::Display for DownloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadKind::Http => f.write_str("http"),
            DownloadKind::Oras => f.write_str("oras"),
        }
    }
}

/// One downloadable artifact: a package file, one of its tags, and where to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file: String,
    pub tag: String,
    pub kind: DownloadKind,
    pub uri: String,
}

impl fmt::Display for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} : {} : {}", self.file, self.tag, self.kind, self.uri)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DownloadError {
    #[error("{file}: invalid JSON: {reason}")]
    InvalidJson { file: String, reason: String },
    #[error("{file}: HTTP source names unknown tag '{tag}'")]
    UnknownTag { file: String, tag: String },
    #[error("{file}: HTTP source URL for tag '{tag}' must be a string")]
    BadUrl { file: String, tag: String },
    #[error("{file}: oras source needs an 'oci-ref' string")]
    MissingOciRef { file: String },
}

fn strings(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Expands a package's `sources` into one download per tag. HTTP sources map
/// tags to URLs and may only name declared tags; oras sources publish every
/// declared tag as `oci-ref:tag`. Unknown source types are skipped.
pub fn downloads_for_package(pkg: &Value, file: &str) -> Result<Vec<Download>, DownloadError> {
    let tags = strings(pkg.get("tags"));
    let sources = pkg.get("sources").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();

    let mut downloads = Vec::new();
    for source in sources {
        match source.get("type").and_then(Value::as_str) {
            Some("http") => {
                let urls = source.get("urls").and_then(Value::as_object);
                for (tag, url) in urls.into_iter().flatten() {
                    if !tags.contains(&tag.as_str()) {
                        return Err(DownloadError::UnknownTag {
                            file: file.to_string(),
                            tag: tag.clone(),
                        });
                    }
                    let uri = url.as_str().ok_or_else(|| DownloadError::BadUrl {
                        file: file.to_string(),
                        tag: tag.clone(),
                    })?;
                    downloads.push(Download {
                        file: file.to_string(),
                        tag: tag.clone(),
                        kind: DownloadKind::Http,
                        uri: uri.to_string(),
                    });
                }
            }
            Some("oras") => {
                let oci_ref = source
                    .get("oci-ref")
                    .and_then(Value::as_str)
                    .ok_or_else(|| DownloadError::MissingOciRef { file: file.to_string() })?;
                downloads.extend(tags.iter().map(|tag| Download {
                    file: file.to_string(),
                    tag: tag.to_string(),
                    kind: DownloadKind::Oras,
                    uri: format!("{oci_ref}:{tag}"),
                }));
            }
            other => warn!("{}: unknown source type {:?}", file, other.unwrap_or_default()),
        }
    }
    Ok(downloads)
}

/// Downloads for every package file under the source's directory, in path order.
pub fn collect_downloads(source: &PackagesSource) -> Result<Vec<Download>, DownloadError> {
    let files = source.package_files();
    if files.is_empty() {
        warn!("No package JSON files found under {:?}", source.dir);
    }

    let mut downloads = Vec::new();
    for path in files {
        let file = source.display_name(&path);
        let pkg: Value = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()))
            .map_err(|reason| DownloadError::InvalidJson { file: file.clone(), reason })?;
        downloads.extend(downloads_for_package(&pkg, &file)?);
    }
    info!("Collected {} download(s)", downloads.len());
    Ok(downloads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn oras_source_yields_one_download_per_tag() {
        let pkg = json!({
            "tags": ["1.0", "1.1"],
            "sources": [{ "type": "oras", "oci-ref": "ghcr.io/acme/reader" }]
        });
        let downloads = downloads_for_package(&pkg, "io/reader.json").unwrap();
        let uris: Vec<_> = downloads.iter().map(|d| d.uri.as_str()).collect();
        assert_eq!(uris, vec!["ghcr.io/acme/reader:1.0", "ghcr.io/acme/reader:1.1"]);
        assert_eq!(
            downloads[0].to_string(),
            "io/reader.json : 1.0 : oras : ghcr.io/acme/reader:1.0"
        );
    }

    #[test]
    fn http_source_maps_declared_tags_to_urls() {
        let pkg = json!({
            "tags": ["1.0", "2.0"],
            "sources": [{ "type": "http", "urls": { "2.0": "https://acme.org/r-2.0.zip" } }]
        });
        let downloads = downloads_for_package(&pkg, "r.json").unwrap();
        assert_eq!(
            downloads,
            vec![Download {
                file: "r.json".into(),
                tag: "2.0".into(),
                kind: DownloadKind::Http,
                uri: "https://acme.org/r-2.0.zip".into(),
            }]
        );
    }

    #[test]
    fn http_source_rejects_undeclared_tag() {
        let pkg = json!({
            "tags": ["1.0"],
            "sources": [{ "type": "http", "urls": { "9.9": "https://acme.org/x.zip" } }]
        });
        assert_eq!(
            downloads_for_package(&pkg, "r.json"),
            Err(DownloadError::UnknownTag { file: "r.json".into(), tag: "9.9".into() })
        );
    }

    #[test]
    fn unknown_source_types_are_skipped() {
        let pkg = json!({
            "tags": ["1.0"],
            "sources": [{ "type": "ftp" }, { "type": "oras", "oci-ref": "ghcr.io/a/b" }]
        });
        assert_eq!(downloads_for_package(&pkg, "r.json").unwrap().len(), 1);
    }

    #[test]
    fn collects_across_package_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{ "tags": ["1"], "sources": [{ "type": "oras", "oci-ref": "ghcr.io/x/a" }] }"#,
        )
        .unwrap();
        fs::write(dir.path().join("b.json"), r#"{ "tags": ["1"] }"#).unwrap();

        let downloads = collect_downloads(&PackagesSource::new(dir.path(), false)).unwrap();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].file, "a.json");
    }
}
