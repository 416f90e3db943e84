//! Host-list loading and domain normalization.
//!
//! The host list is a JSON file holding the hosts seen in browsing history.
//! Two shapes are accepted:
//!
//! ```json
//! ["www.example.com", "news.example.org"]
//! ```
//!
//! ```json
//! { "domains": ["www.example.com", "news.example.org"] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FlocError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostListFile {
    List(Vec<String>),
    Object { domains: Vec<String> },
}

impl HostListFile {
    fn into_domains(self) -> Vec<String> {
        match self {
            HostListFile::List(domains) | HostListFile::Object { domains } => domains,
        }
    }
}

/// Ordered, normalized list of hosts. Immutable once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DomainList(Vec<String>);

impl DomainList {
    /// Normalize and collect hosts, rejecting blank entries.
    pub fn new<I, S>(domains: I) -> Result<Self, FlocError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        domains
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                normalize_domain(raw.as_ref()).ok_or(FlocError::EmptyDomain { index })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Read and parse a host-list file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FlocError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| FlocError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse host-list JSON held in memory.
    pub fn from_json_str(json: &str) -> Result<Self, FlocError> {
        Self::parse(json, Path::new("<memory>"))
    }

    fn parse(json: &str, origin: &Path) -> Result<Self, FlocError> {
        let file: HostListFile =
            serde_json::from_str(json).map_err(|source| FlocError::HostListParse {
                path: origin.to_path_buf(),
                source,
            })?;
        Self::new(file.into_domains())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Trim whitespace and a trailing root dot, then lowercase.
///
/// Returns `None` when nothing is left.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(
            normalize_domain("  WWW.Example.COM. ").as_deref(),
            Some("www.example.com")
        );
    }

    #[test]
    fn normalize_rejects_blank() {
        assert_eq!(normalize_domain("   "), None);
        assert_eq!(normalize_domain("."), None);
    }

    #[test]
    fn new_reports_index_of_blank_entry() {
        let err = DomainList::new(["a.com", "b.com", " "]).unwrap_err();
        assert!(matches!(err, FlocError::EmptyDomain { index: 2 }));
    }

    #[test]
    fn new_keeps_order_and_duplicates() {
        let list = DomainList::new(["b.com", "A.com", "b.com"]).unwrap();
        assert_eq!(list.as_slice(), ["b.com", "a.com", "b.com"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn parses_bare_array() {
        let list = DomainList::from_json_str(r#"["example.com", "example.org"]"#).unwrap();
        assert_eq!(list.as_slice(), ["example.com", "example.org"]);
    }

    #[test]
    fn parses_domains_object() {
        let list = DomainList::from_json_str(r#"{"domains": ["Example.com"]}"#).unwrap();
        assert_eq!(list.as_slice(), ["example.com"]);
    }

    #[test]
    fn empty_array_is_valid() {
        let list = DomainList::from_json_str("[]").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = DomainList::from_json_str(r#"{"hosts": 3}"#).unwrap_err();
        assert!(matches!(err, FlocError::HostListParse { .. }));
    }

    #[test]
    fn from_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["news.example.com"]"#).unwrap();
        let list = DomainList::from_file(file.path()).unwrap();
        assert_eq!(list.as_slice(), ["news.example.com"]);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host_list.json");
        let err = DomainList::from_file(&path).unwrap_err();
        match err {
            FlocError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serializes_as_plain_array() {
        let list = DomainList::new(["a.com"]).unwrap();
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["a.com"]"#);
    }
}
