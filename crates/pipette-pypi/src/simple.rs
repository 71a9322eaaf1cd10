//! PEP 691 JSON simple repository API.

use std::collections::HashMap;

use serde::Deserialize;

/// Media type requested from the index.
pub const SIMPLE_JSON_ACCEPT: &str = "application/vnd.pypi.simple.v1+json";

/// `GET {index}/{project}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPage {
    pub name: String,
    pub files: Vec<ProjectFile>,
}

/// One distribution file of a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFile {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub hashes: HashMap<String, String>,
    #[serde(default, rename = "requires-python")]
    pub requires_python: Option<String>,
    #[serde(default)]
    pub yanked: Yanked,
}

/// `yanked` is either a flag or the reason the file was yanked.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Yanked {
    Flag(bool),
    Reason(String),
}

impl Default for Yanked {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl ProjectFile {
    pub fn is_yanked(&self) -> bool {
        match &self.yanked {
            Yanked::Flag(flag) => *flag,
            Yanked::Reason(_) => true,
        }
    }

    /// SHA-256 digest from `hashes`, or from a `#sha256=` URL fragment.
    pub fn sha256(&self) -> Option<String> {
        if let Some(hash) = self.hashes.get("sha256") {
            return Some(hash.to_ascii_lowercase());
        }
        let (_, fragment) = self.url.split_once('#')?;
        fragment
            .strip_prefix("sha256=")
            .map(|hash| hash.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "meta": {"api-version": "1.1"},
        "name": "idna",
        "files": [
            {
                "filename": "idna-3.3-py3-none-any.whl",
                "url": "https://files.example/idna-3.3-py3-none-any.whl",
                "hashes": {"sha256": "ABCDEF"},
                "requires-python": ">=3.5",
                "yanked": false
            },
            {
                "filename": "idna-3.4-py3-none-any.whl",
                "url": "../../packages/idna-3.4-py3-none-any.whl#sha256=0123",
                "hashes": {},
                "yanked": "broken metadata"
            }
        ]
    }"#;

    #[test]
    fn parses_project_page() {
        let page: ProjectPage = serde_json::from_str(PAGE).unwrap();
        assert_eq!(page.name, "idna");
        assert_eq!(page.files.len(), 2);

        let first = &page.files[0];
        assert!(!first.is_yanked());
        assert_eq!(first.requires_python.as_deref(), Some(">=3.5"));
        assert_eq!(first.sha256().as_deref(), Some("abcdef"));

        let second = &page.files[1];
        assert!(second.is_yanked());
        assert!(second.requires_python.is_none());
        assert_eq!(second.sha256().as_deref(), Some("0123"));
    }
}
