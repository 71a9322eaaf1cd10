//! Wheel `METADATA` files and installed distributions.

use std::path::{Path, PathBuf};

use pipette_util::errors::PipetteError;

use crate::condition::normalize_name;
use crate::dependency::Dependency;

/// The header block of a core metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    pub version: String,
    pub requires_python: Option<String>,
    pub requires_dist: Vec<Dependency>,
    pub provides_extra: Vec<String>,
}

impl Metadata {
    /// Parse the RFC 822 style headers. Parsing stops at the first blank line,
    /// where the long description begins.
    pub fn parse(text: &str) -> Result<Self, PipetteError> {
        let mut headers: Vec<(String, String)> = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                break;
            }
            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = headers.last_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
            }
        }

        let mut meta = Metadata::default();
        for (key, value) in headers {
            match key.as_str() {
                "name" => meta.name = value,
                "version" => meta.version = value,
                "requires-python" => meta.requires_python = Some(value),
                "requires-dist" => meta.requires_dist.push(Dependency::from_requires_dist(&value)),
                "provides-extra" => meta.provides_extra.push(value),
                _ => {}
            }
        }

        if meta.name.is_empty() || meta.version.is_empty() {
            return Err(PipetteError::Metadata {
                message: "METADATA is missing Name or Version".to_string(),
            });
        }
        Ok(meta)
    }
}

/// A distribution present in a package store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub metadata: Metadata,
    meta_directory: PathBuf,
}

impl InstalledPackage {
    pub fn new(metadata: Metadata, meta_directory: impl Into<PathBuf>) -> Self {
        Self {
            metadata,
            meta_directory: meta_directory.into(),
        }
    }

    /// Read `METADATA` from a `.dist-info` directory.
    pub fn read(meta_directory: &Path) -> Result<Self, PipetteError> {
        let path = meta_directory.join("METADATA");
        let text = std::fs::read_to_string(&path).map_err(|e| PipetteError::Metadata {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Ok(Self::new(Metadata::parse(&text)?, meta_directory))
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    /// The `.dist-info` directory this package was loaded from.
    pub fn meta_directory(&self) -> &Path {
        &self.meta_directory
    }

    /// Requirements that are not tied to an extra.
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.metadata
            .requires_dist
            .iter()
            .filter(|dep| !dep.is_extra)
            .cloned()
            .collect()
    }

    /// Whether the package declares the extra `name`.
    pub fn has_extra(&self, name: &str) -> bool {
        let wanted = normalize_name(name);
        self.metadata
            .provides_extra
            .iter()
            .any(|extra| normalize_name(extra) == wanted)
    }

    /// Requirements selected by the extra `name`.
    pub fn extra_dependencies(&self, name: &str) -> Result<Vec<Dependency>, PipetteError> {
        let mut selected = Vec::new();
        for dep in &self.metadata.requires_dist {
            if dep.belongs_to_extra(name)? {
                selected.push(dep.clone());
            }
        }
        if selected.is_empty() && !self.has_extra(name) {
            return Err(PipetteError::MissingExtra {
                name: name.to_string(),
            });
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUESTS: &str = "\
Metadata-Version: 2.1
Name: requests
Version: 2.31.0
Summary: Python HTTP for Humans.
Requires-Python: >=3.7
License: Apache 2.0
Requires-Dist: charset-normalizer (<4,>=2)
Requires-Dist: idna (<4,>=2.5)
Requires-Dist: urllib3 (<3,>=1.21.1)
Requires-Dist: certifi (>=2017.4.17)
Provides-Extra: security
Provides-Extra: socks
Requires-Dist: PySocks (!=1.5.7,>=1.5.6) ; extra == 'socks'
Provides-Extra: use_chardet_on_py3
Requires-Dist: chardet (<6,>=3.0.2) ; extra == 'use_chardet_on_py3'

# Requests

Requires-Dist: not-a-header
";

    #[test]
    fn parses_requests_metadata() {
        let meta = Metadata::parse(REQUESTS).unwrap();
        assert_eq!(meta.name, "requests");
        assert_eq!(meta.version, "2.31.0");
        assert_eq!(meta.requires_python.as_deref(), Some(">=3.7"));
        assert_eq!(meta.requires_dist.len(), 6);
        assert_eq!(meta.provides_extra, vec!["security", "socks", "use_chardet_on_py3"]);
    }

    #[test]
    fn splits_base_and_extra_dependencies() {
        let pkg = InstalledPackage::new(Metadata::parse(REQUESTS).unwrap(), "/tmp/x");
        let base: Vec<String> = pkg
            .dependencies()
            .iter()
            .map(|d| d.raw_value.clone())
            .collect();
        assert_eq!(
            base,
            vec![
                "charset-normalizer (<4,>=2)",
                "idna (<4,>=2.5)",
                "urllib3 (<3,>=1.21.1)",
                "certifi (>=2017.4.17)"
            ]
        );

        let socks = pkg.extra_dependencies("socks").unwrap();
        assert_eq!(socks.len(), 1);
        assert_eq!(socks[0].raw_value, "PySocks (!=1.5.7,>=1.5.6)");

        let chardet = pkg.extra_dependencies("use-chardet-on-py3").unwrap();
        assert_eq!(chardet.len(), 1);
    }

    #[test]
    fn declared_extra_without_requirements() {
        let pkg = InstalledPackage::new(Metadata::parse(REQUESTS).unwrap(), "/tmp/x");
        assert!(pkg.has_extra("Security"));
        assert!(pkg.extra_dependencies("security").unwrap().is_empty());
        assert!(matches!(
            pkg.extra_dependencies("http2"),
            Err(PipetteError::MissingExtra { .. })
        ));
    }

    #[test]
    fn continuation_lines_are_joined() {
        let meta = Metadata::parse("Name: a\nVersion: 1.0\nRequires-Dist: b ;\n  python_version >= '3'\n").unwrap();
        assert_eq!(meta.requires_dist[0].markers, "python_version >= '3'");
    }

    #[test]
    fn missing_version_is_an_error() {
        assert!(matches!(
            Metadata::parse("Name: a\n"),
            Err(PipetteError::Metadata { .. })
        ));
    }
}
