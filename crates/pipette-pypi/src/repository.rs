//! Package repository backed by a PEP 691 simple index.

use std::path::PathBuf;

use reqwest::blocking::Client;
use reqwest::Url;

use pipette_core::condition::{normalize_name, parse_conditions, satisfies_all, Condition};
use pipette_core::environment::Interpreter;
use pipette_core::source::{Candidate, PackageRepository};
use pipette_core::version::{Operator, Version};
use pipette_util::errors::PipetteError;
use pipette_util::hash::verify_sha256;

use crate::download;
use crate::simple::{ProjectFile, ProjectPage, SIMPLE_JSON_ACCEPT};
use crate::tags::{TargetTags, WheelName};

/// Rules for picking a wheel out of a project page.
#[derive(Debug, Clone)]
pub struct Selector {
    pub tags: TargetTags,
    /// Full interpreter version checked against `requires-python`.
    pub python_full_version: String,
    pub allow_prereleases: bool,
}

impl Selector {
    pub fn for_interpreter(interpreter: &Interpreter, allow_prereleases: bool) -> Self {
        Self {
            tags: TargetTags::from_interpreter(interpreter),
            python_full_version: interpreter.markers.python_full_version.clone(),
            allow_prereleases,
        }
    }

    /// Pick the newest installable file satisfying `conditions`.
    ///
    /// Malformed conditions are errors. Files whose version cannot be parsed
    /// are skipped.
    pub fn select(
        &self,
        name: &str,
        page: &ProjectPage,
        page_url: &Url,
        conditions: &[Condition],
    ) -> Result<Candidate, PipetteError> {
        let mut wants_prerelease = self.allow_prereleases;
        for condition in conditions {
            let _: Operator = condition.operator.parse()?;
            wants_prerelease |= Version::parse(&condition.value)?.is_prerelease();
        }

        let mut best: Option<(Version, &ProjectFile)> = None;
        for file in &page.files {
            let Some(version) = self.accept(file, conditions, wants_prerelease) else {
                continue;
            };
            let newer = match &best {
                Some((current, _)) => !version.compare(current).is_lt(),
                None => true,
            };
            if newer {
                best = Some((version, file));
            }
        }

        let Some((version, file)) = best else {
            return Err(PipetteError::NoSuitableVersion {
                name: name.to_string(),
            });
        };

        let url = page_url.join(&file.url).map_err(|e| PipetteError::Network {
            message: format!("invalid file URL `{}`: {e}", file.url),
        })?;
        Ok(Candidate {
            name: name.to_string(),
            version: version.original,
            url: url.to_string(),
            sha256: file.sha256(),
        })
    }

    fn accept(&self, file: &ProjectFile, conditions: &[Condition], prerelease: bool) -> Option<Version> {
        if file.is_yanked() {
            return None;
        }
        let wheel = WheelName::parse(&file.filename)?;
        if !self.tags.is_compatible(&wheel) {
            return None;
        }
        let version = Version::parse(&wheel.version).ok()?;
        if version.is_prerelease() && !prerelease {
            return None;
        }
        if !satisfies_all(&wheel.version, conditions).ok()? {
            return None;
        }
        if let Some(requires) = &file.requires_python {
            let (_, python) = parse_conditions(requires);
            match satisfies_all(&self.python_full_version, &python) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    tracing::debug!("skipping {}: requires-python `{requires}`: {e}", file.filename);
                    return None;
                }
            }
        }
        Some(version)
    }
}

/// Package repository talking to a simple index over HTTP.
pub struct PypiRepository {
    client: Client,
    index_url: String,
    selector: Selector,
    download_dir: PathBuf,
}

impl PypiRepository {
    pub fn new(index_url: &str, selector: Selector) -> Result<Self, PipetteError> {
        Ok(Self {
            client: download::build_client()?,
            index_url: index_url.trim_end_matches('/').to_string(),
            selector,
            download_dir: std::env::temp_dir(),
        })
    }

    /// `{index}/{normalized-name}/`
    pub fn project_url(&self, name: &str) -> String {
        format!("{}/{}/", self.index_url, normalize_name(name))
    }

    fn fetch_page(&self, name: &str) -> Result<(ProjectPage, Url), PipetteError> {
        let url = self.project_url(name);
        let Some(resp) = download::get_with_retries(&self.client, &url, SIMPLE_JSON_ACCEPT)? else {
            return Err(PipetteError::NoSuitableVersion {
                name: name.to_string(),
            });
        };
        let final_url = resp.url().clone();
        let page = resp.json::<ProjectPage>().map_err(|e| PipetteError::Network {
            message: format!("unexpected response from {url}: {e}"),
        })?;
        Ok((page, final_url))
    }
}

impl PackageRepository for PypiRepository {
    fn find_package(&self, name: &str, conditions: &[Condition]) -> Result<Candidate, PipetteError> {
        let (page, url) = self.fetch_page(name)?;
        tracing::debug!("{} lists {} files", url, page.files.len());
        self.selector.select(name, &page, &url, conditions)
    }

    fn download_package(&self, candidate: &Candidate) -> Result<PathBuf, PipetteError> {
        let file = tempfile::Builder::new()
            .prefix("pipette-")
            .suffix(".whl")
            .tempfile_in(&self.download_dir)?;
        let url = candidate.url.split('#').next().unwrap_or(&candidate.url);
        let label = format!("{} {}", candidate.name, candidate.version);
        download::download_file(&self.client, url, file.path(), &label)?;

        if let Some(expected) = &candidate.sha256 {
            verify_sha256(file.path(), expected)?;
        }

        // the caller removes the archive once it has been extracted
        let (_, path) = file.keep().map_err(|e| PipetteError::Io(e.error))?;
        Ok(path)
    }
}
