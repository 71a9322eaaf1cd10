//! Operation: install packages from the index into `site-packages`.

use std::path::PathBuf;

use pipette_core::dependency::Dependency;
use pipette_core::environment::MarkerEnvironment;
use pipette_pypi::{PypiRepository, Selector};
use pipette_resolver::{InstallSummary, Installer, Options, Reporter};
use pipette_util::errors::PipetteError;
use pipette_util::fs::read_lines;

use crate::context::Context;

/// Options for `pipette install`.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Specifiers given on the command line.
    pub specs: Vec<String>,
    /// Requirement files to read specifiers from.
    pub requirements: Vec<PathBuf>,
    pub no_dependencies: bool,
    pub quiet: bool,
    /// Index URL overriding the configured one.
    pub index_url: Option<String>,
    /// Consider pre-releases.
    pub pre: bool,
}

/// Command-line specifiers followed by every line of every requirement file.
pub fn collect_specifiers(opts: &InstallOptions) -> Result<Vec<String>, PipetteError> {
    let mut specs = opts.specs.clone();
    for path in &opts.requirements {
        let lines = read_lines(path).map_err(|e| PipetteError::Config {
            message: format!("Failed to read requirements file {}: {e}", path.display()),
        })?;
        for line in lines {
            if line.starts_with('-') {
                tracing::warn!("ignoring option line `{line}` in {}", path.display());
                continue;
            }
            specs.push(line);
        }
    }
    Ok(specs)
}

/// Drop specifiers whose `; markers` do not apply to `env`.
pub fn applicable_specifiers(specs: Vec<String>, env: &MarkerEnvironment) -> Result<Vec<String>, PipetteError> {
    let mut kept = Vec::with_capacity(specs.len());
    for spec in specs {
        if !spec.contains(';') {
            kept.push(spec);
            continue;
        }
        let dep = Dependency::from_requires_dist(&spec);
        if dep.applies_to(env)? {
            kept.push(dep.raw_value);
        } else {
            tracing::debug!("skipping `{spec}`: markers do not apply");
        }
    }
    Ok(kept)
}

/// Resolve and install every requested package.
pub fn install(ctx: &Context, opts: &InstallOptions, reporter: &dyn Reporter) -> miette::Result<InstallSummary> {
    let interpreter = ctx.interpreter()?;
    let specs = applicable_specifiers(collect_specifiers(opts)?, &interpreter.markers)?;
    if specs.is_empty() {
        return Err(PipetteError::Generic {
            message: "You must give at least one requirement to install".to_string(),
        }
        .into());
    }

    let index_url = opts.index_url.as_deref().unwrap_or(&ctx.config.index.url);
    let selector = Selector::for_interpreter(
        interpreter,
        opts.pre || ctx.config.index.allow_prereleases,
    );
    let repository = PypiRepository::new(index_url, selector)?;
    let store = ctx.store();
    let options = Options {
        no_dependencies: opts.no_dependencies || ctx.config.install.no_dependencies,
        quiet: opts.quiet || ctx.config.install.quiet,
    };
    tracing::debug!("installing {} package(s) from {index_url}", specs.len());

    let mut installer = Installer::new(&repository, &store, &interpreter.markers, reporter, options);
    installer.initialize_packages(&specs)?;
    Ok(installer.install())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_files_follow_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("requirements.txt");
        std::fs::write(
            &file,
            "# pinned\nrequests==2.31.0\n\n-i https://example.org/simple\nidna>=3  # transitive\n",
        )
        .unwrap();

        let opts = InstallOptions {
            specs: vec!["six".to_string()],
            requirements: vec![file],
            ..InstallOptions::default()
        };
        assert_eq!(
            collect_specifiers(&opts).unwrap(),
            vec!["six", "requests==2.31.0", "idna>=3"]
        );
    }

    #[test]
    fn missing_requirements_file() {
        let opts = InstallOptions {
            requirements: vec![PathBuf::from("/nonexistent/requirements.txt")],
            ..InstallOptions::default()
        };
        let err = collect_specifiers(&opts).unwrap_err();
        assert!(matches!(err, PipetteError::Config { .. }));
    }

    #[test]
    fn markers_on_specifiers() {
        let env = MarkerEnvironment {
            python_version: "3.11".to_string(),
            python_full_version: "3.11.4".to_string(),
            sys_platform: "linux".to_string(),
            ..MarkerEnvironment::default()
        };
        let specs = vec![
            "six".to_string(),
            "tomli>=1.1; python_version < \"3.11\"".to_string(),
            "pywin32; sys_platform == 'win32'".to_string(),
            "typing-extensions ; python_version >= '3.8'".to_string(),
        ];
        assert_eq!(
            applicable_specifiers(specs, &env).unwrap(),
            vec!["six", "typing-extensions"]
        );

        let bad = vec!["x; platform_release == '1'".to_string()];
        assert!(applicable_specifiers(bad, &env).is_err());
    }
}
