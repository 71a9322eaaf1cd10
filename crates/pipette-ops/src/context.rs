//! Where an operation runs: the interpreter and the `site-packages`
//! directory it works on.

use std::path::{Path, PathBuf};

use pipette_core::config::GlobalConfig;
use pipette_core::environment::Interpreter;
use pipette_site::SitePackages;
use pipette_util::errors::PipetteError;

/// Global command-line overrides.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    /// Interpreter to query instead of the configured one.
    pub python: Option<String>,
    /// Install into this directory instead of the interpreter's.
    pub target: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Context {
    pub config: GlobalConfig,
    interpreter: Option<Interpreter>,
    site_packages: PathBuf,
}

impl Context {
    /// Resolve the store directory, querying the interpreter only when
    /// `needs_interpreter` is set or nothing else names a directory.
    ///
    /// The directory comes from `--target`, then the configured
    /// `site-packages`, then the interpreter.
    pub fn resolve(
        mut config: GlobalConfig,
        opts: &ContextOptions,
        needs_interpreter: bool,
    ) -> Result<Self, PipetteError> {
        if let Some(python) = &opts.python {
            config.python.executable = python.clone();
        }

        let explicit = opts
            .target
            .clone()
            .or_else(|| config.python.site_packages.clone());

        let interpreter = if needs_interpreter || explicit.is_none() {
            Some(Interpreter::discover(Path::new(&config.python.executable))?)
        } else {
            None
        };

        let site_packages = match (explicit, &interpreter) {
            (Some(dir), _) => dir,
            (None, Some(interpreter)) => interpreter.site_packages.clone(),
            (None, None) => {
                return Err(PipetteError::Config {
                    message: "no site-packages directory".to_string(),
                })
            }
        };
        tracing::debug!("using site-packages at {}", site_packages.display());

        Ok(Self {
            config,
            interpreter,
            site_packages,
        })
    }

    /// Build a context around an already known interpreter.
    pub fn with_interpreter(config: GlobalConfig, interpreter: Interpreter, target: Option<PathBuf>) -> Self {
        let site_packages = target
            .or_else(|| config.python.site_packages.clone())
            .unwrap_or_else(|| interpreter.site_packages.clone());
        Self {
            config,
            interpreter: Some(interpreter),
            site_packages,
        }
    }

    pub fn interpreter(&self) -> Result<&Interpreter, PipetteError> {
        self.interpreter.as_ref().ok_or_else(|| PipetteError::Config {
            message: "this operation needs a Python interpreter".to_string(),
        })
    }

    pub fn site_packages(&self) -> &Path {
        &self.site_packages
    }

    pub fn store(&self) -> SitePackages {
        SitePackages::new(&self.site_packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_skips_interpreter() {
        let opts = ContextOptions {
            python: Some("/nonexistent/python".to_string()),
            target: Some(PathBuf::from("/tmp/site")),
        };
        let ctx = Context::resolve(GlobalConfig::default(), &opts, false).unwrap();
        assert_eq!(ctx.site_packages(), Path::new("/tmp/site"));
        assert!(ctx.interpreter().is_err());
    }

    #[test]
    fn configured_site_packages_skip_interpreter() {
        let mut config = GlobalConfig::default();
        config.python.site_packages = Some(PathBuf::from("/opt/site"));
        let ctx = Context::resolve(config, &ContextOptions::default(), false).unwrap();
        assert_eq!(ctx.site_packages(), Path::new("/opt/site"));
    }

    #[test]
    fn missing_interpreter_is_config_error() {
        let opts = ContextOptions {
            python: Some("/nonexistent/python".to_string()),
            target: None,
        };
        let err = Context::resolve(GlobalConfig::default(), &opts, false).unwrap_err();
        assert!(matches!(err, PipetteError::Config { .. }));
    }

    #[test]
    fn target_wins_over_interpreter() {
        let interpreter = Interpreter::from_json(
            r#"{"python_version":"3.11","python_full_version":"3.11.4","sys_platform":"linux",
                "platform_system":"Linux","platform_machine":"x86_64","os_name":"posix",
                "implementation_name":"cpython","platform_python_implementation":"CPython",
                "site_packages":"/usr/lib/python3.11/site-packages"}"#,
        )
        .unwrap();
        let ctx = Context::with_interpreter(GlobalConfig::default(), interpreter.clone(), None);
        assert_eq!(ctx.site_packages(), Path::new("/usr/lib/python3.11/site-packages"));

        let ctx = Context::with_interpreter(GlobalConfig::default(), interpreter, Some(PathBuf::from("vendor")));
        assert_eq!(ctx.site_packages(), Path::new("vendor"));
        assert!(ctx.interpreter().is_ok());
    }
}
