//! Description of the target Python installation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pipette_util::errors::PipetteError;
use pipette_util::process::CommandBuilder;

use crate::marker;

/// Values the environment markers of a requirement are evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerEnvironment {
    /// `major.minor`, e.g. `3.11`.
    pub python_version: String,
    pub python_full_version: String,
    pub sys_platform: String,
    pub platform_system: String,
    pub platform_machine: String,
    pub os_name: String,
    pub implementation_name: String,
    pub platform_python_implementation: String,
}

impl MarkerEnvironment {
    /// Evaluate a marker expression in this environment.
    pub fn evaluate(&self, expr: &str) -> Result<bool, PipetteError> {
        marker::compare_markers(expr, self)
    }

    /// `(major, minor)` of the interpreter, if `python_version` is well formed.
    pub fn python_major_minor(&self) -> Option<(u32, u32)> {
        let (major, minor) = self.python_version.split_once('.')?;
        Some((major.parse().ok()?, minor.parse().ok()?))
    }
}

/// A discovered Python interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpreter {
    #[serde(default)]
    pub executable: PathBuf,
    #[serde(flatten)]
    pub markers: MarkerEnvironment,
    /// `purelib` directory packages are installed into.
    pub site_packages: PathBuf,
    /// glibc version (`2.35`), absent on musl and non-Linux hosts.
    #[serde(default)]
    pub glibc_version: Option<String>,
    /// macOS product version (`14.2.1`), absent elsewhere.
    #[serde(default)]
    pub macos_version: Option<String>,
}

const DISCOVER_SCRIPT: &str = r#"
import json, os, platform, sys, sysconfig
libc = platform.libc_ver()
print(json.dumps({
    "python_version": "%d.%d" % sys.version_info[:2],
    "python_full_version": platform.python_version(),
    "sys_platform": sys.platform,
    "platform_system": platform.system(),
    "platform_machine": platform.machine(),
    "os_name": os.name,
    "implementation_name": sys.implementation.name,
    "platform_python_implementation": platform.python_implementation(),
    "site_packages": sysconfig.get_paths()["purelib"],
    "glibc_version": libc[1] if libc[0] == "glibc" else None,
    "macos_version": platform.mac_ver()[0] or None,
}))
"#;

impl Interpreter {
    /// Run `executable` and ask it to describe itself.
    pub fn discover(executable: &Path) -> Result<Self, PipetteError> {
        let program = executable.to_string_lossy().into_owned();
        let stdout = CommandBuilder::new(&program)
            .args(["-c", DISCOVER_SCRIPT])
            .env("PYTHONIOENCODING", "utf-8")
            .stdout()
            .map_err(|e| PipetteError::Config {
                message: format!("failed to query interpreter `{program}`: {e}"),
            })?;

        let mut interpreter = Self::from_json(&stdout)?;
        interpreter.executable = executable.to_path_buf();
        tracing::debug!(
            "discovered Python {} ({}) at {}",
            interpreter.markers.python_full_version,
            interpreter.markers.sys_platform,
            interpreter.site_packages.display()
        );
        Ok(interpreter)
    }

    /// Parse the JSON document printed by the discovery script.
    pub fn from_json(json: &str) -> Result<Self, PipetteError> {
        serde_json::from_str(json.trim()).map_err(|e| PipetteError::Config {
            message: format!("unexpected interpreter description: {e}"),
        })
    }
}
