//! Wheel filename tags (PEP 425 / PEP 427) and interpreter compatibility.

use pipette_core::environment::Interpreter;

/// The parts of `{name}-{version}(-{build})?-{python}-{abi}-{platform}.whl`.
///
/// Each tag slot may hold a compressed set such as `py2.py3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelName {
    pub name: String,
    pub version: String,
    pub build: Option<String>,
    pub python: Vec<String>,
    pub abi: Vec<String>,
    pub platform: Vec<String>,
}

impl WheelName {
    /// Parse a wheel filename, `None` for anything that is not a wheel.
    pub fn parse(filename: &str) -> Option<Self> {
        let stem = filename.strip_suffix(".whl")?;
        let parts: Vec<&str> = stem.split('-').collect();
        let (build, tags) = match parts.len() {
            5 => (None, &parts[2..]),
            6 => (Some(parts[2].to_string()), &parts[3..]),
            _ => return None,
        };
        let split = |s: &str| s.split('.').map(str::to_string).collect::<Vec<_>>();
        Some(Self {
            name: parts[0].to_string(),
            version: parts[1].to_string(),
            build,
            python: split(tags[0]),
            abi: split(tags[1]),
            platform: split(tags[2]),
        })
    }
}

/// Tags an interpreter can install, in predicate form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTags {
    /// Abbreviated implementation: `cp`, `pp`, ...
    pub implementation: String,
    pub major: u32,
    pub minor: u32,
    pub sys_platform: String,
    pub machine: String,
    pub glibc: Option<(u32, u32)>,
    pub macos: Option<(u32, u32)>,
}

fn major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().unwrap_or("0").parse().ok()?;
    Some((major, minor))
}

impl TargetTags {
    pub fn from_interpreter(interpreter: &Interpreter) -> Self {
        let markers = &interpreter.markers;
        let implementation = match markers.implementation_name.as_str() {
            "cpython" => "cp",
            "pypy" => "pp",
            "ironpython" => "ip",
            "jython" => "jy",
            _ => "py",
        };
        let (major, minor) = markers.python_major_minor().unwrap_or((3, 0));
        let mut macos = interpreter.macos_version.as_deref().and_then(major_minor);
        // macOS 11+ wheels are tagged with minor 0
        if let Some((major, minor)) = macos.as_mut() {
            if *major >= 11 {
                *minor = 0;
            }
        }
        Self {
            implementation: implementation.to_string(),
            major,
            minor,
            sys_platform: markers.sys_platform.clone(),
            machine: markers.platform_machine.clone(),
            glibc: interpreter.glibc_version.as_deref().and_then(major_minor),
            macos,
        }
    }

    /// Whether at least one tag triple of the wheel is installable here.
    pub fn is_compatible(&self, wheel: &WheelName) -> bool {
        let interpreter_ok = wheel.python.iter().any(|py| {
            wheel
                .abi
                .iter()
                .any(|abi| self.supports_python_abi(py, abi))
        });
        interpreter_ok && wheel.platform.iter().any(|p| self.supports_platform(p))
    }

    fn tag_version(&self, tag: &str, prefix: &str) -> Option<(u32, Option<u32>)> {
        let digits = tag.strip_prefix(prefix)?;
        let mut chars = digits.chars();
        let major = chars.next()?.to_digit(10)?;
        let rest = chars.as_str();
        if rest.is_empty() {
            return Some((major, None));
        }
        Some((major, Some(rest.parse().ok()?)))
    }

    fn supports_python_abi(&self, python: &str, abi: &str) -> bool {
        let cpython_abi = format!("cp{}{}", self.major, self.minor);

        if let Some((major, minor)) = self.tag_version(python, "py") {
            // generic tags carry no compiled extensions
            return major == self.major
                && minor.map_or(true, |m| m <= self.minor)
                && abi == "none";
        }

        let impl_prefix = self.implementation.as_str();
        let Some((major, minor)) = self.tag_version(python, impl_prefix) else {
            return false;
        };
        if major != self.major {
            return false;
        }
        match abi {
            "none" => minor.map_or(true, |m| m <= self.minor),
            "abi3" => impl_prefix == "cp" && minor.map_or(true, |m| m <= self.minor),
            _ => {
                minor == Some(self.minor)
                    && (abi == cpython_abi
                        || abi
                            .strip_prefix(cpython_abi.as_str())
                            .is_some_and(|flags| flags.chars().all(|c| matches!(c, 'm' | 'd' | 'u' | 't'))))
            }
        }
    }

    fn supports_platform(&self, platform: &str) -> bool {
        if platform == "any" {
            return true;
        }
        match self.sys_platform.as_str() {
            "linux" => self.supports_manylinux(platform),
            "darwin" => self.supports_macos(platform),
            "win32" | "cygwin" => self.supports_windows(platform),
            _ => false,
        }
    }

    fn supports_manylinux(&self, platform: &str) -> bool {
        let Some(glibc) = self.glibc else {
            return false;
        };
        let (required, arch) = if let Some(rest) = platform.strip_prefix("manylinux_") {
            let mut parts = rest.splitn(3, '_');
            let (Some(major), Some(minor), Some(arch)) = (parts.next(), parts.next(), parts.next())
            else {
                return false;
            };
            let (Ok(major), Ok(minor)) = (major.parse::<u32>(), minor.parse::<u32>()) else {
                return false;
            };
            ((major, minor), arch)
        } else if let Some(arch) = platform.strip_prefix("manylinux2014_") {
            ((2, 17), arch)
        } else if let Some(arch) = platform.strip_prefix("manylinux2010_") {
            ((2, 12), arch)
        } else if let Some(arch) = platform.strip_prefix("manylinux1_") {
            ((2, 5), arch)
        } else {
            return false;
        };
        arch == self.machine && glibc >= required
    }

    fn supports_macos(&self, platform: &str) -> bool {
        let Some(os) = self.macos else {
            return false;
        };
        let Some(rest) = platform.strip_prefix("macosx_") else {
            return false;
        };
        let mut parts = rest.splitn(3, '_');
        let (Some(major), Some(minor), Some(arch)) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        let (Ok(major), Ok(minor)) = (major.parse::<u32>(), minor.parse::<u32>()) else {
            return false;
        };
        if (major, minor) > os {
            return false;
        }
        match arch {
            "universal2" => matches!(self.machine.as_str(), "x86_64" | "arm64"),
            "intel" | "universal" => self.machine == "x86_64",
            other => other == self.machine,
        }
    }

    fn supports_windows(&self, platform: &str) -> bool {
        match self.machine.to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" => platform == "win_amd64",
            "arm64" => platform == "win_arm64",
            "x86" | "i386" | "i686" => platform == "win32",
            _ => false,
        }
    }
}
