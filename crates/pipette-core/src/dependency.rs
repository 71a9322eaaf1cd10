use std::cell::OnceCell;
use std::fmt;

use pipette_util::errors::PipetteError;

use crate::condition::{format_conditions, parse_conditions, parse_extra_names, Condition};
use crate::environment::MarkerEnvironment;
use crate::marker;

/// A requirement split into name, requested extras and version conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub conditions: Vec<Condition>,
}

impl Requirement {
    /// Parse `name[extra]<op><version>...`.
    pub fn parse(spec: &str) -> Result<Self, PipetteError> {
        let (clean, extras) = parse_extra_names(spec)?;
        let (name, conditions) = parse_conditions(&clean);
        if name.is_empty() {
            return Err(PipetteError::syntax(spec));
        }
        Ok(Self {
            name,
            extras,
            conditions,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        f.write_str(&format_conditions(&self.conditions))
    }
}

/// One `Requires-Dist` line of a package's METADATA.
///
/// The requirement itself is only parsed when first asked for, since most
/// lines are dropped by marker filtering before anyone looks at them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Text before the `;`, e.g. `PySocks (!=1.5.7,>=1.5.6)`.
    pub raw_value: String,
    /// Text after the `;`, empty when the line has no markers.
    pub markers: String,
    /// True when the markers test the `extra` marker.
    pub is_extra: bool,
    resolved: OnceCell<Requirement>,
}

impl Dependency {
    pub fn new(raw_value: impl Into<String>, markers: impl Into<String>, is_extra: bool) -> Self {
        Self {
            raw_value: raw_value.into(),
            markers: markers.into(),
            is_extra,
            resolved: OnceCell::new(),
        }
    }

    /// Build from a `Requires-Dist` value.
    pub fn from_requires_dist(line: &str) -> Self {
        let (raw, markers) = match line.split_once(';') {
            Some((raw, markers)) => (raw.trim(), markers.trim()),
            None => (line.trim(), ""),
        };
        // malformed markers are reported when the line is evaluated
        let is_extra = !markers.is_empty() && marker::mentions_extra(markers).unwrap_or(false);
        Self::new(raw, markers, is_extra)
    }

    /// Whether the line applies to `env`. Lines without markers always apply.
    pub fn applies_to(&self, env: &MarkerEnvironment) -> Result<bool, PipetteError> {
        if self.markers.is_empty() {
            return Ok(true);
        }
        env.evaluate(&self.markers)
    }

    /// Whether the line belongs to the extra group `extra`.
    pub fn belongs_to_extra(&self, extra: &str) -> Result<bool, PipetteError> {
        if !self.is_extra {
            return Ok(false);
        }
        marker::match_extra_marker(&self.markers, extra)
    }

    /// The parsed requirement, computed on first use.
    pub fn requirement(&self) -> Result<&Requirement, PipetteError> {
        if let Some(req) = self.resolved.get() {
            return Ok(req);
        }
        let req = Requirement::parse(&self.raw_value)?;
        Ok(self.resolved.get_or_init(|| req))
    }

    pub fn package_name(&self) -> Result<&str, PipetteError> {
        Ok(&self.requirement()?.name)
    }

    pub fn conditions(&self) -> Result<&[Condition], PipetteError> {
        Ok(&self.requirement()?.conditions)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.markers.is_empty() {
            f.write_str(&self.raw_value)
        } else {
            write!(f, "{}; {}", self.raw_value, self.markers)
        }
    }
}
