//! Requirement specifier parsing: `name[extra1,extra2]>=1.0,<2.0`.

use std::fmt;

use pipette_util::errors::PipetteError;

use crate::version::{Operator, Version};

/// A single `(operator, version)` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub operator: String,
    pub value: String,
}

impl Condition {
    pub fn new(operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Check whether `version` satisfies this condition.
    pub fn matches(&self, version: &Version) -> Result<bool, PipetteError> {
        let op: Operator = self.operator.parse()?;
        let bound = Version::parse(&self.value)?;
        Ok(version.satisfies(op, &bound))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.value)
    }
}

/// Render a condition list the way it would appear in a specifier.
pub fn format_conditions(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(Condition::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn is_operator(c: char) -> bool {
    matches!(c, '>' | '<' | '=' | '!' | '~')
}

/// Split a specifier into its package name and conditions.
///
/// Whitespace and parentheses are dropped first. Everything before the first
/// operator character is the name. The rest is read as alternating runs of
/// operator characters and value characters; no separator is needed between
/// conditions, and commas are accepted and ignored.
///
/// ```
/// use pipette_core::condition::{parse_conditions, Condition};
///
/// let (name, conditions) = parse_conditions("name>=1.2.3!=2.3.4");
/// assert_eq!(name, "name");
/// assert_eq!(
///     conditions,
///     vec![Condition::new(">=", "1.2.3"), Condition::new("!=", "2.3.4")]
/// );
/// ```
pub fn parse_conditions(spec: &str) -> (String, Vec<Condition>) {
    let cleaned: String = spec
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();

    let Some(start) = cleaned.find(is_operator) else {
        return (cleaned, Vec::new());
    };
    let name = cleaned[..start].to_string();

    let mut conditions = Vec::new();
    let mut operator = String::new();
    let mut value = String::new();

    // trailing operator character forces the last pair out
    for c in cleaned[start..].chars().chain(std::iter::once('>')) {
        if is_operator(c) {
            if !value.is_empty() {
                conditions.push(Condition {
                    operator: std::mem::take(&mut operator),
                    value: std::mem::take(&mut value),
                });
            }
            operator.push(c);
        } else if c != ',' {
            value.push(c);
        }
    }

    (name, conditions)
}

/// Separate extra names from a specifier.
///
/// The region between the first `[` and the last `]` holds comma-separated
/// extra names; it is cut out of the returned specifier. A specifier without
/// brackets is returned as is with no extras.
///
/// ```
/// use pipette_core::condition::parse_extra_names;
///
/// let (spec, extras) = parse_extra_names("pkg[a,b]>=1.0").unwrap();
/// assert_eq!(spec, "pkg>=1.0");
/// assert_eq!(extras, vec!["a", "b"]);
/// ```
pub fn parse_extra_names(spec: &str) -> Result<(String, Vec<String>), PipetteError> {
    let open = spec.find('[');
    let close = spec.rfind(']');

    match (open, close) {
        (Some(open), Some(close)) if open < close => {
            let inner = &spec[open + 1..close];
            if inner.contains(['[', ']']) {
                return Err(PipetteError::syntax(spec));
            }
            let extras: Vec<String> = inner.split(',').map(|s| s.trim().to_string()).collect();
            if extras.iter().any(String::is_empty) {
                return Err(PipetteError::syntax(spec));
            }
            let clean = format!("{}{}", &spec[..open], &spec[close + 1..]);
            Ok((clean, extras))
        }
        (None, None) => Ok((spec.to_string(), Vec::new())),
        _ => Err(PipetteError::syntax(spec)),
    }
}

/// Check a version against every condition; an empty list always matches.
pub fn satisfies_all(version: &str, conditions: &[Condition]) -> Result<bool, PipetteError> {
    let version = Version::parse(version)?;
    for condition in conditions {
        if !condition.matches(&version)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Normalize a distribution or extra name (PEP 503 / PEP 685): lowercase,
/// runs of `-`, `_` and `.` collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_sep = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_sep {
                out.push('-');
            }
            last_sep = true;
        } else {
            out.extend(c.to_lowercase());
            last_sep = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_only() {
        let (name, cond) = parse_conditions("name");
        assert_eq!(name, "name");
        assert!(cond.is_empty());
    }

    #[test]
    fn dangling_operator_yields_nothing() {
        let (name, cond) = parse_conditions("name>=");
        assert_eq!(name, "name");
        assert!(cond.is_empty());
    }

    #[test]
    fn digits_without_operator_stay_in_name() {
        let (name, cond) = parse_conditions("name1.2.3");
        assert_eq!(name, "name1.2.3");
        assert!(cond.is_empty());
    }

    #[test]
    fn metadata_style_requirement() {
        let (name, cond) = parse_conditions("charset-normalizer (<4,>=2)");
        assert_eq!(name, "charset-normalizer");
        assert_eq!(cond, vec![Condition::new("<", "4"), Condition::new(">=", "2")]);
    }

    #[test]
    fn whitespace_between_conditions() {
        let (name, cond) = parse_conditions("idna >= 2.5 , < 4");
        assert_eq!(name, "idna");
        assert_eq!(cond, vec![Condition::new(">=", "2.5"), Condition::new("<", "4")]);
    }

    #[test]
    fn extras_stay_in_name() {
        let (name, cond) = parse_conditions("pkg[a, b]~=1.4");
        assert_eq!(name, "pkg[a,b]");
        assert_eq!(cond, vec![Condition::new("~=", "1.4")]);
    }

    #[test]
    fn condition_display() {
        let cond = vec![Condition::new(">=", "1.0"), Condition::new("<", "2")];
        assert_eq!(format_conditions(&cond), ">=1.0,<2");
    }

    #[test]
    fn extra_names_variants() {
        let (spec, extras) = parse_extra_names("package[extraName]").unwrap();
        assert_eq!(spec, "package");
        assert_eq!(extras, vec!["extraName"]);

        let (spec, extras) = parse_extra_names("package3[extraName3, extraName4]>=1.0<2").unwrap();
        assert_eq!(spec, "package3>=1.0<2");
        assert_eq!(extras, vec!["extraName3", "extraName4"]);

        let (spec, extras) = parse_extra_names("package4").unwrap();
        assert_eq!(spec, "package4");
        assert!(extras.is_empty());
    }

    #[test]
    fn extra_names_invalid() {
        for spec in [
            "package[",
            "package]",
            "package[extraName",
            "package[extraName]]",
            "package[]",
            "package[[extraName]]",
            "package]extra[",
        ] {
            assert!(
                matches!(parse_extra_names(spec), Err(PipetteError::Syntax { .. })),
                "{spec} should be rejected"
            );
        }
    }

    #[test]
    fn satisfies_all_conditions() {
        let cond = vec![Condition::new(">=", "1.0"), Condition::new("<", "2.0")];
        assert!(satisfies_all("1.5", &cond).unwrap());
        assert!(!satisfies_all("2.0", &cond).unwrap());
        assert!(satisfies_all("0.1", &[]).unwrap());
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_name("Charset_Normalizer"), "charset-normalizer");
        assert_eq!(normalize_name("zope..interface"), "zope-interface");
        assert_eq!(normalize_name("use_chardet_on_py3"), "use-chardet-on-py3");
    }
}
