//! Python release version parsing and comparison.
//!
//! Versions are reduced to three numeric segments (major, minor, patch) and a
//! pre-release weight:
//! - Segments are split on `.`; missing trailing segments are `0`
//! - `*` is a wildcard that matches any value in its position (and every
//!   position after it)
//! - A segment with a non-numeric tail such as `1b4` contributes its leading
//!   number and sets the pre-release weight to the sum of the tail's code
//!   points (`b4` = 98 + 52 = 150)
//! - Anything past the third segment is ignored
//!
//! The weight only orders two pre-releases of the same release against each
//! other. When exactly one side carries a weight the pre-release marker is
//! ignored and the versions compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use pipette_util::errors::PipetteError;

/// Sentinel stored in a segment parsed from `*`.
pub const WILDCARD: i64 = -1;

/// A parsed version ready for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub original: String,
    segments: [i64; 3],
    pre_weight: u32,
}

impl Version {
    pub fn parse(version: &str) -> Result<Self, PipetteError> {
        let trimmed = version.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        let mut segments = [0i64; 3];
        let mut pre_weight = 0u32;
        let mut wildcard = false;

        for (i, slot) in segments.iter_mut().enumerate() {
            if wildcard {
                *slot = WILDCARD;
                continue;
            }
            let Some(part) = parts.get(i) else {
                break;
            };
            if *part == "*" {
                wildcard = true;
                *slot = WILDCARD;
                continue;
            }
            match part.parse::<u32>() {
                Ok(n) => *slot = i64::from(n),
                Err(_) => {
                    let (number, weight) = split_pre_release(part, trimmed)?;
                    *slot = number;
                    if weight != 0 {
                        pre_weight = weight;
                    }
                }
            }
        }

        Ok(Self {
            original: trimmed.to_string(),
            segments,
            pre_weight,
        })
    }

    /// Major, minor and patch numbers; [`WILDCARD`] marks a `*` position.
    pub fn segments(&self) -> [i64; 3] {
        self.segments
    }

    /// Code-point sum of the pre-release tail, `0` for a final release.
    pub fn pre_weight(&self) -> u32 {
        self.pre_weight
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre_weight != 0
    }

    /// Positionwise comparison that skips wildcard positions.
    pub fn compare(&self, other: &Self) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            if *a == WILDCARD || *b == WILDCARD {
                continue;
            }
            match a.cmp(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        if self.pre_weight != 0 && other.pre_weight != 0 {
            return self.pre_weight.cmp(&other.pre_weight);
        }
        Ordering::Equal
    }

    /// Evaluate `self <op> other`.
    pub fn satisfies(&self, op: Operator, other: &Self) -> bool {
        let ord = self.compare(other);
        match op {
            Operator::Equal | Operator::ArbitraryEqual => ord == Ordering::Equal,
            Operator::NotEqual => ord != Ordering::Equal,
            Operator::Less => ord == Ordering::Less,
            Operator::LessEqual => ord != Ordering::Greater,
            Operator::Greater => ord == Ordering::Greater,
            Operator::GreaterEqual => ord != Ordering::Less,
            Operator::Compatible => {
                ord != Ordering::Less && self.segments[0] == other.segments[0]
            }
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl FromStr for Version {
    type Err = PipetteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split `1a2` into `(1, 147)`. An empty segment counts as `0`.
fn split_pre_release(part: &str, whole: &str) -> Result<(i64, u32), PipetteError> {
    if part.is_empty() {
        return Ok((0, 0));
    }
    let Some(idx) = part.find(|c: char| !c.is_ascii_digit()) else {
        // all digits but too large for a segment
        return Err(PipetteError::syntax(whole));
    };
    let number = part[..idx]
        .parse::<i64>()
        .map_err(|_| PipetteError::syntax(whole))?;
    let weight = part[idx..].chars().map(|c| c as u32).sum();
    Ok((number, weight))
}

/// Version comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// `~=`: at least the given version, same major segment.
    Compatible,
    /// `===`, treated like `==`.
    ArbitraryEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Compatible => "~=",
            Operator::ArbitraryEqual => "===",
        }
    }
}

impl FromStr for Operator {
    type Err = PipetteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::Less),
            "<=" => Ok(Operator::LessEqual),
            ">" => Ok(Operator::Greater),
            ">=" => Ok(Operator::GreaterEqual),
            "~=" => Ok(Operator::Compatible),
            "===" => Ok(Operator::ArbitraryEqual),
            _ => Err(PipetteError::UnexpectedOperator {
                operator: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare two version strings.
pub fn compare(a: &str, b: &str) -> Result<Ordering, PipetteError> {
    Ok(Version::parse(a)?.compare(&Version::parse(b)?))
}

/// Evaluate `v1 <op> v2` on version strings.
pub fn compare_version(v1: &str, op: &str, v2: &str) -> Result<bool, PipetteError> {
    let op: Operator = op.parse()?;
    Ok(Version::parse(v1)?.satisfies(op, &Version::parse(v2)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_missing_segments() {
        let v = Version::parse("1").unwrap();
        assert_eq!(v.segments(), [1, 0, 0]);
        assert_eq!(v.pre_weight(), 0);

        let v = Version::parse("0.1.0").unwrap();
        assert_eq!(v.segments(), [0, 1, 0]);
    }

    #[test]
    fn empty_version_is_zero() {
        let v = Version::parse("").unwrap();
        assert_eq!(v.segments(), [0, 0, 0]);
    }

    #[test]
    fn pre_release_weight_is_code_point_sum() {
        let v = Version::parse("1.2.3a2").unwrap();
        assert_eq!(v.segments(), [1, 2, 3]);
        assert_eq!(v.pre_weight(), 147);

        let v = Version::parse("1.2a3").unwrap();
        assert_eq!(v.segments(), [1, 2, 0]);
        assert_eq!(v.pre_weight(), 148);

        let v = Version::parse("1.0.0a").unwrap();
        assert_eq!(v.pre_weight(), 97);
    }

    #[test]
    fn wildcard_covers_trailing_positions() {
        let v = Version::parse("1.*").unwrap();
        assert_eq!(v.segments(), [1, WILDCARD, WILDCARD]);
        assert!(compare_version("1.5.3", "==", "1.*").unwrap());
        assert!(!compare_version("2.0", "==", "1.*").unwrap());
        assert!(compare_version("2.0", "!=", "1.*").unwrap());
    }

    #[test]
    fn leading_letters_are_a_syntax_error() {
        assert!(matches!(
            Version::parse("test"),
            Err(PipetteError::Syntax { .. })
        ));
        assert!(Version::parse("1.a1").is_err());
    }

    #[test]
    fn extra_segments_are_ignored() {
        assert!(compare_version("1.2.3.4", "==", "1.2.3").unwrap());
    }

    #[test]
    fn single_sided_prerelease_compares_equal() {
        assert_eq!(compare("1.0.0rc1", "1.0.0").unwrap(), Ordering::Equal);
    }

    #[test]
    fn unknown_operator() {
        assert!(matches!(
            compare_version("1.1", "asd", "2.2"),
            Err(PipetteError::UnexpectedOperator { .. })
        ));
        assert!("=>".parse::<Operator>().is_err());
    }

    #[test]
    fn operator_display_roundtrip() {
        for op in ["==", "!=", "<", "<=", ">", ">=", "~=", "==="] {
            assert_eq!(op.parse::<Operator>().unwrap().to_string(), op);
        }
    }
}
