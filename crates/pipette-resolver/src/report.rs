//! Outcome reporting for an install run.

use std::fmt;

use pipette_util::errors::PipetteError;

/// Receives per-package results as the queue is processed.
pub trait Reporter {
    fn success(&self, name: &str, version: &str);
    fn failure(&self, name: &str, error: &PipetteError);
}

/// A report of all version conflicts encountered during installation.
#[derive(Debug, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<VersionConflict>,
}

/// A package that was installed this run and later replaced because a
/// newer requester's conditions excluded it.
#[derive(Debug, Clone)]
pub struct VersionConflict {
    pub package: String,
    pub installed: String,
    pub requested: String,
    pub reason: String,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: VersionConflict) {
        self.conflicts.push(conflict);
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} does not satisfy {} ({})",
            self.package, self.installed, self.requested, self.reason
        )
    }
}

/// Everything an install run did.
#[derive(Debug, Default)]
pub struct InstallSummary {
    /// `(name, version)` of every package installed.
    pub installed: Vec<(String, String)>,
    /// `(name, message)` of every package that failed.
    pub failed: Vec<(String, String)>,
    pub conflicts: ConflictReport,
}

impl InstallSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
