//! Console output for install runs.

use pipette_resolver::Reporter;
use pipette_util::errors::PipetteError;
use pipette_util::progress;

/// Prints per-package outcomes as status lines on stderr.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn success(&self, name: &str, version: &str) {
        progress::status("Installed", &format!("{name} {version}"));
    }

    fn failure(&self, name: &str, error: &PipetteError) {
        if error.is_informational() {
            progress::status_warn("Skipped", &format!("{name}: {error}"));
        } else {
            progress::status_error("Failed", &format!("{name}: {error}"));
        }
    }
}
