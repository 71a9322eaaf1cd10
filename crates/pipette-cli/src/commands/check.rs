//! Handler for `pipette check`.

use miette::Result;

use pipette_core::config::GlobalConfig;
use pipette_ops::ops_check;
use pipette_ops::{Context, ContextOptions};
use pipette_util::errors::PipetteError;
use pipette_util::progress;

pub fn exec(config: GlobalConfig, opts: &ContextOptions) -> Result<()> {
    let ctx = Context::resolve(config, opts, false)?;
    let env = ctx.interpreter().ok().map(|interpreter| &interpreter.markers);
    let broken = ops_check::check(&ctx.store(), env)?;

    if broken.is_empty() {
        progress::status("Checked", "no broken requirements found");
        return Ok(());
    }

    for health in &broken {
        let label = format!("{} {}", health.name, health.version);
        if !health.missing.is_empty() {
            progress::status_error(
                "Broken",
                &format!("{label}: missing dependencies: {}", health.missing.join(", ")),
            );
        }
        if !health.mismatched.is_empty() {
            progress::status_error(
                "Broken",
                &format!("{label}: mismatched versions: {}", health.mismatched.join(", ")),
            );
        }
        if let Some(error) = &health.error {
            progress::status_error("Error", &format!("{label}: {error}"));
        }
    }

    Err(PipetteError::Generic {
        message: format!("{} package(s) have broken requirements", broken.len()),
    }
    .into())
}
