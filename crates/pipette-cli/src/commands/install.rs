//! Handler for `pipette install`.

use miette::Result;

use pipette_core::config::GlobalConfig;
use pipette_ops::ops_install::{self, InstallOptions};
use pipette_ops::{Context, ContextOptions};
use pipette_util::errors::PipetteError;
use pipette_util::progress;

use super::report::ConsoleReporter;

pub fn exec(config: GlobalConfig, opts: &ContextOptions, install: InstallOptions) -> Result<()> {
    let spinner = progress::spinner("Querying Python interpreter...");
    let ctx = Context::resolve(config, opts, true);
    spinner.finish_and_clear();
    let ctx = ctx?;

    let summary = ops_install::install(&ctx, &install, &ConsoleReporter)?;

    for conflict in &summary.conflicts.conflicts {
        progress::status_warn("Conflict", &conflict.to_string());
    }
    if !install.quiet && !summary.installed.is_empty() {
        progress::status_info(
            "Finished",
            &format!(
                "{} package(s) into {}",
                summary.installed.len(),
                ctx.site_packages().display()
            ),
        );
    }

    if !summary.is_success() {
        return Err(PipetteError::Generic {
            message: format!("{} package(s) failed to install", summary.failed.len()),
        }
        .into());
    }
    Ok(())
}
