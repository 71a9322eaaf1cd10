//! Handler for `pipette uninstall`.

use miette::Result;

use pipette_core::config::GlobalConfig;
use pipette_ops::ops_uninstall::{self, UninstallOptions};
use pipette_ops::{Context, ContextOptions};
use pipette_util::progress;

pub fn exec(config: GlobalConfig, opts: &ContextOptions, names: Vec<String>, with_dependencies: bool) -> Result<()> {
    let ctx = Context::resolve(config, opts, false)?;
    let outcome = ops_uninstall::uninstall(
        &ctx.store(),
        &UninstallOptions {
            names,
            with_dependencies,
        },
    )?;

    for name in &outcome.missing {
        progress::status_warn("Skipping", &format!("{name} as it is not installed"));
    }
    for (name, version) in &outcome.removed {
        progress::status("Removed", &format!("{name} {version}"));
    }
    Ok(())
}
