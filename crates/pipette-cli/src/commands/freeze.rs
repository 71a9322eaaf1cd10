use miette::Result;

use pipette_core::config::GlobalConfig;
use pipette_ops::ops_freeze;
use pipette_ops::{Context, ContextOptions};

pub fn exec(config: GlobalConfig, opts: &ContextOptions) -> Result<()> {
    let ctx = Context::resolve(config, opts, false)?;
    for line in ops_freeze::freeze(&ctx.store())? {
        println!("{line}");
    }
    Ok(())
}
