use miette::Result;

use pipette_core::config::GlobalConfig;
use pipette_ops::ops_show;
use pipette_ops::{Context, ContextOptions};

pub fn exec(config: GlobalConfig, opts: &ContextOptions, name: &str) -> Result<()> {
    let ctx = Context::resolve(config, opts, false)?;
    let info = ops_show::show(&ctx.store(), name)?;
    println!("{info}");
    Ok(())
}
