//! Handler for `pipette env`.

use miette::Result;

use pipette_core::config::GlobalConfig;
use pipette_ops::ops_env;
use pipette_ops::{Context, ContextOptions};

pub fn exec(config: GlobalConfig, opts: &ContextOptions, json: bool) -> Result<()> {
    let ctx = Context::resolve(config, opts, true)?;

    if json {
        println!("{}", ops_env::to_json(ctx.interpreter()?)?);
        return Ok(());
    }

    let rows = ops_env::describe(&ctx)?;
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in rows {
        println!("{key:<width$}  {value}");
    }
    Ok(())
}
