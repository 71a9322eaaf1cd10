//! Command dispatch and handler modules.

mod check;
mod env;
mod freeze;
mod install;
mod report;
mod show;
mod uninstall;

use miette::Result;

use pipette_core::config::GlobalConfig;
use pipette_ops::ContextOptions;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = GlobalConfig::load()?;
    let opts = ContextOptions {
        python: cli.python,
        target: cli.target,
    };

    match cli.command {
        Command::Install {
            specs,
            requirements,
            no_deps,
            quiet,
            index_url,
            pre,
        } => install::exec(
            config,
            &opts,
            pipette_ops::ops_install::InstallOptions {
                specs,
                requirements,
                no_dependencies: no_deps,
                quiet,
                index_url,
                pre,
            },
        ),
        Command::Uninstall {
            names,
            with_dependencies,
        } => uninstall::exec(config, &opts, names, with_dependencies),
        Command::Freeze => freeze::exec(config, &opts),
        Command::Check => check::exec(config, &opts),
        Command::Show { name } => show::exec(config, &opts, &name),
        Command::Env { json } => env::exec(config, &opts, json),
    }
}
