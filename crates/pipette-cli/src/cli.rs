//! CLI argument definitions for pipette.
//!
//! Uses `clap` derive macros to define the full command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pipette",
    version,
    about = "A small Python package installer",
    long_about = "pipette resolves requirement specifiers against a PyPI-compatible index \
                  and installs wheels into a site-packages directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Python interpreter to install for
    #[arg(long, global = true, env = "PIPETTE_PYTHON")]
    pub python: Option<String>,

    /// Install into this directory instead of the interpreter's site-packages
    #[arg(long, global = true, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install packages
    #[command(alias = "i")]
    Install {
        /// Package specifiers, e.g. `requests[socks]>=2.0`
        #[arg(value_name = "SPEC")]
        specs: Vec<String>,
        /// Install from the given requirements file (repeatable)
        #[arg(short, long = "requirement", value_name = "FILE")]
        requirements: Vec<PathBuf>,
        /// Don't install package dependencies
        #[arg(short, long = "no-deps")]
        no_deps: bool,
        /// Don't report successful installs
        #[arg(short, long)]
        quiet: bool,
        /// Base URL of the package index
        #[arg(long, value_name = "URL")]
        index_url: Option<String>,
        /// Include pre-release versions
        #[arg(long)]
        pre: bool,
    },

    /// Uninstall packages
    #[command(alias = "rm")]
    Uninstall {
        /// Package names
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
        /// Also uninstall the packages' dependencies
        #[arg(short = 'd', long)]
        with_dependencies: bool,
    },

    /// Output installed packages in requirements format
    Freeze,

    /// Verify installed packages have compatible dependencies
    Check,

    /// Show information about an installed package
    Show {
        /// Package name
        name: String,
    },

    /// Show the Python environment packages are installed for
    Env {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
