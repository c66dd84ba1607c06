//! Command-line interface for oometrics
//!
//! - Argument parsing (`Cli`, `Commands`)
//! - Runtime setup (`setup`): logging and the rayon pool

pub mod setup;

use crate::io::output::OutputFormat;
use crate::metrics::HidingScope;
use crate::provider::SourceKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use setup::{configure_thread_pool, get_worker_count, init_logging, log_filter};

#[derive(Parser, Debug)]
#[command(name = "oometrics")]
#[command(about = "Object-oriented design metrics (DIT, NOC, MOOD) for JVM class universes")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute metrics for every class of a jar, classpath directory or manifest
    Analyze {
        /// Archive, classpath directory or JSON manifest
        path: PathBuf,

        /// How to read PATH (auto: directory, .json manifest, otherwise archive)
        #[arg(long, value_enum)]
        source: Option<SourceKind>,

        /// Only analyze concrete types of this package and its sub-packages
        #[arg(long)]
        package: Option<String>,

        /// Compute hiding factors per class or over the whole universe
        #[arg(long, value_enum)]
        scope: Option<HidingScope>,

        /// Implicit root type whose members are never counted as inherited
        #[arg(long = "root-type")]
        root_type: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,

        /// Number of worker threads (0 = all cores)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Evaluate classes sequentially
        #[arg(long = "no-parallel")]
        no_parallel: bool,

        /// Disable colored terminal output
        #[arg(long)]
        plain: bool,

        /// Configuration file (defaults to the nearest .oometrics.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default .oometrics.toml into the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}
