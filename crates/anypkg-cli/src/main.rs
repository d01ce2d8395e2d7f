// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! anypkg - manifest-driven vendoring CLI

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::Result;

mod cmd_clean;
mod cmd_import;
mod cmd_show;
mod cmd_sum;

use cmd_clean::CmdClean;
use cmd_import::CmdImport;
use cmd_show::CmdShow;
use cmd_sum::CmdSum;


#[derive(Parser)]
#[clap(
    name = "anypkg",
    about = "Minimal manifest-driven vendoring",
    version,
    long_about = "Fetch the files listed by the imports of a .package manifest into a local tree"
)]
struct Opt {
    #[clap(flatten)]
    logging: Logging,

    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
struct Logging {
    /// Increase verbosity (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[clap(short, long, global = true)]
    quiet: bool,
}

/// Where the root manifest lives and how manifests are followed.
#[derive(Args, Clone, Debug)]
pub struct ManifestFlags {
    /// Directory holding the root manifest; imports land beneath it
    #[clap(short = 'C', long, env = "ANYPKG_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// File name of the root manifest
    #[clap(
        short = 'f',
        long,
        env = "ANYPKG_MANIFEST",
        default_value = anypkg::MANIFEST_FILENAME
    )]
    pub manifest: String,

    /// Fail when a manifest cannot be fetched instead of treating it as empty
    #[clap(long, env = "ANYPKG_STRICT")]
    pub strict: bool,

    /// Maximum depth of nested manifests
    #[clap(long, env = "ANYPKG_MAX_DEPTH", default_value_t = anypkg::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Directory for staging areas (defaults to the system temp dir)
    #[clap(long, env = "ANYPKG_STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,
}

impl ManifestFlags {
    pub fn options(&self) -> anypkg::FetchOptions {
        anypkg::FetchOptions {
            root: self.root.clone(),
            manifest: self.manifest.clone(),
            strict_manifests: self.strict,
            max_depth: self.max_depth,
            staging_dir: self.staging_dir.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every import of the root manifest
    Import(CmdImport),

    /// Reserved: validate the manifest and count its sum directives
    Sum(CmdSum),

    /// Replace every imported file with an empty placeholder
    Clean(CmdClean),

    /// Display the resolved imports without fetching
    Show(CmdShow),
}

impl Command {
    fn run(&mut self) -> Result<i32> {
        match self {
            Command::Import(cmd) => cmd.run(),
            Command::Sum(cmd) => cmd.run(),
            Command::Clean(cmd) => cmd.run(),
            Command::Show(cmd) => cmd.run(),
        }
    }
}

impl Opt {
    fn run(mut self) -> Result<i32> {
        // Setup logging
        let log_level = match (self.logging.quiet, self.logging.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, 2) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .init();

        self.cmd.run()
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let code = opt.run()?;
    std::process::exit(code);
}
