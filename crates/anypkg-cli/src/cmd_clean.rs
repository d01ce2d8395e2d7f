// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `anypkg clean` command.

use clap::Args;
use miette::Result;

/// Replace every imported file with an empty placeholder
#[derive(Debug, Args)]
pub struct CmdClean {
    #[clap(flatten)]
    pub flags: crate::ManifestFlags,
}

impl CmdClean {
    pub fn run(&mut self) -> Result<i32> {
        println!("Executing clean ...");
        let options = self.flags.options();
        let transport = anypkg::DefaultTransport::new(&options.root);

        let report = anypkg::run_manifest(anypkg::Mode::Clean, &options, &transport)?;

        for path in &report.written {
            println!("{}", path.display());
        }
        Ok(0)
    }
}
