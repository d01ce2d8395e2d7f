// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `anypkg import` command.

use clap::Args;
use miette::Result;

/// Fetch every import of the root manifest
#[derive(Debug, Args)]
pub struct CmdImport {
    #[clap(flatten)]
    pub flags: crate::ManifestFlags,
}

impl CmdImport {
    pub fn run(&mut self) -> Result<i32> {
        println!("Executing import ...");
        let options = self.flags.options();
        let transport = anypkg::DefaultTransport::new(&options.root);

        let report = anypkg::run_manifest(anypkg::Mode::Fetch, &options, &transport)?;

        println!(
            "Imported {} file(s) from {} import(s)",
            report.written.len(),
            report.imports.len()
        );
        Ok(0)
    }
}
