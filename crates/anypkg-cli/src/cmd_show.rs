// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Implementation of the `anypkg show` command.

use clap::Args;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};

/// Display the resolved imports without fetching
#[derive(Debug, Args)]
pub struct CmdShow {
    #[clap(flatten)]
    pub flags: crate::ManifestFlags,

    /// Output format: table, yaml, json
    #[clap(long, default_value = "table")]
    pub format: String,
}

impl CmdShow {
    pub fn run(&mut self) -> Result<i32> {
        let options = self.flags.options();
        let plans = anypkg::plan_manifest(&options)?;

        match self.format.as_str() {
            "yaml" => print!("{}", serde_yaml::to_string(&plans).into_diagnostic()?),
            "json" => println!(
                "{}",
                serde_json::to_string_pretty(&plans).into_diagnostic()?
            ),
            _ => self.show_table(&options, &plans),
        }

        Ok(0)
    }

    fn show_table(&self, options: &anypkg::FetchOptions, plans: &[anypkg::ImportPlan]) {
        println!(
            "{} {}",
            "Imports of".bold(),
            options.manifest_path().display().to_string().bold()
        );
        println!();

        if plans.is_empty() {
            println!("  {}", "(no imports)".dimmed());
        }
        for (i, plan) in plans.iter().enumerate() {
            println!(
                "  {}. {} {}",
                i + 1,
                plan.location.cyan(),
                format!("(line {})", plan.line).dimmed()
            );
            println!("     url:    {}", plan.url.as_str().green());
            println!("     outdir: {}", plan.outdir.display().to_string().yellow());
        }

        println!();
        println!("Total: {} import(s)", plans.len());
    }
}
