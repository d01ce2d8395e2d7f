// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Processing of a root manifest, one directive at a time.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::directive::{DirectiveKind, ImportDirective};
use crate::fetch::{FetchOptions, Fetcher, Mode};
use crate::location::{SourceUrl, resolve};
use crate::manifest::Manifest;
use crate::transport::Transport;
use crate::Result;

#[cfg(test)]
#[path = "./run_test.rs"]
mod run_test;

/// A root `import` directive, resolved and guarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPlan {
    pub line: usize,
    pub location: String,
    pub url: SourceUrl,
    pub outdir: PathBuf,
}

impl TryFrom<&ImportDirective> for ImportPlan {
    type Error = crate::Error;

    fn try_from(import: &ImportDirective) -> Result<Self> {
        let url = resolve(
            &import.location,
            import.reference.as_deref(),
            import.manifest.as_deref(),
        )?;
        Ok(Self {
            line: import.line,
            location: import.location.clone(),
            url,
            outdir: Path::new(&import.outdir).components().collect(),
        })
    }
}

/// What a run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    /// Root imports in processing order.
    pub imports: Vec<ImportPlan>,
    /// Every URL handed to the transport.
    pub fetched: Vec<SourceUrl>,
    /// Every destination file written.
    pub written: Vec<PathBuf>,
}

/// Run every root `import` of the manifest at `options.manifest_path()`.
///
/// Directives are handled in file order and the first error stops the run.
/// Root level `file` and `sum` directives are not processed.
pub fn run_manifest(
    mode: Mode,
    options: &FetchOptions,
    transport: &dyn Transport,
) -> Result<RunReport> {
    let manifest = Manifest::load(options.manifest_path())?;
    let mut fetcher = Fetcher::new(options.clone(), transport);
    let mut imports = Vec::new();

    for directive in manifest.directives() {
        let directive = directive?;
        tracing::debug!(line = directive.line, tokens = ?directive.tokens, "directive");
        if directive.kind != DirectiveKind::Import {
            continue;
        }
        let plan = ImportPlan::try_from(&ImportDirective::try_from(&directive)?)?;
        fetcher.fetch(mode, &plan.url, &plan.outdir)?;
        imports.push(plan);
    }

    let (fetched, written) = fetcher.into_parts();
    Ok(RunReport {
        mode,
        imports,
        fetched,
        written,
    })
}

/// Resolve every root import without fetching anything.
pub fn plan_manifest(options: &FetchOptions) -> Result<Vec<ImportPlan>> {
    let manifest = Manifest::load(options.manifest_path())?;
    manifest
        .imports()
        .map(|import| ImportPlan::try_from(&import?))
        .collect()
}

/// Count the `sum` directives of the root manifest, validating every line.
pub fn count_sums(options: &FetchOptions) -> Result<usize> {
    let manifest = Manifest::load(options.manifest_path())?;
    let mut count = 0;
    for directive in manifest.directives() {
        if directive?.kind == DirectiveKind::Sum {
            count += 1;
        }
    }
    Ok(count)
}
