// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! The recursive fetch engine.
//!
//! A fetch resolves one source URL into files under an output directory:
//!
//! 1. a fresh [`StagingArea`] is allocated,
//! 2. a manifest source has every `file` it lists fetched into the staging
//!    area, any other source is fetched as a single file,
//! 3. the staging tree is merged into `<root>/<outdir>` through the
//!    [`ChecksumRegistry`],
//! 4. `import` directives of fetched manifests are followed recursively.
//!
//! Clean mode never fetches file content. It writes zero-length placeholders
//! straight into the destination at every path a fetch would populate.
//!
//! All paths are explicit joins against the staging area or the run root; the
//! process working directory is never changed.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::directive::{DirectiveKind, FileDirective, ImportDirective};
use crate::guard::guard_file_path;
use crate::location::{SourceUrl, is_local_location, resolve};
use crate::manifest::Manifest;
use crate::registry::ChecksumRegistry;
use crate::staging::{StagingArea, write_file};
use crate::transport::Transport;
use crate::{Error, MANIFEST_FILENAME, Result};

#[cfg(test)]
#[path = "./fetch_test.rs"]
mod fetch_test;

/// Default bound on manifest nesting.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// What a fetch does with the files it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Retrieve file content and merge it into the destination.
    Fetch,
    /// Replace every resolved file with a zero-length placeholder.
    Clean,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("fetch"),
            Self::Clean => f.write_str("clean"),
        }
    }
}

/// Options for a run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Directory holding the root manifest; destinations and relative local
    /// sources resolve against it.
    pub root: PathBuf,

    /// File name of the root manifest under `root`.
    pub manifest: String,

    /// Treat a failed manifest fetch as fatal instead of an empty manifest.
    pub strict_manifests: bool,

    /// Maximum manifest nesting depth.
    pub max_depth: usize,

    /// Where staging areas are created (system temp dir when unset).
    pub staging_dir: Option<PathBuf>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            manifest: MANIFEST_FILENAME.to_string(),
            strict_manifests: false,
            max_depth: DEFAULT_MAX_DEPTH,
            staging_dir: None,
        }
    }
}

impl FetchOptions {
    /// Path of the root manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }
}

/// Drives fetches for one run.
///
/// Owns the run's [`ChecksumRegistry`], so independent fetchers never share
/// conflict state.
pub struct Fetcher<'a> {
    options: FetchOptions,
    transport: &'a dyn Transport,
    registry: ChecksumRegistry,
    visited: HashSet<(Mode, SourceUrl, PathBuf)>,
    fetched: Vec<SourceUrl>,
    written: Vec<PathBuf>,
}

impl<'a> Fetcher<'a> {
    pub fn new(options: FetchOptions, transport: &'a dyn Transport) -> Self {
        Self {
            options,
            transport,
            registry: ChecksumRegistry::new(),
            visited: HashSet::new(),
            fetched: Vec::new(),
            written: Vec::new(),
        }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub fn registry(&self) -> &ChecksumRegistry {
        &self.registry
    }

    /// Every URL handed to the transport, in call order.
    pub fn fetched(&self) -> &[SourceUrl] {
        &self.fetched
    }

    /// Every destination file written, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Consume the fetcher, returning the fetched URLs and written paths.
    pub fn into_parts(self) -> (Vec<SourceUrl>, Vec<PathBuf>) {
        (self.fetched, self.written)
    }

    /// Fetch `url` into `outdir`, relative to the run root.
    pub fn fetch<P: AsRef<Path>>(
        &mut self,
        mode: Mode,
        url: &SourceUrl,
        outdir: P,
    ) -> Result<()> {
        let outdir: PathBuf = outdir.as_ref().components().collect();
        self.fetch_at_depth(mode, url, &outdir, 0)
    }

    fn fetch_at_depth(
        &mut self,
        mode: Mode,
        url: &SourceUrl,
        outdir: &Path,
        depth: usize,
    ) -> Result<()> {
        let key = (mode, url.clone(), outdir.to_path_buf());
        if url.is_manifest() && self.visited.contains(&key) {
            tracing::debug!(%url, outdir = %outdir.display(), "manifest already processed");
            return Ok(());
        }
        if depth > self.options.max_depth {
            return Err(Error::RecursionLimit {
                url: url.to_string(),
                depth: self.options.max_depth,
            });
        }
        if url.is_manifest() {
            self.visited.insert(key);
        }

        tracing::info!("Fetching {mode} from {url} to {}", outdir.display());
        // A trailing `.` would defeat `create_dir_all` on a missing root.
        let dest: PathBuf = self.options.root.join(outdir).components().collect();

        let staging = match mode {
            Mode::Fetch => Some(self.staging_area()?),
            Mode::Clean => None,
        };
        // Clean mode writes its placeholders straight into the destination.
        let target = match &staging {
            Some(staging) => staging.path().to_path_buf(),
            None => dest.clone(),
        };

        let nested = if url.is_manifest() {
            self.fetch_manifest(mode, url, outdir, &target)?
        } else {
            self.fetch_single(mode, url, outdir, &target)?;
            Vec::new()
        };

        if let Some(staging) = staging {
            std::fs::create_dir_all(&dest).map_err(Error::fs(&dest))?;
            let stats = self.registry.merge(staging.path(), &dest)?;
            tracing::debug!(
                files = stats.written.len(),
                staging = staging.sequence(),
                dest = %dest.display(),
                "merged staging area"
            );
            self.written.extend(stats.written);
        }

        if !url.is_manifest() {
            return Ok(());
        }

        // Nested manifest continuation. Re-entering this manifest is stopped
        // by the visited set above.
        self.fetch_at_depth(mode, url, outdir, depth + 1)?;
        for import in nested {
            let nested_url = resolve_nested(url, &import)?;
            let nested_outdir: PathBuf = outdir.join(&import.outdir).components().collect();
            self.fetch_at_depth(mode, &nested_url, &nested_outdir, depth + 1)?;
        }

        Ok(())
    }

    fn staging_area(&self) -> Result<StagingArea> {
        match &self.options.staging_dir {
            Some(dir) => StagingArea::new_in(dir),
            None => StagingArea::new(),
        }
    }

    /// Fetch a manifest and the files it lists into `target`.
    ///
    /// Returns the manifest's `import` directives, already guarded.
    fn fetch_manifest(
        &mut self,
        mode: Mode,
        url: &SourceUrl,
        outdir: &Path,
        target: &Path,
    ) -> Result<Vec<ImportDirective>> {
        tracing::info!("[get] {url}");
        let bytes = match self.transport_fetch(url) {
            Ok(bytes) => bytes,
            Err(err) if !self.options.strict_manifests => {
                tracing::warn!("Error fetching {MANIFEST_FILENAME}: {err}");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let manifest = Manifest::from_bytes(&bytes);
        let mut imports = Vec::new();
        for directive in manifest.directives() {
            let directive = directive?;
            match directive.kind {
                DirectiveKind::File => {
                    let file = FileDirective::try_from(&directive)?;
                    self.fetch_listed_file(mode, url, outdir, target, &file)?;
                }
                DirectiveKind::Import => imports.push(ImportDirective::try_from(&directive)?),
                DirectiveKind::Sum | DirectiveKind::Unknown => {}
            }
        }
        Ok(imports)
    }

    fn fetch_listed_file(
        &mut self,
        mode: Mode,
        manifest_url: &SourceUrl,
        outdir: &Path,
        target: &Path,
        file: &FileDirective,
    ) -> Result<()> {
        let path = target.join(&file.path);
        match mode {
            Mode::Clean => {
                self.trace_placeholder(outdir, &file.path);
                self.written.push(write_file(&path, b"")?);
            }
            Mode::Fetch => {
                let file_url = manifest_url.join(&file.path);
                tracing::info!("[get] {file_url}");
                let bytes = self.transport_fetch(&file_url)?;
                write_file(&path, &bytes)?;
            }
        }
        Ok(())
    }

    /// Fetch a non-manifest source as one file named after its base name.
    fn fetch_single(
        &mut self,
        mode: Mode,
        url: &SourceUrl,
        outdir: &Path,
        target: &Path,
    ) -> Result<()> {
        let name = url.base_name();
        guard_file_path(name)?;
        let path = target.join(name);
        match mode {
            Mode::Clean => {
                self.trace_placeholder(outdir, name);
                self.written.push(write_file(&path, b"")?);
            }
            Mode::Fetch => {
                tracing::info!("[get] {url}");
                let bytes = self.transport_fetch(url)?;
                write_file(&path, &bytes)?;
            }
        }
        Ok(())
    }

    fn transport_fetch(&mut self, url: &SourceUrl) -> Result<Vec<u8>> {
        self.fetched.push(url.clone());
        self.transport.fetch(url)
    }

    fn trace_placeholder(&self, outdir: &Path, name: &str) {
        tracing::info!(
            "{}",
            self.options.root.join(outdir).join(name).display()
        );
    }
}

/// Resolve an `import` found inside a fetched manifest.
///
/// Relative local locations are taken relative to the parent manifest.
fn resolve_nested(parent: &SourceUrl, import: &ImportDirective) -> Result<SourceUrl> {
    if is_local_location(&import.location) && !import.location.starts_with('/') {
        return Ok(parent.join(&import.location));
    }
    resolve(
        &import.location,
        import.reference.as_deref(),
        import.manifest.as_deref(),
    )
}
