// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for anypkg operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with anypkg Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while importing or cleaning a manifest.
///
/// Every variant is fatal to the run that produced it.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Unrecognized directive keyword or malformed directive
    #[error("line {line}: {reason}")]
    #[diagnostic(
        code(anypkg::manifest_parse),
        help("Each non-blank line must start with one of: import, file, sum")
    )]
    ManifestParse { line: usize, reason: String },

    /// Location token matches none of the resolver rules
    #[error("invalid location: '{0}'")]
    #[diagnostic(
        code(anypkg::invalid_location),
        help("Use a local path (./, ../, /), a full URL, or github.com/<owner>/<repo>")
    )]
    InvalidLocation(String),

    /// Output directory override escapes the destination tree
    #[error("Invalid output directory: {0}")]
    #[diagnostic(
        code(anypkg::invalid_output_dir),
        help("Output directories must be relative and must not contain '..'")
    )]
    InvalidOutputDir(String),

    /// File directive path escapes the staging tree
    #[error("Invalid file path: {0}")]
    #[diagnostic(
        code(anypkg::invalid_file_path),
        help("File paths must be relative and must not contain '..'")
    )]
    InvalidFilePath(String),

    /// Underlying fetch failed
    #[error("Error fetching {url}: {reason}")]
    #[diagnostic(code(anypkg::transport))]
    Transport { url: String, reason: String },

    /// Two directives wrote different content to the same destination
    #[error("Contents of file differ between imports: {path:?}")]
    #[diagnostic(
        code(anypkg::checksum_conflict),
        help("existing sha256 {existing}, incoming sha256 {incoming}")
    )]
    ChecksumConflict {
        path: PathBuf,
        existing: String,
        incoming: String,
    },

    /// Nested manifests went deeper than allowed
    #[error("Manifest nesting deeper than {depth} levels at {url}")]
    #[diagnostic(
        code(anypkg::recursion_limit),
        help("Raise --max-depth or check the manifests for an import chain that never ends")
    )]
    RecursionLimit { url: String, depth: usize },

    /// Failed to read a manifest from disk
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(anypkg::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Directory creation, file write or tree walk failed
    #[error("Filesystem operation failed on {path:?}")]
    #[diagnostic(code(anypkg::filesystem))]
    Filesystem {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl Error {
    /// Wrap an io error with the path it occurred on.
    pub(crate) fn fs<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |error| Self::Filesystem { path, error }
    }
}
