// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! anypkg - minimal manifest-driven vendoring
//!
//! This crate resolves a `.package` manifest of source locations and
//! materializes the files they name into a local directory tree. When two
//! imports write the same destination path their content must agree,
//! otherwise the run aborts.
//!
//! # Example
//!
//! ```text
//! # .package
//! import ./shared/.package -> vendor/shared
//! import github.com/acme/lib -> vendor/lib
//! import github.com/acme/tools v2 tools.package -> vendor/tools
//! import https://example.com/LICENSE -> legal
//! ```
//!
//! A fetched manifest lists the files it provides, one per line:
//!
//! ```text
//! file util.go
//! file internal/parse.go
//! ```

pub mod directive;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod location;
pub mod manifest;
pub mod registry;
pub mod run;
pub mod staging;
pub mod transport;

#[cfg(test)]
mod fixtures;

pub use directive::{Directive, DirectiveKind, FileDirective, ImportDirective};
pub use error::{Error, Result};
pub use fetch::{DEFAULT_MAX_DEPTH, FetchOptions, Fetcher, Mode};
pub use guard::{guard_file_path, guard_outdir};
pub use location::{SourceUrl, resolve};
pub use manifest::Manifest;
pub use registry::{ChecksumRegistry, Digest, MergeStats};
pub use run::{ImportPlan, RunReport, count_sums, plan_manifest, run_manifest};
pub use staging::StagingArea;
pub use transport::{DefaultTransport, HttpTransport, LocalTransport, Transport};

/// Well-known filename for manifests.
pub const MANIFEST_FILENAME: &str = ".package";
