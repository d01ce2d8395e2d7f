// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Resolution of manifest location tokens into source URLs.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::{Error, MANIFEST_FILENAME, Result};

#[cfg(test)]
#[path = "./location_test.rs"]
mod location_test;

/// Scheme prefix of local file sources.
pub const FILE_SCHEME: &str = "file://";

/// Prefix of forge shorthand locations.
pub const FORGE_PREFIX: &str = "github.com/";

/// Base of the raw-content URLs built from forge shorthand.
pub const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";

/// Branch used when a forge shorthand gives none.
pub const DEFAULT_BRANCH: &str = "master";

/// A resolved, dereferenceable source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SourceUrl(String);

impl SourceUrl {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path of a `file://` URL, or `None` for any other scheme.
    pub fn local_path(&self) -> Option<&Path> {
        self.0.strip_prefix(FILE_SCHEME).map(Path::new)
    }

    pub fn is_local(&self) -> bool {
        self.local_path().is_some()
    }

    /// Text after the last `/`.
    pub fn base_name(&self) -> &str {
        self.body().rsplit('/').next().unwrap_or_default()
    }

    /// True when this URL names a manifest file.
    pub fn is_manifest(&self) -> bool {
        self.base_name() == MANIFEST_FILENAME
    }

    /// Resolve `relative` against the directory holding this URL.
    ///
    /// `.` and `<segment>/..` pairs are collapsed, so every route to the same
    /// source yields the same URL.
    pub fn join(&self, relative: &str) -> Self {
        let relative = relative.trim_start_matches("./");
        let body = self.body();
        // `file://name` has no directory component
        let dir = body.rfind('/').map(|idx| &body[..=idx]).unwrap_or_default();
        let joined = collapse(&format!("{dir}{relative}"), !self.is_local());
        Self(format!("{}{joined}", &self.0[..self.scheme_len()]))
    }

    fn scheme_len(&self) -> usize {
        self.0.find("://").map(|idx| idx + 3).unwrap_or(0)
    }

    fn body(&self) -> &str {
        &self.0[self.scheme_len()..]
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lexically collapse `.` and `<segment>/..` in a `/` separated path.
///
/// A leading `.` or `/` is kept. With `keep_host` the first segment is never
/// removed.
fn collapse(path: &str, keep_host: bool) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for (idx, part) in path.split('/').enumerate() {
        match part {
            "." | "" if idx > 0 => {}
            ".." => match parts.last().copied() {
                // `..` above the filesystem root stays at the root
                Some("") => {}
                Some(".") => {
                    parts.pop();
                    parts.push("..");
                }
                None | Some("..") => parts.push(".."),
                Some(_) if keep_host && parts.len() == 1 => parts.push(".."),
                Some(_) => {
                    parts.pop();
                }
            },
            _ => parts.push(part),
        }
    }
    parts.join("/")
}

/// True when a location names a local path.
pub fn is_local_location(location: &str) -> bool {
    location.starts_with("..") || location.starts_with("./") || location.starts_with('/')
}

/// Turn a location token into a source URL.
///
/// Rules are tried in order and the first match wins:
///
/// 1. `..`, `./` or `/` prefix: a local file, `file://<location>`.
/// 2. Anything containing `://`: used verbatim.
/// 3. `github.com/<owner>/<repo>`: the raw-content URL of
///    `<reference>` (default `master`) and `<manifest>` (default `.package`).
///
/// Everything else is an [`Error::InvalidLocation`].
pub fn resolve(
    location: &str,
    reference: Option<&str>,
    manifest: Option<&str>,
) -> Result<SourceUrl> {
    if is_local_location(location) {
        return Ok(SourceUrl(format!("{FILE_SCHEME}{location}")));
    }
    if location.contains("://") {
        return Ok(SourceUrl(location.to_string()));
    }
    if let Some(repo) = location.strip_prefix(FORGE_PREFIX) {
        let branch = reference.unwrap_or(DEFAULT_BRANCH);
        let file = manifest.unwrap_or(MANIFEST_FILENAME);
        return Ok(SourceUrl(format!(
            "{RAW_CONTENT_BASE}/{repo}/{branch}/{file}"
        )));
    }
    Err(Error::InvalidLocation(location.to_string()))
}
