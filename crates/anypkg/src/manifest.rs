// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Line-oriented parsing of `.package` manifests.
//!
//! The grammar has no comments, continuations or escapes. Each non-blank line
//! is one directive whose first whitespace separated token is the keyword.

use std::path::Path;

use crate::directive::{Directive, DirectiveKind, FileDirective, ImportDirective};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./manifest_test.rs"]
mod manifest_test;

/// The raw lines of a manifest, kept in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    lines: Vec<String>,
}

impl Manifest {
    /// Parse manifest text.
    pub fn parse<S: AsRef<str>>(text: S) -> Self {
        Self {
            lines: text.as_ref().lines().map(String::from).collect(),
        }
    }

    /// Parse fetched manifest bytes, replacing invalid UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(String::from_utf8_lossy(bytes))
    }

    /// Load a manifest from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;
        Ok(Self::parse(text))
    }

    /// Number of raw lines, blank ones included.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Directives in file order. Stops after the first unknown keyword.
    pub fn directives(&self) -> Directives<'_> {
        Directives {
            lines: self.lines.iter().enumerate(),
            failed: false,
        }
    }

    /// Typed `import` directives, other kinds skipped.
    pub fn imports(&self) -> impl Iterator<Item = Result<ImportDirective>> + '_ {
        self.directives().filter_map(|d| match d {
            Ok(d) if d.kind == DirectiveKind::Import => Some(ImportDirective::try_from(&d)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
    }

    /// Typed `file` directives, other kinds skipped.
    pub fn files(&self) -> impl Iterator<Item = Result<FileDirective>> + '_ {
        self.directives().filter_map(|d| match d {
            Ok(d) if d.kind == DirectiveKind::File => Some(FileDirective::try_from(&d)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
    }
}

/// Lazy iterator over the directives of a [`Manifest`].
pub struct Directives<'a> {
    lines: std::iter::Enumerate<std::slice::Iter<'a, String>>,
    failed: bool,
}

impl Iterator for Directives<'_> {
    type Item = Result<Directive>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        for (idx, text) in self.lines.by_ref() {
            let Some(directive) = Directive::from_line(idx + 1, text) else {
                continue;
            };
            if directive.kind == DirectiveKind::Unknown {
                self.failed = true;
                return Some(Err(Error::ManifestParse {
                    line: directive.line,
                    reason: format!("unknown directive '{}'", directive.keyword()),
                }));
            }
            return Some(Ok(directive));
        }
        None
    }
}
