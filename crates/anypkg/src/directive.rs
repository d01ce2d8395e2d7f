// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Directive types parsed from `.package` manifest lines.

use serde::Serialize;

use crate::guard::{guard_file_path, guard_outdir};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./directive_test.rs"]
mod directive_test;

/// Separator introducing an output directory override.
pub const OUTDIR_ARROW: &str = "->";

/// Default destination for an import without `-> outdir`.
pub const DEFAULT_OUTDIR: &str = ".";

/// The kind of a manifest line, decided by its first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    Import,
    File,
    Sum,
    Unknown,
}

impl DirectiveKind {
    /// Classify a keyword. Matching is exact and case-sensitive.
    pub fn classify(keyword: &str) -> Self {
        match keyword {
            "import" => Self::Import,
            "file" => Self::File,
            "sum" => Self::Sum,
            _ => Self::Unknown,
        }
    }
}

/// One non-blank manifest line split into whitespace separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// 1-based line number within the manifest.
    pub line: usize,
    pub kind: DirectiveKind,
    /// All tokens of the line, keyword included.
    pub tokens: Vec<String>,
}

impl Directive {
    /// Split a raw line into a directive, or `None` for a blank line.
    pub fn from_line(line: usize, text: &str) -> Option<Self> {
        let tokens: Vec<String> = text.split_whitespace().map(String::from).collect();
        let kind = DirectiveKind::classify(tokens.first()?);
        Some(Self { line, kind, tokens })
    }

    /// The keyword that introduced this line.
    pub fn keyword(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or_default()
    }

    /// Tokens following the keyword.
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or_default()
    }

    fn parse_error(&self, reason: impl Into<String>) -> Error {
        Error::ManifestParse {
            line: self.line,
            reason: reason.into(),
        }
    }
}

/// `import <location> [<ref>] [<manifest>] [-> <outdir>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportDirective {
    pub line: usize,
    pub location: String,
    /// Branch or ref name for forge shorthand locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Manifest filename for forge shorthand locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    /// Destination relative to the run root, already guarded.
    pub outdir: String,
}

impl TryFrom<&Directive> for ImportDirective {
    type Error = Error;

    fn try_from(directive: &Directive) -> Result<Self> {
        if directive.kind != DirectiveKind::Import {
            return Err(directive.parse_error(format!(
                "expected an import directive, found '{}'",
                directive.keyword()
            )));
        }

        let args = directive.args();
        let (positional, outdir) = match args.iter().position(|a| a == OUTDIR_ARROW) {
            Some(idx) => {
                let rest = &args[idx + 1..];
                match rest {
                    [outdir] => (&args[..idx], outdir.as_str()),
                    [] => {
                        return Err(
                            directive.parse_error("missing output directory after '->'")
                        );
                    }
                    _ => {
                        return Err(directive.parse_error(format!(
                            "unexpected tokens after output directory: {}",
                            rest[1..].join(" ")
                        )));
                    }
                }
            }
            None => (args, DEFAULT_OUTDIR),
        };

        let (location, reference, manifest) = match positional {
            [location] => (location, None, None),
            [location, reference] => (location, Some(reference), None),
            [location, reference, manifest] => (location, Some(reference), Some(manifest)),
            [] => return Err(directive.parse_error("bad syntax for import: missing location")),
            _ => {
                return Err(directive.parse_error(format!(
                    "bad syntax for import: expected at most 3 arguments before '->', got {}",
                    positional.len()
                )));
            }
        };

        guard_outdir(outdir)?;

        Ok(Self {
            line: directive.line,
            location: location.clone(),
            reference: reference.cloned(),
            manifest: manifest.cloned(),
            outdir: outdir.to_string(),
        })
    }
}

/// `file <relative-path>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDirective {
    pub line: usize,
    pub path: String,
}

impl TryFrom<&Directive> for FileDirective {
    type Error = Error;

    fn try_from(directive: &Directive) -> Result<Self> {
        if directive.kind != DirectiveKind::File {
            return Err(directive.parse_error(format!(
                "expected a file directive, found '{}'",
                directive.keyword()
            )));
        }
        let path = match directive.args() {
            [path, ..] => path,
            [] => return Err(directive.parse_error("file directive is missing a path")),
        };
        guard_file_path(path)?;
        Ok(Self {
            line: directive.line,
            path: path.clone(),
        })
    }
}
