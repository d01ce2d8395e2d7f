// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Path guards keeping manifest-directed writes inside the destination tree.

use crate::{Error, Result};

#[cfg(test)]
#[path = "./guard_test.rs"]
mod guard_test;

/// True when `path` contains a parent traversal or is absolute.
fn escapes(path: &str) -> bool {
    path.contains("..") || path.starts_with('/')
}

/// Reject output directory overrides that could leave the destination tree.
pub fn guard_outdir(outdir: &str) -> Result<()> {
    if escapes(outdir) {
        return Err(Error::InvalidOutputDir(outdir.to_string()));
    }
    Ok(())
}

/// Reject `file` directive paths that could leave the staging tree.
pub fn guard_file_path(path: &str) -> Result<()> {
    if path.is_empty() || escapes(path) {
        return Err(Error::InvalidFilePath(path.to_string()));
    }
    Ok(())
}
