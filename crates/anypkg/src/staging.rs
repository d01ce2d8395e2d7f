// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Per-fetch staging directories.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./staging_test.rs"]
mod staging_test;

/// Prefix of every staging directory name.
pub const STAGING_PREFIX: &str = "pkg";

static SEQUENCE: AtomicUsize = AtomicUsize::new(0);

/// A uniquely named temporary directory owned by one fetch.
///
/// The name combines a per-process sequence number with a random suffix. The
/// directory and everything in it is removed on drop.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    sequence: usize,
}

impl StagingArea {
    /// Create a staging area under the system temporary directory.
    pub fn new() -> Result<Self> {
        Self::new_in(std::env::temp_dir())
    }

    /// Create a staging area under `parent`.
    pub fn new_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        let parent = parent.as_ref();
        let sequence = SEQUENCE.fetch_add(1, Ordering::SeqCst) + 1;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{STAGING_PREFIX}{sequence}-"))
            .tempdir_in(parent)
            .map_err(Error::fs(parent))?;
        tracing::trace!(path = %dir.path().display(), "created staging area");
        Ok(Self { dir, sequence })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Position of this area in the process-wide creation order.
    pub fn sequence(&self) -> usize {
        self.sequence
    }
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(Error::fs(parent))?;
    }
    std::fs::write(path, bytes).map_err(Error::fs(path))?;
    Ok(path.to_path_buf())
}
