// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Checksum registry and the guarded merge copier.
//!
//! The registry remembers the digest of every destination file written during
//! a run. A second write to the same destination is only allowed when it
//! carries the same content.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest as ShaDigest, Sha256};
use walkdir::WalkDir;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./registry_test.rs"]
mod registry_test;

/// Lowercase hex SHA-256 of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(bytes)))
    }

    /// Stream a file through the hasher.
    pub fn of_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path).map_err(Error::fs(path))?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher).map_err(Error::fs(path))?;
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of recording a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// First write to this destination in the run.
    New,
    /// Same content as the previous write.
    Unchanged,
}

/// Files and directories produced by one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Destination files written, in walk order.
    pub written: Vec<PathBuf>,
    /// Destination directories ensured.
    pub directories: usize,
}

/// Run-scoped map from destination path to the digest written there.
#[derive(Debug, Default)]
pub struct ChecksumRegistry {
    entries: Mutex<HashMap<PathBuf, Digest>>,
}

impl ChecksumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Digest recorded for `path`, if any.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<Digest> {
        self.entries.lock().get(&normalize(path.as_ref())).cloned()
    }

    /// Record `digest` for `path` unless a different digest is already on file.
    ///
    /// The check and the insert happen under one lock.
    pub fn record<P: AsRef<Path>>(&self, path: P, digest: Digest) -> Result<Recorded> {
        let key = normalize(path.as_ref());
        let mut entries = self.entries.lock();
        match entries.entry(key) {
            Entry::Vacant(vacant) => {
                vacant.insert(digest);
                Ok(Recorded::New)
            }
            Entry::Occupied(existing) if *existing.get() == digest => Ok(Recorded::Unchanged),
            Entry::Occupied(existing) => Err(Error::ChecksumConflict {
                path: existing.key().clone(),
                existing: existing.get().to_string(),
                incoming: digest.to_string(),
            }),
        }
    }

    /// Copy the tree under `staging` into `dest`, refusing conflicting files.
    ///
    /// A conflicting file is rejected before its destination is touched.
    /// Files merged earlier in the same walk stay in place.
    pub fn merge<S, D>(&self, staging: S, dest: D) -> Result<MergeStats>
    where
        S: AsRef<Path>,
        D: AsRef<Path>,
    {
        let staging = staging.as_ref();
        let dest = dest.as_ref();
        let mut stats = MergeStats::default();
        std::fs::create_dir_all(dest).map_err(Error::fs(dest))?;

        for entry in WalkDir::new(staging).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Filesystem {
                path: e.path().unwrap_or(staging).to_path_buf(),
                error: e.into(),
            })?;
            let rel = entry
                .path()
                .strip_prefix(staging)
                .map_err(|e| Error::Filesystem {
                    path: entry.path().to_path_buf(),
                    error: io::Error::other(e),
                })?;
            let out = dest.join(rel);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&out).map_err(Error::fs(&out))?;
                stats.directories += 1;
            } else if entry.file_type().is_file() {
                let digest = Digest::of_file(entry.path())?;
                match self.record(&out, digest)? {
                    Recorded::New => tracing::debug!(path = %out.display(), "merging new file"),
                    Recorded::Unchanged => {
                        tracing::debug!(path = %out.display(), "re-merging identical file")
                    }
                }
                std::fs::copy(entry.path(), &out).map_err(Error::fs(&out))?;
                stats.written.push(out);
            } else {
                tracing::warn!(path = %entry.path().display(), "skipping non-regular staged entry");
            }
        }

        Ok(stats)
    }
}

/// Drop `.` components so equivalent spellings share one registry key.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
