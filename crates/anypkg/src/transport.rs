// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Byte transports for local and network sources.
//!
//! The fetch engine only ever asks a [`Transport`] for the bytes behind a
//! [`SourceUrl`]. Implementations never touch the process working directory:
//! relative `file://` paths are resolved against an explicit root.

use std::io::Read;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::location::SourceUrl;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./transport_test.rs"]
mod transport_test;

/// Fetches the bytes behind a source URL.
pub trait Transport {
    /// Return the full content of `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the source is missing, unreadable or
    /// answers with a non-success status.
    fn fetch(&self, url: &SourceUrl) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch(&self, url: &SourceUrl) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }
}

/// Serves `file://` URLs from the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    root: PathBuf,
}

impl LocalTransport {
    /// Relative paths are resolved against `root`.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path behind a `file://` URL.
    pub fn path_for(&self, url: &SourceUrl) -> Option<PathBuf> {
        url.local_path().map(|path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.root.join(path)
            }
        })
    }
}

impl Transport for LocalTransport {
    fn fetch(&self, url: &SourceUrl) -> Result<Vec<u8>> {
        let path = self.path_for(url).ok_or_else(|| Error::Transport {
            url: url.to_string(),
            reason: "not a file:// URL".to_string(),
        })?;
        tracing::trace!(path = %path.display(), "reading local source");
        std::fs::read(&path).map_err(|e| Error::Transport {
            url: url.to_string(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}

/// Serves network URLs through a blocking `ureq` agent.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransport;

impl Transport for HttpTransport {
    fn fetch(&self, url: &SourceUrl) -> Result<Vec<u8>> {
        let response = http_agent()
            .get(url.as_str())
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;

        let mut bytes = Vec::new();
        response
            .into_body()
            .as_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| Error::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }
}

/// Shared `ureq` agent. Requests have no timeout.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(true)
            .build();
        ureq::Agent::new_with_config(config)
    })
}

fn map_ureq_error(url: &SourceUrl, err: &ureq::Error) -> Error {
    let reason = match err {
        ureq::Error::StatusCode(code) => {
            format!("HTTP request failed with status code: {code}")
        }
        other => other.to_string(),
    };
    Error::Transport {
        url: url.to_string(),
        reason,
    }
}

/// Dispatches `file://` URLs locally and everything else over HTTP.
#[derive(Debug, Clone)]
pub struct DefaultTransport {
    local: LocalTransport,
    http: HttpTransport,
}

impl DefaultTransport {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            local: LocalTransport::new(root),
            http: HttpTransport,
        }
    }
}

impl Transport for DefaultTransport {
    fn fetch(&self, url: &SourceUrl) -> Result<Vec<u8>> {
        if url.is_local() {
            self.local.fetch(url)
        } else {
            self.http.fetch(url)
        }
    }
}
