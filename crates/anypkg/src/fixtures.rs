// Copyright (c) Contributors to the anypkg project.
// SPDX-License-Identifier: Apache-2.0

//! Shared test fixtures.

use std::cell::RefCell;
use std::collections::HashMap;

use rstest::fixture;
use tempfile::TempDir;

use crate::location::SourceUrl;
use crate::transport::Transport;
use crate::{Error, Result};

/// In-memory transport serving registered URLs and recording every call.
#[derive(Default)]
pub struct MemoryTransport {
    content: HashMap<String, Vec<u8>>,
    calls: RefCell<Vec<String>>,
}

impl MemoryTransport {
    pub fn with<U: Into<String>, B: Into<Vec<u8>>>(mut self, url: U, bytes: B) -> Self {
        self.content.insert(url.into(), bytes.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Transport for MemoryTransport {
    fn fetch(&self, url: &SourceUrl) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push(url.to_string());
        self.content
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Error::Transport {
                url: url.to_string(),
                reason: "HTTP request failed with status code: 404".to_string(),
            })
    }
}

#[fixture]
pub fn tmpdir() -> TempDir {
    tempfile::Builder::new()
        .prefix("anypkg-test-")
        .tempdir()
        .expect("create a temp directory")
}
