// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::core::chunk::Chunk;
use crate::core::error::Result;

use super::storage::Sink;

/// Sink that accepts every chunk and writes nothing. Used where a
/// pipeline branch must exist structurally but must not persist data,
/// e.g. a dry computation path.
pub struct NullSink {
    name: String,
}

impl NullSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new("null_sink")
    }
}

impl Sink for NullSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn consume(&mut self, _chunk: Chunk) -> Result<()> {
        Ok(())
    }
}
