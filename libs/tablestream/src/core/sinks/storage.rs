// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Storage sink: the fault-keeping stage specialized for table writes.
//!
//! A sink consumes chunks instead of transforming them; the output side
//! of the node carries only faults and completion signaling, never data.
//! `StorageSink` composes over the shared state machine: it implements
//! [`Transform`] by delegating each chunk to the wrapped [`Sink`]'s
//! `consume` hook and forwarding an empty chunk in its place.
//!
//! While the node lives it holds table lock handles: reference-counted
//! capabilities guaranteeing the target table's metadata and existence
//! stay put. The set is append-only and every handle is released exactly
//! once when the sink is dropped, on normal completion and failure paths
//! alike.

use std::any::Any;
use std::sync::Arc;

use crate::core::chunk::Chunk;
use crate::core::error::{Result, StreamError};
use crate::core::port::{InputPort, OutputPort};
use crate::core::transform::{FaultKeepingTransform, Transform};

/// Opaque, reference-counted lock capability supplied by the lock
/// acquisition collaborator. This core only stores and releases it.
pub type TableLockHandle = Arc<dyn Any + Send + Sync>;

/// The write-side extension points a concrete sink supplies.
pub trait Sink: Send + 'static {
    fn name(&self) -> &str;

    /// Invoked exactly once before the first chunk is consumed.
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Write one chunk into storage. Produces no output of its own.
    fn consume(&mut self, chunk: Chunk) -> Result<()>;

    /// Invoked exactly once after the input is exhausted.
    fn on_finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A [`Sink`] adapted onto the shared fault-keeping state machine.
pub struct StorageSink<S: Sink> {
    sink: S,
    table_locks: Vec<TableLockHandle>,
}

impl<S: Sink> StorageSink<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            table_locks: Vec::new(),
        }
    }

    /// Append a lock handle. Handles are never removed; they are released
    /// together when the sink is dropped.
    pub fn add_table_lock(&mut self, lock: TableLockHandle) {
        self.table_locks.push(lock);
    }

    pub fn table_lock_count(&self) -> usize {
        self.table_locks.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Wrap this sink in the shared stage state machine.
    pub fn into_node(self, input: InputPort, output: OutputPort) -> FaultKeepingTransform<Self> {
        FaultKeepingTransform::new(self, input, output)
    }
}

impl<S: Sink> Transform for StorageSink<S> {
    fn name(&self) -> &str {
        self.sink.name()
    }

    fn on_start(&mut self) -> Result<()> {
        self.sink.on_start()
    }

    fn transform(&mut self, chunk: Chunk) -> Result<Chunk> {
        match self.sink.consume(chunk) {
            // The consumed chunk's stream position is held by an empty
            // placeholder so completion stays observable downstream.
            Ok(()) => Ok(Chunk::empty()),
            Err(error @ StreamError::StorageWrite(_)) => Err(error),
            Err(other) => Err(StreamError::StorageWrite(other.to_string())),
        }
    }

    fn on_finish(&mut self) -> Result<()> {
        self.sink.on_finish()
    }
}
