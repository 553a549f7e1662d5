// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The atomic message carried by a port: a chunk, or a captured fault.
//!
//! A fault travels in-band, in place of the chunk that failed, so a
//! terminal consumer sees every failure that occurred upstream in the
//! exact position it occurred. Faults carry a kind and a message, never
//! partial data.

use std::fmt;

use super::chunk::Chunk;
use super::error::StreamError;

/// Where in the stage lifecycle a fault was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Malformed input, captured by an upstream decoder.
    Decode,
    /// A `transform` hook failed on one chunk.
    Transform,
    /// A sink `consume` hook failed to write one chunk.
    Write,
    /// An `on_finish` hook failed after input was exhausted.
    Teardown,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Decode => write!(f, "decode"),
            FaultKind::Transform => write!(f, "transform"),
            FaultKind::Write => write!(f, "write"),
            FaultKind::Teardown => write!(f, "teardown"),
        }
    }
}

/// A captured processing failure traveling as a stream element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    kind: FaultKind,
    message: String,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Capture a hook error. Storage and decode errors keep their own
    /// kind; everything else is a transform failure.
    pub fn from_error(error: &StreamError) -> Self {
        let kind = match error {
            StreamError::StorageWrite(_) => FaultKind::Write,
            StreamError::MalformedData(_) => FaultKind::Decode,
            _ => FaultKind::Transform,
        };
        Self::new(kind, error.to_string())
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fault: {}", self.kind, self.message)
    }
}

/// Tagged union carried by ports. Order on a port is significant and every
/// stage preserves it.
#[derive(Debug, Clone, PartialEq)]
pub enum DataUnit {
    Chunk(Chunk),
    Fault(Fault),
}

impl DataUnit {
    pub fn is_chunk(&self) -> bool {
        matches!(self, DataUnit::Chunk(_))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, DataUnit::Fault(_))
    }

    pub fn as_chunk(&self) -> Option<&Chunk> {
        match self {
            DataUnit::Chunk(chunk) => Some(chunk),
            DataUnit::Fault(_) => None,
        }
    }

    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            DataUnit::Chunk(_) => None,
            DataUnit::Fault(fault) => Some(fault),
        }
    }
}

impl From<Chunk> for DataUnit {
    fn from(chunk: Chunk) -> Self {
        DataUnit::Chunk(chunk)
    }
}

impl From<Fault> for DataUnit {
    fn from(fault: Fault) -> Self {
        DataUnit::Fault(fault)
    }
}
