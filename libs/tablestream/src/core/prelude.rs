// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Commonly used types for `use tablestream::prelude::*`.

pub use crate::core::{
    // Errors
    error::{Result, StreamError},

    // Data model
    chunk::{Chunk, Column, ColumnData},
    data::{DataUnit, Fault, FaultKind},

    // Ports
    port::{port_pair, InputPort, OutputPort, TryPushError},

    // Node protocol
    processor::{PollStatus, Processor},

    // Stages
    collector::{CollectedUnits, Collector},
    sinks::{NullSink, Sink, StorageSink, TableLockHandle},
    sources::ChunkSource,
    transform::{FaultKeepingTransform, Transform},

    // Driver
    pipeline::{Pipeline, PipelineStatus},
};
