// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Terminal stages that write chunks into storage.

pub mod null;
pub mod storage;

pub use null::NullSink;
pub use storage::{Sink, StorageSink, TableLockHandle};
