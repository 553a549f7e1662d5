// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! In-memory source emitting a queued sequence of data units.
//!
//! Stands in for the upstream decoder in tests and structural pipelines:
//! it pushes its units downstream in order (faults included, e.g. to
//! replay what a malformed-input decoder would emit) and closes its
//! output port when drained.

use std::collections::VecDeque;

use crate::core::data::DataUnit;
use crate::core::error::{Result, StreamError};
use crate::core::port::{OutputPort, TryPushError};
use crate::core::processor::{PollStatus, Processor};

pub struct ChunkSource {
    name: String,
    queue: VecDeque<DataUnit>,
    output: OutputPort,
    finished: bool,
}

impl ChunkSource {
    pub fn new(name: impl Into<String>, units: Vec<DataUnit>, output: OutputPort) -> Self {
        Self {
            name: name.into(),
            queue: units.into(),
            output,
            finished: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn finish(&mut self, cancelled: bool) -> PollStatus {
        if cancelled {
            tracing::debug!(
                "[{}] output closed by downstream, dropping {} queued units",
                self.name,
                self.queue.len()
            );
            self.queue.clear();
        } else {
            self.output.close();
            tracing::debug!("[{}] drained, output closed", self.name);
        }
        self.finished = true;
        PollStatus::Finished
    }
}

impl Processor for ChunkSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&mut self) -> Result<PollStatus> {
        if self.finished {
            return Ok(PollStatus::Finished);
        }
        if self.output.is_closed() {
            return Ok(self.finish(true));
        }
        if self.queue.is_empty() {
            return Ok(self.finish(false));
        }
        if self.output.can_push() {
            Ok(PollStatus::Ready)
        } else {
            Ok(PollStatus::OutputBlocked)
        }
    }

    fn work(&mut self) -> Result<()> {
        let unit = self.queue.pop_front().ok_or_else(|| {
            StreamError::Contract(format!("[{}] work() called with an empty queue", self.name))
        })?;
        match self.output.try_push(unit) {
            Ok(()) => {
                tracing::trace!("[{}] emitted unit, {} queued", self.name, self.queue.len());
                Ok(())
            }
            Err(error) => {
                // Put the unit back; the next prepare() reports the wait.
                self.queue.push_front(error.into_inner());
                Ok(())
            }
        }
    }
}
