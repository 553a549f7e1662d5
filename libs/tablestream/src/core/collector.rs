// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Terminal consumer accumulating every unit that reaches it.
//!
//! The stand-in for the downstream collaborator at the end of a chain: it
//! drains its input port and keeps the units in arrival order, so a full
//! pipeline run can report the aggregate of all faults that reached the
//! terminal position. The collected units sit behind a shared handle,
//! readable after the collector itself has been moved into a driver.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::core::data::{DataUnit, Fault};
use crate::core::error::{Result, StreamError};
use crate::core::port::InputPort;
use crate::core::processor::{PollStatus, Processor};

/// Shared view of the units a [`Collector`] has received.
pub type CollectedUnits = Arc<Mutex<Vec<DataUnit>>>;

pub struct Collector {
    name: String,
    input: InputPort,
    units: CollectedUnits,
    finished: bool,
}

impl Collector {
    pub fn new(name: impl Into<String>, input: InputPort) -> Self {
        Self {
            name: name.into(),
            input,
            units: Arc::new(Mutex::new(Vec::new())),
            finished: false,
        }
    }

    /// Handle to the collected units, valid after the collector is moved
    /// into a driver.
    pub fn handle(&self) -> CollectedUnits {
        Arc::clone(&self.units)
    }

    /// Every unit received so far, in arrival order.
    pub fn units(&self) -> Vec<DataUnit> {
        self.units.lock().clone()
    }

    /// The faults received so far, in arrival order.
    pub fn faults(&self) -> Vec<Fault> {
        self.units
            .lock()
            .iter()
            .filter_map(|unit| unit.as_fault().cloned())
            .collect()
    }
}

impl Processor for Collector {
    fn name(&self) -> &str {
        &self.name
    }

    fn prepare(&mut self) -> Result<PollStatus> {
        if self.finished {
            return Ok(PollStatus::Finished);
        }
        if self.input.has_data() {
            return Ok(PollStatus::Ready);
        }
        if self.input.is_exhausted() {
            self.finished = true;
            tracing::debug!(
                "[{}] stream over, {} units collected",
                self.name,
                self.units.lock().len()
            );
            return Ok(PollStatus::Finished);
        }
        Ok(PollStatus::NeedsInput)
    }

    fn work(&mut self) -> Result<()> {
        let unit = self.input.try_pop().ok_or_else(|| {
            StreamError::Contract(format!("[{}] work() called with no input", self.name))
        })?;
        if let DataUnit::Fault(fault) = &unit {
            tracing::warn!("[{}] fault reached terminal consumer: {}", self.name, fault);
        }
        self.units.lock().push(unit);
        Ok(())
    }
}
