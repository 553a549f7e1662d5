// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! One-input/one-output stage that keeps faults in the stream.
//!
//! `FaultKeepingTransform` wraps a user-supplied [`Transform`] and runs it
//! under the `prepare()`/`work()` protocol with much care about failures:
//!
//! - A fault arriving on the input port needs no transformation; it is
//!   forwarded to the output untouched, keeping its position.
//! - When `transform` fails on a chunk, the chunk is replaced by a fault
//!   built from that failure. The stream does not stop: later chunks are
//!   still processed, and any number of faults may pass through in order.
//! - `on_start` runs exactly once, before the first unit is pulled. Its
//!   failure is NOT placed on the output port: it surfaces synchronously
//!   from `prepare()`, aborting the node before any data motion.
//! - `on_finish` runs exactly once, after the input is closed and drained.
//!   Its failure becomes a trailing fault on the output, if the output is
//!   still open to carry it.

use super::chunk::Chunk;
use super::data::{DataUnit, Fault, FaultKind};
use super::error::{Result, StreamError};
use super::port::{InputPort, OutputPort, TryPushError};
use super::processor::{PollStatus, Processor};

/// The extension points a concrete transform stage supplies. Nothing else
/// of the state machine is overridable.
pub trait Transform: Send + 'static {
    fn name(&self) -> &str;

    /// Invoked exactly once, strictly before the first unit is pulled.
    fn on_start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Invoked once per input chunk. Produces a new chunk; the input is
    /// consumed either way.
    fn transform(&mut self, chunk: Chunk) -> Result<Chunk>;

    /// Invoked exactly once, after the input port is closed and drained
    /// and before the output port is closed.
    fn on_finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Node lifecycle. One-way transitions only; `Finishing` is the window
/// after `on_finish` ran while its trailing fault (if any) awaits flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    NotStarted,
    Running,
    Finishing,
    Finished,
}

/// The shared stage state machine: single input port, single output port,
/// at most one pending input chunk and one pending output unit.
pub struct FaultKeepingTransform<T: Transform> {
    inner: T,
    input: InputPort,
    output: OutputPort,
    state: Lifecycle,
    pending_input: Option<Chunk>,
    pending_output: Option<DataUnit>,
}

impl<T: Transform> FaultKeepingTransform<T> {
    pub fn new(inner: T, input: InputPort, output: OutputPort) -> Self {
        Self {
            inner,
            input,
            output,
            state: Lifecycle::NotStarted,
            pending_input: None,
            pending_output: None,
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Mutable access to the wrapped stage, e.g. to append lock handles
    /// after construction.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Downstream closed the port: stop pulling input and finish without
    /// touching `transform` again. `on_finish` is intentionally skipped on
    /// this path; no consumer remains for a trailing fault, and cleanup
    /// that must run unconditionally belongs in `Drop`.
    fn cancel(&mut self) -> PollStatus {
        tracing::debug!(
            "[{}] output closed by downstream, finishing without on_finish",
            self.inner.name()
        );
        self.input.close();
        self.pending_input = None;
        self.pending_output = None;
        self.state = Lifecycle::Finished;
        PollStatus::Finished
    }
}

impl<T: Transform> Processor for FaultKeepingTransform<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn prepare(&mut self) -> Result<PollStatus> {
        if self.state == Lifecycle::Finished {
            return Ok(PollStatus::Finished);
        }

        // Cancellation is observed before anything else, on the very next
        // poll after downstream closes.
        if self.output.is_closed() {
            return Ok(self.cancel());
        }

        if self.state == Lifecycle::NotStarted {
            // Setup failure escalates to the caller, never onto a port.
            self.inner.on_start()?;
            tracing::debug!("[{}] started", self.inner.name());
            self.state = Lifecycle::Running;
        }

        loop {
            // Drain before buffering: a pending unit leaves first, so the
            // node never holds more than one unit on each side.
            if let Some(unit) = self.pending_output.take() {
                match self.output.try_push(unit) {
                    Ok(()) => {
                        tracing::trace!("[{}] pushed unit downstream", self.inner.name());
                    }
                    Err(TryPushError::Busy(unit)) => {
                        self.pending_output = Some(unit);
                        return Ok(PollStatus::OutputBlocked);
                    }
                    Err(TryPushError::Closed(_)) => {
                        // Downstream went away between polls; the unit has
                        // no remaining consumer.
                        return Ok(self.cancel());
                    }
                }
            }

            if self.state == Lifecycle::Finishing {
                // Trailing fault (if any) is flushed; the stream is over.
                self.output.close();
                self.state = Lifecycle::Finished;
                tracing::debug!("[{}] finished", self.inner.name());
                return Ok(PollStatus::Finished);
            }

            if self.pending_input.is_some() {
                return Ok(PollStatus::Ready);
            }

            match self.input.try_pop() {
                Some(DataUnit::Fault(fault)) => {
                    // Already a fault: no transformation required, forward
                    // it untouched in its stream position.
                    tracing::trace!("[{}] forwarding upstream fault: {}", self.inner.name(), fault);
                    self.pending_output = Some(DataUnit::Fault(fault));
                }
                Some(DataUnit::Chunk(chunk)) => {
                    self.pending_input = Some(chunk);
                    return Ok(PollStatus::Ready);
                }
                None => {
                    if !self.input.is_closed() {
                        return Ok(PollStatus::NeedsInput);
                    }
                    // Upstream exhausted. Runs at most once: the state
                    // moves to Finishing right after.
                    if let Err(error) = self.inner.on_finish() {
                        tracing::warn!(
                            "[{}] on_finish failed, keeping fault in stream: {}",
                            self.inner.name(),
                            error
                        );
                        self.pending_output =
                            Some(DataUnit::Fault(Fault::new(FaultKind::Teardown, error.to_string())));
                    }
                    self.state = Lifecycle::Finishing;
                }
            }
        }
    }

    fn work(&mut self) -> Result<()> {
        let chunk = self.pending_input.take().ok_or_else(|| {
            StreamError::Contract(format!(
                "[{}] work() called with no pending chunk",
                self.inner.name()
            ))
        })?;

        match self.inner.transform(chunk) {
            Ok(produced) => {
                self.pending_output = Some(DataUnit::Chunk(produced));
            }
            Err(error) => {
                // The failed chunk is gone; its stream position carries the
                // captured fault instead. Later chunks still flow.
                tracing::warn!(
                    "[{}] transform failed, keeping fault in stream: {}",
                    self.inner.name(),
                    error
                );
                self.pending_output = Some(DataUnit::Fault(Fault::from_error(&error)));
            }
        }
        Ok(())
    }
}
