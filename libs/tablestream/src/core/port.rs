// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Single-slot ports connecting adjacent pipeline stages.
//!
//! A port is a one-directional, single-producer/single-consumer channel
//! holding at most one `DataUnit`. The two halves are created as a pair
//! over one shared slot: the upstream node owns the `OutputPort` (write
//! side), the downstream node owns the `InputPort` (read side). Ports
//! never block; absence of capacity or data is reported as a status so
//! the scheduler decides what to do next.
//!
//! Either half may close the port. Upstream closes to signal end of
//! stream; downstream closes to cancel. A closed port rejects every
//! further push, but a unit already buffered can still be popped.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use super::data::DataUnit;

struct PortState {
    slot: Option<DataUnit>,
    closed: bool,
}

struct Shared {
    state: Mutex<PortState>,
}

/// Why a `try_push` did not take the unit. The unit is handed back so the
/// caller can keep it buffered: this is a scheduling signal, not a fault.
#[derive(Debug)]
pub enum TryPushError {
    /// The slot is occupied; retry once downstream has popped.
    Busy(DataUnit),
    /// The port is closed; no push will ever succeed again.
    Closed(DataUnit),
}

impl TryPushError {
    pub fn into_inner(self) -> DataUnit {
        match self {
            TryPushError::Busy(unit) | TryPushError::Closed(unit) => unit,
        }
    }
}

impl fmt::Display for TryPushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryPushError::Busy(_) => write!(f, "port slot is occupied"),
            TryPushError::Closed(_) => write!(f, "port is closed"),
        }
    }
}

/// Create a connected port pair: (write side, read side).
pub fn port_pair() -> (OutputPort, InputPort) {
    let shared = Arc::new(Shared {
        state: Mutex::new(PortState {
            slot: None,
            closed: false,
        }),
    });
    (
        OutputPort {
            shared: Arc::clone(&shared),
        },
        InputPort { shared },
    )
}

/// Write side of a port, owned by the upstream node.
pub struct OutputPort {
    shared: Arc<Shared>,
}

impl OutputPort {
    /// Push a unit if the slot is empty and the port is open. Fails with
    /// the unit handed back otherwise.
    pub fn try_push(&self, unit: DataUnit) -> std::result::Result<(), TryPushError> {
        let mut state = self.shared.state.lock();
        if state.closed {
            return Err(TryPushError::Closed(unit));
        }
        if state.slot.is_some() {
            return Err(TryPushError::Busy(unit));
        }
        state.slot = Some(unit);
        Ok(())
    }

    /// True once the slot can take a unit right now.
    pub fn can_push(&self) -> bool {
        let state = self.shared.state.lock();
        !state.closed && state.slot.is_none()
    }

    /// True once either side has closed the port. For the upstream node
    /// this is the downstream cancellation signal.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Close the port: no further writes will occur. Idempotent.
    pub fn close(&self) {
        self.shared.state.lock().closed = true;
    }
}

impl fmt::Debug for OutputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("OutputPort")
            .field("has_data", &state.slot.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}

/// Read side of a port, owned by the downstream node.
pub struct InputPort {
    shared: Arc<Shared>,
}

impl InputPort {
    /// Take the buffered unit, if any. Works on a closed port so buffered
    /// data is never lost to an end-of-stream race.
    pub fn try_pop(&self) -> Option<DataUnit> {
        self.shared.state.lock().slot.take()
    }

    pub fn has_data(&self) -> bool {
        self.shared.state.lock().slot.is_some()
    }

    /// True once no further writes will occur.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Closed and drained: the stream is over.
    pub fn is_exhausted(&self) -> bool {
        let state = self.shared.state.lock();
        state.closed && state.slot.is_none()
    }

    /// Close the port from the read side. This is the cancellation
    /// signal: upstream observes it and stops producing. Idempotent.
    pub fn close(&self) {
        self.shared.state.lock().closed = true;
    }
}

impl fmt::Debug for InputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("InputPort")
            .field("has_data", &state.slot.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}
