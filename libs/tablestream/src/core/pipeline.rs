// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Minimal sequential driver for a flat list of nodes.
//!
//! Steps every node (prepare, then work while ready) in repeated passes
//! on the calling thread. Nodes are visited in insertion order, so add
//! them upstream-first and a unit handed off this pass is seen by its
//! consumer in the same pass.
//!
//! This is deliberately not a graph scheduler: no topology, no thread
//! assignment, no wakeups. It exists so a linear chain can be driven to
//! completion in-process; anything larger belongs to an external
//! scheduler built on the same `prepare()`/`work()` protocol.

use super::error::Result;
use super::processor::{PollStatus, Processor};

/// Outcome of a `run()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Every node reports finished.
    Finished,
    /// No node could make progress; some node is waiting on an external
    /// party (an undrained terminal port, an open idle upstream).
    Stalled,
}

#[derive(Default)]
pub struct Pipeline {
    nodes: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node. Insertion order is visit order: upstream first.
    pub fn add<P: Processor>(&mut self, node: P) -> &mut Self {
        self.nodes.push(Box::new(node));
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drive all nodes until every one is finished or a full pass makes
    /// no progress. A setup failure aborts the run immediately.
    pub fn run(&mut self) -> Result<PipelineStatus> {
        loop {
            let mut all_finished = true;
            let mut progressed = false;

            for node in &mut self.nodes {
                let mut status = match node.prepare() {
                    Ok(status) => status,
                    Err(error) => {
                        tracing::error!("[{}] setup failed, aborting run: {}", node.name(), error);
                        return Err(error);
                    }
                };
                while status == PollStatus::Ready {
                    node.work()?;
                    progressed = true;
                    status = node.prepare()?;
                }
                if status != PollStatus::Finished {
                    all_finished = false;
                }
            }

            if all_finished {
                tracing::debug!("pipeline finished, {} nodes", self.nodes.len());
                return Ok(PipelineStatus::Finished);
            }
            if !progressed {
                tracing::debug!("pipeline quiescent, waiting on external party");
                return Ok(PipelineStatus::Stalled);
            }
        }
    }
}
