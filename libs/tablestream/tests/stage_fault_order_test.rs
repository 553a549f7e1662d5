// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Stage Fault-Ordering Integration Test
//!
//! Verifies the stream-level guarantees of the fault-keeping stage over
//! whole pipeline runs:
//! 1. An all-success stream comes out transformed, same length, same order
//! 2. Interleaved faults keep the stream shape: fault stays fault,
//!    chunk becomes transformed chunk, order untouched
//! 3. Per-chunk failures replace exactly the failing positions
//! 4. Hooks run exactly once, in the right places
//! 5. Downstream cancellation stops processing without draining upstream

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tablestream::prelude::*;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn int_chunk(value: i64) -> Chunk {
    Chunk::new(vec![Column::from(vec![value])]).unwrap()
}

fn chunk_value(chunk: &Chunk) -> i64 {
    match chunk.columns()[0].data() {
        ColumnData::Int64(values) => values[0],
        other => panic!("expected int column, got {:?}", other),
    }
}

// -----------------------------------------------------------------------------
// Test-only transform: doubles int64 cells, optionally failing on a set of
// chunk positions, and counts its hook invocations.
// -----------------------------------------------------------------------------

struct Doubling {
    fail_on: Vec<usize>,
    next_position: usize,
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
}

impl Doubling {
    fn new(fail_on: Vec<usize>) -> Self {
        Self {
            fail_on,
            next_position: 0,
            started: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::clone(&self.started), Arc::clone(&self.finished))
    }
}

impl Transform for Doubling {
    fn name(&self) -> &str {
        "doubling"
    }

    fn on_start(&mut self) -> Result<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn transform(&mut self, chunk: Chunk) -> Result<Chunk> {
        // Any ordering violation shows up as a fault in the output.
        if self.started.load(Ordering::SeqCst) != 1 {
            return Err(StreamError::Contract("transform before on_start".into()));
        }
        let position = self.next_position;
        self.next_position += 1;

        if self.fail_on.contains(&position) {
            return Err(StreamError::Transform(format!(
                "chunk {} rejected",
                position
            )));
        }

        let doubled: Vec<i64> = match chunk.columns()[0].data() {
            ColumnData::Int64(values) => values.iter().map(|v| v * 2).collect(),
            _ => return Err(StreamError::Transform("unsupported column".into())),
        };
        Chunk::new(vec![Column::from(doubled)])
    }

    fn on_finish(&mut self) -> Result<()> {
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn run_chain(units: Vec<DataUnit>, transform: Doubling) -> Vec<DataUnit> {
    let (src_tx, src_rx) = port_pair();
    let (out_tx, out_rx) = port_pair();

    let mut pipeline = Pipeline::new();
    pipeline
        .add(ChunkSource::new("source", units, src_tx))
        .add(FaultKeepingTransform::new(transform, src_rx, out_tx));

    let collector_rx = out_rx;
    let mut collected = Vec::new();
    loop {
        match pipeline.run().unwrap() {
            PipelineStatus::Finished => break,
            PipelineStatus::Stalled => {
                // Terminal port full: play the downstream collaborator.
                collected.push(collector_rx.try_pop().unwrap());
            }
        }
    }
    while let Some(unit) = collector_rx.try_pop() {
        collected.push(unit);
    }
    collected
}

#[test]
fn test_all_success_stream_keeps_length_and_order() {
    init_logging();

    let units: Vec<DataUnit> = (0..5).map(|i| DataUnit::Chunk(int_chunk(i))).collect();
    let output = run_chain(units, Doubling::new(Vec::new()));

    assert_eq!(output.len(), 5);
    for (i, unit) in output.iter().enumerate() {
        assert_eq!(chunk_value(unit.as_chunk().unwrap()), i as i64 * 2);
    }
}

#[test]
fn test_interleaved_faults_keep_stream_shape() {
    init_logging();

    let decode_fault = Fault::new(FaultKind::Decode, "corrupted message");
    let units = vec![
        DataUnit::Chunk(int_chunk(10)),
        DataUnit::Fault(decode_fault.clone()),
        DataUnit::Chunk(int_chunk(20)),
        DataUnit::Fault(decode_fault.clone()),
        DataUnit::Fault(decode_fault.clone()),
        DataUnit::Chunk(int_chunk(30)),
    ];

    let output = run_chain(units, Doubling::new(Vec::new()));

    assert_eq!(output.len(), 6);
    assert_eq!(chunk_value(output[0].as_chunk().unwrap()), 20);
    assert_eq!(output[1].as_fault(), Some(&decode_fault));
    assert_eq!(chunk_value(output[2].as_chunk().unwrap()), 40);
    assert_eq!(output[3].as_fault(), Some(&decode_fault));
    assert_eq!(output[4].as_fault(), Some(&decode_fault));
    assert_eq!(chunk_value(output[5].as_chunk().unwrap()), 60);
}

#[test]
fn test_failures_replace_exactly_their_positions() {
    init_logging();

    let units: Vec<DataUnit> = (0..6).map(|i| DataUnit::Chunk(int_chunk(i))).collect();
    let output = run_chain(units, Doubling::new(vec![2, 5]));

    assert_eq!(output.len(), 6);
    for (i, unit) in output.iter().enumerate() {
        if i == 2 || i == 5 {
            let fault = unit.as_fault().unwrap();
            assert_eq!(fault.kind(), FaultKind::Transform);
            assert!(fault.message().contains(&format!("chunk {} rejected", i)));
        } else {
            assert_eq!(chunk_value(unit.as_chunk().unwrap()), i as i64 * 2);
        }
    }
}

#[test]
fn test_hooks_run_once_in_order() {
    init_logging();

    let transform = Doubling::new(Vec::new());
    let (started, finished) = transform.counters();

    let units: Vec<DataUnit> = (0..4).map(|i| DataUnit::Chunk(int_chunk(i))).collect();
    run_chain(units, transform);

    assert_eq!(started.load(Ordering::SeqCst), 1);
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_zero_chunk_stream_still_runs_both_hooks() {
    init_logging();

    let transform = Doubling::new(Vec::new());
    let (started, finished) = transform.counters();

    let output = run_chain(Vec::new(), transform);

    assert!(output.is_empty());
    assert_eq!(started.load(Ordering::SeqCst), 1);
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_downstream_cancel_stops_pulling_input() {
    init_logging();

    let (src_tx, src_rx) = port_pair();
    let (out_tx, out_rx) = port_pair();

    let transform = Doubling::new(Vec::new());
    let (started, finished) = transform.counters();
    let mut node = FaultKeepingTransform::new(transform, src_rx, out_tx);

    // A chunk is waiting, but downstream cancels first.
    src_tx.try_push(DataUnit::Chunk(int_chunk(1))).unwrap();
    out_rx.close();

    assert_eq!(node.prepare().unwrap(), PollStatus::Finished);

    // Upstream told to stop, nothing processed, on_finish skipped.
    assert!(src_tx.is_closed());
    assert_eq!(node.inner().next_position, 0);
    assert_eq!(started.load(Ordering::SeqCst), 0);
    assert_eq!(finished.load(Ordering::SeqCst), 0);
}

#[test]
fn test_setup_failure_aborts_run_with_no_stream_output() {
    init_logging();

    struct BadStart;

    impl Transform for BadStart {
        fn name(&self) -> &str {
            "bad_start"
        }

        fn on_start(&mut self) -> Result<()> {
            Err(StreamError::Other(anyhow::anyhow!("missing table")))
        }

        fn transform(&mut self, _chunk: Chunk) -> Result<Chunk> {
            unreachable!("no data may move after a setup failure");
        }
    }

    let (src_tx, src_rx) = port_pair();
    let (out_tx, out_rx) = port_pair();

    let mut pipeline = Pipeline::new();
    pipeline
        .add(ChunkSource::new(
            "source",
            vec![DataUnit::Chunk(int_chunk(1))],
            src_tx,
        ))
        .add(FaultKeepingTransform::new(BadStart, src_rx, out_tx));

    assert!(pipeline.run().is_err());
    assert!(!out_rx.has_data());
}
