// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Columnar row batches flowing between pipeline stages.
//!
//! A `Chunk` is immutable once produced: column payloads sit behind `Arc`,
//! so cloning a chunk (or handing it to a port) never copies cell data, and
//! nothing mutates a chunk in place after it has been queued. Transforms
//! build a new `Chunk` instead.

use std::sync::Arc;

use super::error::{Result, StreamError};

/// Typed cell storage for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
    Bool(Vec<bool>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A shared, immutable column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    data: Arc<ColumnData>,
}

impl Column {
    pub fn new(data: ColumnData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Column::new(ColumnData::Int64(values))
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::new(ColumnData::Float64(values))
    }
}

impl From<Vec<String>> for Column {
    fn from(values: Vec<String>) -> Self {
        Column::new(ColumnData::Utf8(values))
    }
}

impl From<Vec<bool>> for Column {
    fn from(values: Vec<bool>) -> Self {
        Column::new(ColumnData::Bool(values))
    }
}

/// An ordered batch of columns plus a row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Chunk {
    /// Build a chunk from columns, checking that every column has the same
    /// number of rows.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map(Column::len).unwrap_or(0);
        for (i, column) in columns.iter().enumerate() {
            if column.len() != num_rows {
                return Err(StreamError::ChunkLayout(format!(
                    "column {} has {} rows, expected {}",
                    i,
                    column.len(),
                    num_rows
                )));
            }
        }
        Ok(Self { columns, num_rows })
    }

    /// A chunk with no columns and no rows. Sinks forward this as the
    /// completion placeholder for a consumed batch.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            num_rows: 0,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }
}
