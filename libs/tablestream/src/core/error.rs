// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Malformed input data: {0}")]
    MalformedData(String),

    #[error("Chunk layout error: {0}")]
    ChunkLayout(String),

    #[error("Transform failed: {0}")]
    Transform(String),

    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    #[error("Node contract violation: {0}")]
    Contract(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
