//! Shared utilities for chunkview

pub mod error;

pub use error::{BackendError, ChunkviewError, ParseError, Result};
