//! Error types for the BIN to ECS converter.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::block::BlockClass;

/// Result type for converter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for converter operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Load address is not on a 2K boundary or lies outside the address space.
    #[error("Location ${address:04X} must start on a 2K boundary inside $0000-$F800")]
    MisalignedAddress { address: u32 },

    /// Segment runs past the end of the address space.
    #[error("Segment at ${address:04X} with {words} words extends past $FFFF")]
    AddressOverflow { address: u32, words: u32 },

    /// Two segments claim the same block with incompatible types.
    #[error("Block {block} is already {existing}, cannot map it as {requested}")]
    ConflictingBlockClassification {
        block: usize,
        existing: BlockClass,
        requested: BlockClass,
    },

    /// No explicit descriptor, no catalog match and no fallback mapper.
    #[error("Unknown format: no .cfg file and no catalog entry for digest {digest}")]
    UnresolvedMapping { digest: String },

    /// Unparsable descriptor line. Collected and skipped, never fatal.
    #[error("Malformed descriptor on line {line} ('{text}'): {reason}")]
    MalformedDescriptor {
        line: usize,
        text: String,
        reason: String,
    },

    #[error("Unknown mapper profile '{0}'")]
    UnknownProfile(String),

    #[error("Invalid ECS container: {0}")]
    InvalidContainer(String),

    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn invalid_container(msg: impl Into<String>) -> Self {
        Self::InvalidContainer(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Errors that only affect a single descriptor line
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::MalformedDescriptor { .. })
    }
}
