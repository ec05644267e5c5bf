// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for decoding and codec construction.

use thiserror::Error;

/// Result type for decode operations.
pub type Result<T> = std::result::Result<T, DecodingError>;

/// Failure while sizing or decoding a value.
///
/// `Clone` so a poisoned deferred value can replay the failure that
/// poisoned it on every later access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    #[error("unexpected end of buffer at bit {position}: requested {requested} bits of {length}")]
    UnexpectedEnd {
        position: u64,
        requested: u64,
        length: u64,
    },

    #[error("unresolved reference `{name}`")]
    Unresolved { name: String },

    #[error("invalid size: {reason}")]
    InvalidSize { reason: String },

    #[error("invalid data at bit {position}: {reason}")]
    InvalidData { position: u64, reason: String },

    #[error("deferred value at bit {position} failed earlier: {cause}")]
    Poisoned {
        position: u64,
        cause: Box<DecodingError>,
    },
}

/// Failure while assembling a codec (decorator or codec construction time).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("type `{type_name}` has no registered placeholder; it cannot be decoded lazily")]
    NotInterceptable { type_name: &'static str },

    #[error("invalid width of {bits} bits for `{type_name}` (1..={max})")]
    InvalidWidth {
        type_name: &'static str,
        bits: u32,
        max: u32,
    },
}
