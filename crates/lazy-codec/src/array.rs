// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Variable-length byte array codec.

use crate::buffer::SharedBitBuffer;
use crate::codec::{Builder, Codec, CodecDescriptor, Resolver, TypeInfo};
use crate::error::{DecodingError, Result};
use crate::expr::SizeExpr;
use std::sync::Arc;

/// Codec for `length` bytes, where `length` may reference an earlier field.
#[derive(Debug, Clone)]
pub struct ByteArrayCodec {
    length: SizeExpr,
}

impl ByteArrayCodec {
    /// `length` is expressed in bytes.
    pub fn new(length: impl Into<SizeExpr>) -> Self {
        Self {
            length: length.into(),
        }
    }
}

impl Codec<Vec<u8>> for ByteArrayCodec {
    fn decode(
        &self,
        buffer: &SharedBitBuffer,
        resolver: &Arc<dyn Resolver>,
        builder: &Arc<dyn Builder>,
    ) -> Result<Vec<u8>> {
        let position = buffer.bit_pos();
        let len = self.length.eval(resolver.as_ref())?;
        let len = usize::try_from(len).map_err(|_| DecodingError::InvalidSize {
            reason: format!("{} bytes do not fit in memory", len),
        })?;
        let bytes = buffer.read_bytes(len)?;
        builder.materialized(TypeInfo::of::<Vec<u8>>(), position);
        Ok(bytes)
    }

    fn size_expr(&self) -> SizeExpr {
        self.length.scaled(8)
    }

    fn describe(&self) -> CodecDescriptor {
        CodecDescriptor::new(
            "byte array",
            format!("{} bytes", self.length),
            self.size_expr(),
        )
    }

    fn declared_type(&self) -> TypeInfo {
        TypeInfo::of::<Vec<u8>>()
    }
}
