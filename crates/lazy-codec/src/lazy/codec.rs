// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec that skips over its value and decodes it on first access.

use super::deferred::{DeferredValue, Pending};
use super::placeholder::PlaceholderFn;
use crate::buffer::SharedBitBuffer;
use crate::codec::{Builder, Codec, CodecDescriptor, Resolver, TypeInfo};
use crate::config::LazyConfig;
use crate::error::{DecodingError, Result};
use crate::expr::SizeExpr;
use std::sync::Arc;

/// Wraps a codec so that `decode` only moves the cursor past the value and
/// returns a placeholder backed by a [`DeferredValue`].
///
/// Sizing, description and related types are delegated to the wrapped codec;
/// `declared_type` reports the type the wrapper was built for.
pub struct LazyCodec<T> {
    wrapped: Arc<dyn Codec<T>>,
    declared: TypeInfo,
    placeholder: PlaceholderFn<T>,
    config: LazyConfig,
}

impl<T> LazyCodec<T> {
    pub fn new(
        wrapped: Arc<dyn Codec<T>>,
        declared: TypeInfo,
        placeholder: PlaceholderFn<T>,
        config: LazyConfig,
    ) -> Self {
        Self {
            wrapped,
            declared,
            placeholder,
            config,
        }
    }

    pub fn wrapped(&self) -> &Arc<dyn Codec<T>> {
        &self.wrapped
    }

    pub fn config(&self) -> LazyConfig {
        self.config
    }
}

impl<T: Send + Sync + 'static> Codec<T> for LazyCodec<T> {
    fn decode(
        &self,
        buffer: &SharedBitBuffer,
        resolver: &Arc<dyn Resolver>,
        builder: &Arc<dyn Builder>,
    ) -> Result<T> {
        // Size must be known before the cursor moves; failures surface here.
        let size = self.wrapped.size(resolver.as_ref())?;
        let position = buffer.bit_pos();
        let next = position
            .checked_add(size)
            .ok_or_else(|| DecodingError::InvalidSize {
                reason: format!("{} bits at bit {} overflow the cursor", size, position),
            })?;
        buffer.set_bit_pos(next);

        log::debug!(
            "[lazy] deferred {} ({} bits at bit {})",
            self.declared,
            size,
            position
        );

        let pending = Pending {
            codec: Arc::clone(&self.wrapped),
            buffer: Arc::clone(buffer),
            resolver: Arc::clone(resolver),
            builder: Arc::clone(builder),
        };
        let handle = DeferredValue::new(pending, position, size, self.config);
        Ok((self.placeholder)(handle))
    }

    fn size_expr(&self) -> SizeExpr {
        self.wrapped.size_expr()
    }

    fn size(&self, resolver: &dyn Resolver) -> Result<u64> {
        self.wrapped.size(resolver)
    }

    fn describe(&self) -> CodecDescriptor {
        self.wrapped.describe()
    }

    fn declared_type(&self) -> TypeInfo {
        self.declared
    }

    fn related_types(&self) -> Vec<TypeInfo> {
        self.wrapped.related_types()
    }
}
