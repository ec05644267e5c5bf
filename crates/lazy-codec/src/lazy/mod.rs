// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lazy decoding.
//!
//! - [`LazyLoadingDecorator`] decides per field whether to wrap a codec.
//! - [`LazyCodec`] skips the value on decode and returns a placeholder.
//! - [`DeferredValue`] runs the real decode on first access and caches it.
//! - [`PlaceholderRegistry`] knows how to present a handle as the declared type.

mod codec;
mod deferred;
mod placeholder;

pub use codec::LazyCodec;
pub use deferred::DeferredValue;
pub use placeholder::{Deferrable, PlaceholderFn, PlaceholderRegistry};

use crate::codec::{Codec, ResolverContext, TypeInfo};
use crate::config::LazyConfig;
use crate::error::ConfigError;
use std::sync::Arc;

/// Per-field declaration metadata.
pub trait Metadata {
    /// Whether the field is marked for lazy loading.
    fn is_lazy(&self) -> bool;
}

/// Metadata attached to a named field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMetadata {
    name: String,
    lazy: bool,
}

impl FieldMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lazy: false,
        }
    }

    /// Set the lazy-loading marker.
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Metadata for FieldMetadata {
    fn is_lazy(&self) -> bool {
        self.lazy
    }
}

/// Hook that may replace the codec chosen for a field.
pub trait CodecDecorator {
    fn decorate<T: Send + Sync + 'static>(
        &self,
        codec: Arc<dyn Codec<T>>,
        metadata: Option<&dyn Metadata>,
        ty: TypeInfo,
        context: &dyn ResolverContext,
    ) -> Result<Arc<dyn Codec<T>>, ConfigError>;
}

/// Wraps codecs of fields marked lazy in a [`LazyCodec`].
#[derive(Debug, Default)]
pub struct LazyLoadingDecorator {
    placeholders: PlaceholderRegistry,
    config: LazyConfig,
}

impl LazyLoadingDecorator {
    pub fn new(placeholders: PlaceholderRegistry) -> Self {
        Self {
            placeholders,
            config: LazyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LazyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn placeholders(&self) -> &PlaceholderRegistry {
        &self.placeholders
    }

    pub fn placeholders_mut(&mut self) -> &mut PlaceholderRegistry {
        &mut self.placeholders
    }

    pub fn config(&self) -> LazyConfig {
        self.config
    }
}

impl CodecDecorator for LazyLoadingDecorator {
    /// Returns `codec` itself unless `metadata` carries the lazy marker.
    ///
    /// Fails only when the field is lazy and `T` has no registered placeholder.
    fn decorate<T: Send + Sync + 'static>(
        &self,
        codec: Arc<dyn Codec<T>>,
        metadata: Option<&dyn Metadata>,
        ty: TypeInfo,
        _context: &dyn ResolverContext,
    ) -> Result<Arc<dyn Codec<T>>, ConfigError> {
        if !metadata.is_some_and(|m| m.is_lazy()) {
            return Ok(codec);
        }

        let placeholder = self
            .placeholders
            .get::<T>()
            .ok_or(ConfigError::NotInterceptable {
                type_name: ty.name(),
            })?;

        log::debug!("[lazy] wrapping {} codec for {}", codec.describe().title, ty);
        Ok(Arc::new(LazyCodec::new(codec, ty, placeholder, self.config)))
    }
}
