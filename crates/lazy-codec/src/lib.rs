// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lazy Codec
//!
//! Bit-level binary decoding with per-field lazy loading. A field marked lazy
//! is skipped during the decode pass: the cursor jumps over its encoded size
//! and the caller receives a placeholder. The real decode runs the first time
//! the placeholder is used, from the position recorded at skip time, and the
//! result is cached.
//!
//! # Architecture
//!
//! ```text
//!  field codec + metadata
//!           |
//!           v
//!  +----------------------+   not lazy   +------------------+
//!  | LazyLoadingDecorator |------------->|  codec unchanged |
//!  +----------------------+              +------------------+
//!           | lazy
//!           v
//!  +----------------------+  decode: size, skip, placeholder
//!  |      LazyCodec       |-------------------------------+
//!  +----------------------+                               |
//!                                                         v
//!  +----------------------+  first use: seek, decode,  +-------------+
//!  |    DeferredValue     |<---------------------------| placeholder |
//!  +----------------------+  restore cursor, cache     +-------------+
//! ```
//!
//! # Quick Start
//!
//! ```
//! use lazy_codec::{
//!     Builder, Codec, CodecDecorator, DefaultBitBuffer, DefaultBuilder, DeferredValue, Deferrable,
//!     FieldContext, FieldMetadata, LazyLoadingDecorator, MapCodec, MapResolver,
//!     NumericCodec, PlaceholderRegistry, Resolver, TypeInfo,
//! };
//! use std::sync::Arc;
//!
//! trait Reading: Send + Sync {
//!     fn value(&self) -> lazy_codec::Result<u32>;
//! }
//!
//! impl Reading for u32 {
//!     fn value(&self) -> lazy_codec::Result<u32> {
//!         Ok(*self)
//!     }
//! }
//!
//! impl Reading for DeferredValue<Arc<dyn Reading>> {
//!     fn value(&self) -> lazy_codec::Result<u32> {
//!         self.get()?.value()
//!     }
//! }
//!
//! impl Deferrable for Arc<dyn Reading> {
//!     fn placeholder(handle: DeferredValue<Self>) -> Self {
//!         Arc::new(handle)
//!     }
//! }
//!
//! let mut registry = PlaceholderRegistry::new();
//! registry.register_deferrable::<Arc<dyn Reading>>();
//! let decorator = LazyLoadingDecorator::new(registry);
//!
//! let eager: Arc<dyn Codec<Arc<dyn Reading>>> = Arc::new(MapCodec::new(
//!     NumericCodec::<u32>::new().into_shared(),
//!     |v: u32| Arc::new(v) as Arc<dyn Reading>,
//! ));
//! let lazy = decorator
//!     .decorate(
//!         eager,
//!         Some(&FieldMetadata::new("reading").lazy(true)),
//!         TypeInfo::of::<Arc<dyn Reading>>(),
//!         &FieldContext::new(),
//!     )
//!     .unwrap();
//!
//! let buffer = DefaultBitBuffer::shared(vec![0x00u8, 0x00, 0x00, 0x2A]);
//! let resolver: Arc<dyn Resolver> = Arc::new(MapResolver::new());
//! let builder: Arc<dyn Builder> = Arc::new(DefaultBuilder::new());
//!
//! let reading = lazy.decode(&buffer, &resolver, &builder).unwrap();
//! assert_eq!(buffer.bit_pos(), 32);
//!
//! buffer.set_bit_pos(0);
//! assert_eq!(reading.value().unwrap(), 42);
//! assert_eq!(buffer.bit_pos(), 0);
//! ```

pub mod array;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod expr;
pub mod lazy;
pub mod numeric;

pub use array::ByteArrayCodec;
pub use buffer::{BitBuffer, DefaultBitBuffer, Endian, SharedBitBuffer};
pub use codec::{
    Builder, Codec, CodecDescriptor, DefaultBuilder, FieldContext, MapCodec, MapResolver,
    Resolver, ResolverContext, TypeInfo,
};
pub use config::{FailurePolicy, LazyConfig};
pub use error::{ConfigError, DecodingError, Result};
pub use expr::SizeExpr;
pub use lazy::{
    CodecDecorator, Deferrable, DeferredValue, FieldMetadata, LazyCodec, LazyLoadingDecorator,
    Metadata, PlaceholderFn, PlaceholderRegistry,
};
pub use numeric::{BitValue, BoolCodec, NumericCodec};
