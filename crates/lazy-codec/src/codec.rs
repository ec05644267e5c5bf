// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec contract and the context threaded through decode calls.
//!
//! A [`Codec`] reads one typed value from a [`SharedBitBuffer`]. Codecs are
//! immutable and shared (`Arc<dyn Codec<T>>`) across decode calls and threads.
//! The [`Resolver`] gives access to values decoded earlier in the tree (used by
//! size expressions) and the [`Builder`] is notified of every materialized value.

use crate::buffer::SharedBitBuffer;
use crate::error::{DecodingError, Result};
use crate::expr::SizeExpr;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Runtime description of a Rust type.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeInfo({})", self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Human-readable description of a codec (used for generated format docs).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodecDescriptor {
    pub title: String,
    pub summary: String,
    pub size: SizeExpr,
}

impl CodecDescriptor {
    pub fn new(title: impl Into<String>, summary: impl Into<String>, size: SizeExpr) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            size,
        }
    }
}

impl fmt::Display for CodecDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} bits]: {}", self.title, self.size, self.summary)
    }
}

/// Access to values already decoded in the current tree.
pub trait Resolver: Send + Sync {
    /// Look up a named value, failing with [`DecodingError::Unresolved`] when absent.
    fn get(&self, name: &str) -> Result<u64>;
}

/// Receives a notification for every value a codec materializes.
pub trait Builder: Send + Sync {
    fn materialized(&self, ty: TypeInfo, position: u64) {
        let _ = (ty, position);
    }
}

/// Construction-time view of the names a resolver will be able to supply.
pub trait ResolverContext {
    fn knows(&self, name: &str) -> bool;
}

/// Reads a typed value from a bit buffer.
pub trait Codec<T>: Send + Sync {
    /// Decode a value starting at the buffer cursor, leaving the cursor after it.
    fn decode(
        &self,
        buffer: &SharedBitBuffer,
        resolver: &Arc<dyn Resolver>,
        builder: &Arc<dyn Builder>,
    ) -> Result<T>;

    /// Size of the encoded value, as an expression over the resolver.
    fn size_expr(&self) -> SizeExpr;

    /// Size of the encoded value in bits. Must not read the buffer.
    fn size(&self, resolver: &dyn Resolver) -> Result<u64> {
        self.size_expr().eval(resolver)
    }

    fn describe(&self) -> CodecDescriptor;

    /// Type callers asked this codec to produce.
    fn declared_type(&self) -> TypeInfo;

    /// Every type this codec may produce.
    fn related_types(&self) -> Vec<TypeInfo> {
        vec![self.declared_type()]
    }
}

/// Codec adapting the output of another codec with a plain function.
///
/// Mostly used to lift a primitive codec into a capability type, e.g.
/// `u32 -> Arc<dyn Reading>`.
pub struct MapCodec<A, B> {
    inner: Arc<dyn Codec<A>>,
    map: fn(A) -> B,
}

impl<A, B> MapCodec<A, B> {
    pub fn new(inner: Arc<dyn Codec<A>>, map: fn(A) -> B) -> Self {
        Self { inner, map }
    }
}

impl<A: 'static, B: 'static> Codec<B> for MapCodec<A, B> {
    fn decode(
        &self,
        buffer: &SharedBitBuffer,
        resolver: &Arc<dyn Resolver>,
        builder: &Arc<dyn Builder>,
    ) -> Result<B> {
        self.inner.decode(buffer, resolver, builder).map(self.map)
    }

    fn size_expr(&self) -> SizeExpr {
        self.inner.size_expr()
    }

    fn size(&self, resolver: &dyn Resolver) -> Result<u64> {
        self.inner.size(resolver)
    }

    fn describe(&self) -> CodecDescriptor {
        self.inner.describe()
    }

    fn declared_type(&self) -> TypeInfo {
        TypeInfo::of::<B>()
    }

    fn related_types(&self) -> Vec<TypeInfo> {
        let mut types = vec![TypeInfo::of::<B>()];
        types.extend(self.inner.related_types());
        types
    }
}

/// [`Resolver`] backed by a name -> value map.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<String, u64>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: u64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: u64) {
        self.values.insert(name.into(), value);
    }
}

impl Resolver for MapResolver {
    fn get(&self, name: &str) -> Result<u64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| DecodingError::Unresolved { name: name.into() })
    }
}

impl ResolverContext for MapResolver {
    fn knows(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// [`Builder`] that counts materialized values.
#[derive(Debug, Default)]
pub struct DefaultBuilder {
    materialized: AtomicUsize,
}

impl DefaultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values materialized so far.
    pub fn count(&self) -> usize {
        self.materialized.load(Ordering::Relaxed)
    }
}

impl Builder for DefaultBuilder {
    fn materialized(&self, ty: TypeInfo, position: u64) {
        log::trace!("[builder] {} materialized at bit {}", ty, position);
        self.materialized.fetch_add(1, Ordering::Relaxed);
    }
}

/// [`ResolverContext`] listing the field names declared so far.
#[derive(Debug, Clone, Default)]
pub struct FieldContext {
    names: HashSet<String>,
}

impl FieldContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }
}

impl ResolverContext for FieldContext {
    fn knows(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DefaultBitBuffer;
    use crate::numeric::NumericCodec;

    #[test]
    fn test_type_info_compares_by_type() {
        assert_eq!(TypeInfo::of::<u32>(), TypeInfo::of::<u32>());
        assert_ne!(TypeInfo::of::<u32>(), TypeInfo::of::<i32>());
        assert_eq!(TypeInfo::of::<u32>().name(), "u32");
    }

    #[test]
    fn test_map_resolver_and_context() {
        let resolver = MapResolver::new().with("len", 7);
        assert_eq!(resolver.get("len").unwrap(), 7);
        assert!(resolver.knows("len"));
        assert!(!resolver.knows("other"));

        let ctx = FieldContext::new().with_field("len");
        assert!(ctx.knows("len"));
    }

    #[test]
    fn test_map_codec_lifts_output_type() {
        let inner: Arc<dyn Codec<u8>> = Arc::new(NumericCodec::<u8>::new());
        let codec = MapCodec::new(inner, |v: u8| u32::from(v) * 2);

        let buffer = DefaultBitBuffer::shared(vec![21u8]);
        let resolver: Arc<dyn Resolver> = Arc::new(MapResolver::new());
        let builder: Arc<dyn Builder> = Arc::new(DefaultBuilder::new());

        assert_eq!(codec.decode(&buffer, &resolver, &builder).unwrap(), 42);
        assert_eq!(codec.size(resolver.as_ref()).unwrap(), 8);
        assert_eq!(codec.declared_type(), TypeInfo::of::<u32>());
        assert_eq!(
            codec.related_types(),
            vec![TypeInfo::of::<u32>(), TypeInfo::of::<u8>()]
        );
    }

    #[test]
    fn test_default_builder_counts() {
        let builder = DefaultBuilder::new();
        builder.materialized(TypeInfo::of::<u8>(), 0);
        builder.materialized(TypeInfo::of::<u8>(), 8);
        assert_eq!(builder.count(), 2);
    }

    #[test]
    fn test_descriptor_display() {
        let desc = CodecDescriptor::new("payload", "opaque bytes", SizeExpr::reference("len", 8));
        assert_eq!(desc.to_string(), "payload [len * 8 bits]: opaque bytes");
    }
}
