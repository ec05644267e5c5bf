// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Placeholder construction.
//!
//! A lazy codec must hand back a value of the declared type `T` before the real
//! value exists. Only types with a capability surface (usually
//! `Arc<dyn SomeTrait>`) can do that: the trait is implemented once for
//! [`DeferredValue<Arc<dyn SomeTrait>>`] by forwarding every method through
//! [`DeferredValue::get`], and the registry records how to box a handle into `T`.
//!
//! ```ignore
//! trait Reading: Send + Sync {
//!     fn value(&self) -> lazy_codec::Result<u32>;
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
//! ```

use super::deferred::DeferredValue;
use crate::codec::TypeInfo;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Builds a stand-in of type `T` that routes every capability through the handle.
pub type PlaceholderFn<T> = fn(DeferredValue<T>) -> T;

/// Type that can stand in for itself while its decode is deferred.
pub trait Deferrable: Sized + Send + Sync + 'static {
    fn placeholder(handle: DeferredValue<Self>) -> Self;
}

/// Placeholder constructors keyed by declared type.
#[derive(Default)]
pub struct PlaceholderRegistry {
    factories: HashMap<TypeId, (TypeInfo, Box<dyn Any + Send + Sync>)>,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for `T`.
    pub fn register<T: 'static>(&mut self, factory: PlaceholderFn<T>) -> &mut Self {
        let ty = TypeInfo::of::<T>();
        self.factories.insert(ty.id(), (ty, Box::new(factory)));
        self
    }

    pub fn register_deferrable<T: Deferrable>(&mut self) -> &mut Self {
        self.register::<T>(T::placeholder)
    }

    pub fn get<T: 'static>(&self) -> Option<PlaceholderFn<T>> {
        self.factories
            .get(&TypeId::of::<T>())
            .and_then(|(_, factory)| factory.downcast_ref::<PlaceholderFn<T>>())
            .copied()
    }

    pub fn contains(&self, ty: TypeInfo) -> bool {
        self.factories.contains_key(&ty.id())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for PlaceholderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.factories.values().map(|(ty, _)| ty))
            .finish()
    }
}
