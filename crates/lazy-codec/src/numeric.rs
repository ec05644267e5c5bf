// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-width integer and boolean codecs.

use crate::buffer::{Endian, SharedBitBuffer};
use crate::codec::{Builder, Codec, CodecDescriptor, Resolver, TypeInfo};
use crate::error::{ConfigError, Result};
use crate::expr::SizeExpr;
use std::marker::PhantomData;
use std::sync::Arc;

/// Integer type that can be built from up to 64 raw bits.
pub trait BitValue: Copy + Send + Sync + 'static {
    const BITS: u32;
    const SIGNED: bool;

    /// Convert the low `nbits` of `raw`, sign-extending for signed types.
    fn from_raw(raw: u64, nbits: u32) -> Self;
}

/// Generate `BitValue` for unsigned types (plain truncation)
macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl BitValue for $t {
            const BITS: u32 = <$t>::BITS;
            const SIGNED: bool = false;

            fn from_raw(raw: u64, _nbits: u32) -> Self {
                raw as $t
            }
        }
    )*};
}

/// Generate `BitValue` for signed types (sign extension from bit `nbits - 1`)
macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl BitValue for $t {
            const BITS: u32 = <$t>::BITS;
            const SIGNED: bool = true;

            fn from_raw(raw: u64, nbits: u32) -> Self {
                if nbits == 0 {
                    return 0;
                }
                let shift = 64 - nbits;
                (((raw << shift) as i64) >> shift) as $t
            }
        }
    )*};
}

impl_unsigned!(u8, u16, u32, u64);
impl_signed!(i8, i16, i32, i64);

/// Codec for an integer stored in `nbits` bits.
pub struct NumericCodec<T> {
    nbits: u32,
    endian: Endian,
    _marker: PhantomData<fn() -> T>,
}

impl<T: BitValue> NumericCodec<T> {
    /// Full-width, big-endian codec.
    pub fn new() -> Self {
        Self {
            nbits: T::BITS,
            endian: Endian::Big,
            _marker: PhantomData,
        }
    }

    /// Codec reading only `nbits` bits (1..=`T::BITS`).
    pub fn with_bits(nbits: u32) -> std::result::Result<Self, ConfigError> {
        if nbits == 0 || nbits > T::BITS {
            return Err(ConfigError::InvalidWidth {
                type_name: std::any::type_name::<T>(),
                bits: nbits,
                max: T::BITS,
            });
        }
        Ok(Self {
            nbits,
            ..Self::new()
        })
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn bits(&self) -> u32 {
        self.nbits
    }

    pub fn into_shared(self) -> Arc<dyn Codec<T>> {
        Arc::new(self)
    }
}

impl<T: BitValue> Default for NumericCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BitValue> Codec<T> for NumericCodec<T> {
    fn decode(
        &self,
        buffer: &SharedBitBuffer,
        _resolver: &Arc<dyn Resolver>,
        builder: &Arc<dyn Builder>,
    ) -> Result<T> {
        let position = buffer.bit_pos();
        let raw = buffer.read_bits(self.nbits, self.endian)?;
        builder.materialized(TypeInfo::of::<T>(), position);
        Ok(T::from_raw(raw, self.nbits))
    }

    fn size_expr(&self) -> SizeExpr {
        SizeExpr::Const(u64::from(self.nbits))
    }

    fn size(&self, _resolver: &dyn Resolver) -> Result<u64> {
        Ok(u64::from(self.nbits))
    }

    fn describe(&self) -> CodecDescriptor {
        let kind = if T::SIGNED { "signed" } else { "unsigned" };
        CodecDescriptor::new(
            std::any::type_name::<T>(),
            format!("{} {} integer", kind, self.endian),
            self.size_expr(),
        )
    }

    fn declared_type(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

/// Single-bit boolean codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn decode(
        &self,
        buffer: &SharedBitBuffer,
        _resolver: &Arc<dyn Resolver>,
        builder: &Arc<dyn Builder>,
    ) -> Result<bool> {
        let position = buffer.bit_pos();
        let value = buffer.read_bool()?;
        builder.materialized(TypeInfo::of::<bool>(), position);
        Ok(value)
    }

    fn size_expr(&self) -> SizeExpr {
        SizeExpr::Const(1)
    }

    fn describe(&self) -> CodecDescriptor {
        CodecDescriptor::new("bool", "single bit flag", SizeExpr::Const(1))
    }

    fn declared_type(&self) -> TypeInfo {
        TypeInfo::of::<bool>()
    }
}
