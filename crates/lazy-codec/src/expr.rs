// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Size expressions.
//!
//! A codec reports its size as a [`SizeExpr`] so that callers can compute the
//! bit length of a value without touching the buffer. References name values
//! decoded earlier in the same tree and are looked up through a [`Resolver`].

use crate::codec::Resolver;
use crate::error::{DecodingError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit-size of an encoded value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SizeExpr {
    /// Fixed number of bits.
    Const(u64),
    /// `resolver.get(name) * scale` bits.
    Reference { name: String, scale: u64 },
    Sum(Box<SizeExpr>, Box<SizeExpr>),
    /// `expr * factor` bits, kept unfolded when folding would overflow.
    Scaled(Box<SizeExpr>, u64),
}

impl SizeExpr {
    pub fn reference(name: impl Into<String>, scale: u64) -> Self {
        SizeExpr::Reference {
            name: name.into(),
            scale,
        }
    }

    pub fn sum(a: SizeExpr, b: SizeExpr) -> Self {
        SizeExpr::Sum(Box::new(a), Box::new(b))
    }

    /// Same expression multiplied by `factor`.
    ///
    /// Constant and reference terms are folded when the product fits; anything
    /// else is wrapped so that [`eval`](Self::eval) reports the overflow.
    pub fn scaled(&self, factor: u64) -> Self {
        let folded = match self {
            SizeExpr::Const(bits) => bits.checked_mul(factor).map(SizeExpr::Const),
            SizeExpr::Reference { name, scale } => {
                scale.checked_mul(factor).map(|scale| SizeExpr::Reference {
                    name: name.clone(),
                    scale,
                })
            }
            SizeExpr::Sum(a, b) => Some(SizeExpr::sum(a.scaled(factor), b.scaled(factor))),
            SizeExpr::Scaled(inner, f) => f.checked_mul(factor).map(|f| inner.scaled(f)),
        };
        folded.unwrap_or_else(|| SizeExpr::Scaled(Box::new(self.clone()), factor))
    }

    /// True when the expression needs no resolver.
    pub fn is_constant(&self) -> bool {
        match self {
            SizeExpr::Const(_) => true,
            SizeExpr::Reference { .. } => false,
            SizeExpr::Sum(a, b) => a.is_constant() && b.is_constant(),
            SizeExpr::Scaled(inner, _) => inner.is_constant(),
        }
    }

    /// Evaluate to a bit count.
    pub fn eval(&self, resolver: &dyn Resolver) -> Result<u64> {
        match self {
            SizeExpr::Const(bits) => Ok(*bits),
            SizeExpr::Reference { name, scale } => {
                let value = resolver.get(name)?;
                value
                    .checked_mul(*scale)
                    .ok_or_else(|| DecodingError::InvalidSize {
                        reason: format!("{} ({}) * {} overflows", name, value, scale),
                    })
            }
            SizeExpr::Sum(a, b) => {
                let (a, b) = (a.eval(resolver)?, b.eval(resolver)?);
                a.checked_add(b).ok_or_else(|| DecodingError::InvalidSize {
                    reason: format!("{} + {} overflows", a, b),
                })
            }
            SizeExpr::Scaled(inner, factor) => {
                let bits = inner.eval(resolver)?;
                bits.checked_mul(*factor).ok_or_else(|| DecodingError::InvalidSize {
                    reason: format!("{} * {} overflows", bits, factor),
                })
            }
        }
    }
}

impl fmt::Display for SizeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeExpr::Const(bits) => write!(f, "{}", bits),
            SizeExpr::Reference { name, scale: 1 } => write!(f, "{}", name),
            SizeExpr::Reference { name, scale } => write!(f, "{} * {}", name, scale),
            SizeExpr::Sum(a, b) => write!(f, "({} + {})", a, b),
            SizeExpr::Scaled(inner, factor) => write!(f, "{} * {}", inner, factor),
        }
    }
}

impl From<u64> for SizeExpr {
    fn from(bits: u64) -> Self {
        SizeExpr::Const(bits)
    }
}
