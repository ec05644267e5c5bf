// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bit-addressable read buffers.
//!
//! A [`BitBuffer`] exposes a single cursor (`bit_pos`) and read primitives that
//! consume from the cursor forward. Buffers are shared between codecs through
//! [`SharedBitBuffer`]; every holder observes every cursor move.
//!
//! # Concurrency
//!
//! The cursor is stored atomically only so that a buffer can be shared across
//! threads without unsafe code. A read is `load cursor -> read -> store cursor`
//! and is **not** atomic as a whole: two decode traversals running against the
//! same buffer at the same time interleave and produce garbage. Keep at most one
//! traversal in flight per buffer.

use crate::error::{DecodingError, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Byte order for multi-byte reads.
///
/// Bits within a byte are always read most-significant first. `Little` only
/// changes the order of whole bytes, so it applies to widths that are a
/// multiple of 8; other widths are read big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endian::Big => write!(f, "big-endian"),
            Endian::Little => write!(f, "little-endian"),
        }
    }
}

/// Buffer shared by every codec of a decode tree and by the deferred values
/// they produce.
pub type SharedBitBuffer = Arc<dyn BitBuffer>;

/// Bit-addressable input with a single shared cursor.
pub trait BitBuffer: Send + Sync {
    /// Current cursor, in bits from the start of the buffer.
    fn bit_pos(&self) -> u64;

    /// Move the cursor. Positions past the end are accepted; the next read fails.
    fn set_bit_pos(&self, pos: u64);

    /// Total length in bits.
    fn bit_len(&self) -> u64;

    /// Read `nbits` (at most 64) from the cursor and advance it.
    ///
    /// On failure the cursor is left where it was.
    fn read_bits(&self, nbits: u32, endian: Endian) -> Result<u64>;

    fn read_bool(&self) -> Result<bool> {
        Ok(self.read_bits(1, Endian::Big)? == 1)
    }

    /// Read `len` whole bytes starting at the cursor (which need not be byte aligned).
    fn read_bytes(&self, len: usize) -> Result<Vec<u8>> {
        let start = self.bit_pos();
        let nbits = byte_bits(len)?;
        if nbits > self.remaining() {
            return Err(DecodingError::UnexpectedEnd {
                position: start,
                requested: nbits,
                length: self.bit_len(),
            });
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            match self.read_bits(8, Endian::Big) {
                Ok(byte) => out.push(byte as u8),
                Err(err) => {
                    self.set_bit_pos(start);
                    return Err(err);
                }
            }
        }
        Ok(out)
    }

    fn remaining(&self) -> u64 {
        self.bit_len().saturating_sub(self.bit_pos())
    }
}

/// Bit count of `len` bytes, rejecting lengths that overflow a bit cursor.
fn byte_bits(len: usize) -> Result<u64> {
    (len as u64)
        .checked_mul(8)
        .ok_or_else(|| DecodingError::InvalidSize {
            reason: format!("{} bytes overflow the bit cursor", len),
        })
}

/// In-memory [`BitBuffer`] over an immutable byte slice.
pub struct DefaultBitBuffer {
    data: Arc<[u8]>,
    pos: AtomicU64,
}

impl DefaultBitBuffer {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            data: data.into(),
            pos: AtomicU64::new(0),
        }
    }

    /// Wrap into the shared form expected by [`Codec::decode`](crate::Codec::decode).
    pub fn shared(data: impl Into<Arc<[u8]>>) -> SharedBitBuffer {
        Arc::new(Self::new(data))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn check(&self, pos: u64, requested: u64) -> Result<()> {
        let length = self.bit_len();
        match pos.checked_add(requested) {
            Some(end) if end <= length => Ok(()),
            _ => Err(DecodingError::UnexpectedEnd {
                position: pos,
                requested,
                length,
            }),
        }
    }

    fn bits_msb_first(&self, pos: u64, nbits: u32) -> u64 {
        (0..u64::from(nbits)).fold(0u64, |acc, i| {
            let bit = pos + i;
            let byte = self.data[(bit / 8) as usize];
            (acc << 1) | u64::from((byte >> (7 - bit % 8)) & 1)
        })
    }

    fn peek(&self, pos: u64, nbits: u32, endian: Endian) -> u64 {
        if nbits == 0 {
            return 0;
        }

        // Byte-aligned fast path
        if pos % 8 == 0 && nbits % 8 == 0 {
            let start = (pos / 8) as usize;
            let len = (nbits / 8) as usize;
            let bytes = &self.data[start..start + len];
            return match endian {
                Endian::Big => BigEndian::read_uint(bytes, len),
                Endian::Little => LittleEndian::read_uint(bytes, len),
            };
        }

        match endian {
            Endian::Little if nbits % 8 == 0 => (0..u64::from(nbits / 8)).fold(0u64, |acc, i| {
                acc | (self.bits_msb_first(pos + 8 * i, 8) << (8 * i))
            }),
            _ => self.bits_msb_first(pos, nbits),
        }
    }
}

impl BitBuffer for DefaultBitBuffer {
    fn bit_pos(&self) -> u64 {
        self.pos.load(Ordering::Relaxed)
    }

    fn set_bit_pos(&self, pos: u64) {
        self.pos.store(pos, Ordering::Relaxed);
    }

    fn bit_len(&self) -> u64 {
        self.data.len() as u64 * 8
    }

    fn read_bits(&self, nbits: u32, endian: Endian) -> Result<u64> {
        if nbits > 64 {
            return Err(DecodingError::InvalidSize {
                reason: format!("cannot read {} bits into a 64-bit value", nbits),
            });
        }
        let pos = self.bit_pos();
        self.check(pos, u64::from(nbits))?;
        let value = self.peek(pos, nbits, endian);
        self.set_bit_pos(pos + u64::from(nbits));
        Ok(value)
    }

    fn read_bytes(&self, len: usize) -> Result<Vec<u8>> {
        let pos = self.bit_pos();
        let nbits = byte_bits(len)?;
        self.check(pos, nbits)?;
        let out = if pos % 8 == 0 {
            let start = (pos / 8) as usize;
            self.data[start..start + len].to_vec()
        } else {
            (0..len as u64)
                .map(|i| self.bits_msb_first(pos + 8 * i, 8) as u8)
                .collect()
        };
        self.set_bit_pos(pos + nbits);
        Ok(out)
    }
}

impl fmt::Debug for DefaultBitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultBitBuffer")
            .field("bit_pos", &self.bit_pos())
            .field("bit_len", &self.bit_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(bytes: &[u8]) -> DefaultBitBuffer {
        DefaultBitBuffer::new(bytes.to_vec())
    }

    #[test]
    fn test_aligned_reads_both_endians() {
        let buf = buffer(&[0x12, 0x34, 0x56, 0x78]);
        assert_eq!(buf.read_bits(16, Endian::Big).unwrap(), 0x1234);
        assert_eq!(buf.read_bits(16, Endian::Little).unwrap(), 0x7856);
        assert_eq!(buf.bit_pos(), 32);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_unaligned_reads_msb_first() {
        // 1010_1100 0101_0011
        let buf = buffer(&[0xAC, 0x53]);
        assert_eq!(buf.read_bits(3, Endian::Big).unwrap(), 0b101);
        assert_eq!(buf.read_bits(7, Endian::Big).unwrap(), 0b0_1100_01);
        assert!(!buf.read_bool().unwrap());
        assert_eq!(buf.read_bits(5, Endian::Big).unwrap(), 0b1_0011);
        assert_eq!(buf.bit_pos(), 16);
    }

    #[test]
    fn test_unaligned_little_endian_swaps_bytes() {
        let buf = buffer(&[0x0F, 0xF0, 0x0F]);
        buf.set_bit_pos(4);
        // bytes starting at bit 4: 0xFF, 0x00
        assert_eq!(buf.read_bits(16, Endian::Little).unwrap(), 0x00FF);
        assert_eq!(buf.bit_pos(), 20);
    }

    #[test]
    fn test_read_past_end_keeps_cursor() {
        let buf = buffer(&[0xFF]);
        buf.set_bit_pos(4);
        let err = buf.read_bits(8, Endian::Big).unwrap_err();
        assert_eq!(
            err,
            DecodingError::UnexpectedEnd {
                position: 4,
                requested: 8,
                length: 8,
            }
        );
        assert_eq!(buf.bit_pos(), 4);
    }

    #[test]
    fn test_read_more_than_64_bits_rejected() {
        let buf = buffer(&[0u8; 16]);
        assert!(matches!(
            buf.read_bits(65, Endian::Big),
            Err(DecodingError::InvalidSize { .. })
        ));
        assert_eq!(buf.bit_pos(), 0);
    }

    #[test]
    fn test_zero_width_read() {
        let buf = DefaultBitBuffer::new(Vec::<u8>::new());
        assert_eq!(buf.read_bits(0, Endian::Big).unwrap(), 0);
        assert_eq!(buf.bit_pos(), 0);
    }

    #[test]
    fn test_read_bytes_aligned_and_unaligned() {
        let buf = buffer(&[0xAB, 0xCD, 0xEF]);
        assert_eq!(buf.read_bytes(2).unwrap(), vec![0xAB, 0xCD]);

        buf.set_bit_pos(4);
        assert_eq!(buf.read_bytes(2).unwrap(), vec![0xBC, 0xDE]);
        assert_eq!(buf.bit_pos(), 20);

        assert!(buf.read_bytes(1).is_err());
        assert_eq!(buf.bit_pos(), 20);
    }

    #[test]
    fn test_read_bytes_length_overflow_is_an_error() {
        let buf = buffer(&[1, 2, 3]);
        buf.set_bit_pos(8);
        assert!(matches!(
            buf.read_bytes(usize::MAX / 4),
            Err(DecodingError::InvalidSize { .. })
        ));
        assert!(matches!(
            buf.read_bytes(usize::MAX),
            Err(DecodingError::InvalidSize { .. })
        ));
        assert_eq!(buf.bit_pos(), 8);
    }

    #[test]
    fn test_shared_buffer_cursor_is_visible_to_all_holders() {
        let buf = DefaultBitBuffer::shared(vec![0u8; 4]);
        let other = Arc::clone(&buf);
        buf.set_bit_pos(12);
        assert_eq!(other.bit_pos(), 12);
    }

    #[test]
    fn test_default_read_bytes_restores_cursor_on_failure() {
        struct Tiny(DefaultBitBuffer);
        impl BitBuffer for Tiny {
            fn bit_pos(&self) -> u64 {
                self.0.bit_pos()
            }
            fn set_bit_pos(&self, pos: u64) {
                self.0.set_bit_pos(pos)
            }
            fn bit_len(&self) -> u64 {
                self.0.bit_len()
            }
            fn read_bits(&self, nbits: u32, endian: Endian) -> Result<u64> {
                self.0.read_bits(nbits, endian)
            }
        }

        let buf = Tiny(buffer(&[1, 2]));
        assert!(buf.read_bytes(3).is_err());
        assert_eq!(buf.bit_pos(), 0);
        assert!(matches!(
            buf.read_bytes(usize::MAX),
            Err(DecodingError::InvalidSize { .. })
        ));
        assert_eq!(buf.read_bytes(2).unwrap(), vec![1, 2]);
    }
}
