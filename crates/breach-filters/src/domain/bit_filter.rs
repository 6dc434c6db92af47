//! Fixed-size bit filter
//!
//! A `2^exponent`-bit vector with monotonic set semantics: bits are only
//! ever set, never cleared, so an inserted key can never become a false
//! negative. The byte layout is frozen for on-disk portability: bit i
//! lives in byte i/8 at MSB-first sub-byte position i%8 (bit 0 is the
//! most significant bit of byte 0).

use bitvec::prelude::*;

use crate::error::FilterError;

/// Fixed-size bit vector backing one partition's filter
#[derive(Clone, Debug)]
pub struct BitFilter {
    bits: BitVec<u8, Msb0>,
    size_exponent: u32,
}

impl BitFilter {
    /// Allocate a zero-filled filter of `2^size_exponent` bits
    ///
    /// Allocation happens exactly once; filters are never resized.
    pub fn new(size_exponent: u32) -> Self {
        let size = 1usize << size_exponent;
        Self {
            bits: bitvec![u8, Msb0; 0; size],
            size_exponent,
        }
    }

    /// Filter size in bits
    pub fn size_bits(&self) -> u64 {
        self.bits.len() as u64
    }

    /// Size exponent this filter was allocated with
    pub fn size_exponent(&self) -> u32 {
        self.size_exponent
    }

    /// Idempotently set the bit at `offset`
    pub fn set(&mut self, offset: u64) {
        self.bits.set(offset as usize, true);
    }

    /// Read the bit at `offset`
    pub fn test(&self, offset: u64) -> bool {
        self.bits[offset as usize]
    }

    /// k-of-k membership test: true iff every offset is set
    ///
    /// Standard Bloom semantics: no false negatives for inserted keys,
    /// false positives possible.
    pub fn membership(&self, offsets: &[u64]) -> bool {
        offsets.iter().all(|&o| self.test(o))
    }

    /// Number of bits set
    pub fn bits_set(&self) -> u64 {
        self.bits.count_ones() as u64
    }

    /// The packed on-disk representation, ceil(size/8) bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    /// Reconstruct a filter from its packed bytes
    ///
    /// The slice length must be exactly ceil(2^size_exponent / 8); anything
    /// else means the file belongs to a different partition geometry.
    pub fn from_bytes(bytes: &[u8], size_exponent: u32) -> Result<Self, FilterError> {
        let size = 1usize << size_exponent;
        let expected = (size + 7) / 8;
        if bytes.len() != expected {
            return Err(FilterError::FilterSizeMismatch {
                path: Default::default(),
                expected,
                actual: bytes.len(),
            });
        }

        let mut bits = BitVec::<u8, Msb0>::from_slice(bytes);
        bits.truncate(size);
        Ok(Self {
            bits,
            size_exponent,
        })
    }
}
