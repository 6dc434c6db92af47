//! Partition scheme and frequency-based partition selection
//!
//! A partition is a frequency-bounded shard of the index with an
//! independently sized bit array. Selection is first-match-in-order over
//! the caller-supplied scheme; bounds are NOT validated for contiguity or
//! overlap, so "first match wins" is the authoritative behavior.

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// A single frequency-bounded partition
///
/// The bit array for this partition holds `2^size_exponent` bits. The
/// frequency bounds are half-open: a count belongs here iff
/// `min_frequency <= count < max_frequency`. Use `u64::MAX` as
/// `max_frequency` for an open-ended top partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Bit array size exponent (size = 2^exponent bits)
    pub size_exponent: u32,
    /// Inclusive lower frequency bound
    pub min_frequency: u64,
    /// Exclusive upper frequency bound
    pub max_frequency: u64,
    /// Human-readable label, unique within a scheme
    pub label: String,
}

impl Partition {
    /// Bit array size in bits
    pub fn size_bits(&self) -> u64 {
        1u64 << self.size_exponent
    }

    /// Bit array size on disk, in bytes (ceil(size / 8))
    pub fn size_bytes(&self) -> usize {
        ((self.size_bits() + 7) / 8) as usize
    }

    /// Whether a frequency count falls within this partition's bounds
    pub fn contains(&self, frequency: u64) -> bool {
        frequency >= self.min_frequency && frequency < self.max_frequency
    }
}

/// Ordered list of partitions with validated invariants
///
/// Invariants enforced at construction:
/// - at least one partition
/// - every size exponent is in 1..=45 (size is a power of two, > 1 bit)
/// - labels are unique within the scheme
///
/// Frequency bounds are deliberately NOT checked for gaps or overlap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Partition>", into = "Vec<Partition>")]
pub struct PartitionScheme {
    partitions: Vec<Partition>,
}

impl PartitionScheme {
    /// Largest supported size exponent (2^45 bits = 4 TiB of filter)
    pub const MAX_SIZE_EXPONENT: u32 = 45;

    /// Create a scheme, validating the invariants above
    pub fn new(partitions: Vec<Partition>) -> Result<Self, FilterError> {
        if partitions.is_empty() {
            return Err(FilterError::InvalidScheme(
                "scheme must contain at least one partition".to_string(),
            ));
        }

        for p in &partitions {
            if p.size_exponent == 0 || p.size_exponent > Self::MAX_SIZE_EXPONENT {
                return Err(FilterError::InvalidScheme(format!(
                    "partition {:?} has size exponent {}, must be in 1..={}",
                    p.label,
                    p.size_exponent,
                    Self::MAX_SIZE_EXPONENT
                )));
            }
            if p.label.is_empty() {
                return Err(FilterError::InvalidScheme(
                    "partition label must not be empty".to_string(),
                ));
            }
        }

        for (i, p) in partitions.iter().enumerate() {
            if partitions[..i].iter().any(|q| q.label == p.label) {
                return Err(FilterError::InvalidScheme(format!(
                    "duplicate partition label {:?}",
                    p.label
                )));
            }
        }

        Ok(Self { partitions })
    }

    /// The ordered partitions
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Number of partitions
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether the scheme is empty (never true for a constructed scheme)
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Index of the first partition whose bounds contain `frequency`
    ///
    /// Returns `None` when no partition matches, instead of silently
    /// routing to a default. Callers that want the historical behavior use
    /// [`select_or_fallback`](Self::select_or_fallback).
    pub fn select(&self, frequency: u64) -> Option<usize> {
        self.partitions.iter().position(|p| p.contains(frequency))
    }

    /// First-match selection with the documented fallback policy
    ///
    /// An out-of-range frequency routes to partition 0. This mis-routes
    /// such counts on purpose: it is a caller-visible policy choice, and
    /// builds count how often it fires.
    pub fn select_or_fallback(&self, frequency: u64) -> usize {
        self.select(frequency).unwrap_or(0)
    }

    /// Index of the partition carrying `label`, if any
    pub fn index_of_label(&self, label: &str) -> Option<usize> {
        self.partitions.iter().position(|p| p.label == label)
    }
}

impl TryFrom<Vec<Partition>> for PartitionScheme {
    type Error = FilterError;

    fn try_from(partitions: Vec<Partition>) -> Result<Self, Self::Error> {
        Self::new(partitions)
    }
}

impl From<PartitionScheme> for Vec<Partition> {
    fn from(scheme: PartitionScheme) -> Self {
        scheme.partitions
    }
}
