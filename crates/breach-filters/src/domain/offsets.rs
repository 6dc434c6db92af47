//! Deterministic multi-offset derivation
//!
//! Derives k bit positions per key by salting one digest per hash index:
//! offset(h) = md5(decimal(h) ++ key_bytes) as little-endian u128, mod size.
//! The digest choice and byte interpretation are frozen; any change breaks
//! compatibility with every filter file already on disk.
//!
//! The wordlist lookup digest (SHA-1, uppercase hex) is independent of the
//! offset digest and is used only to turn plaintext words into keys.

use md5::{Digest, Md5};
use sha1::Sha1;

/// A key together with its derived bit offsets
///
/// Fixed-field value type so the hot path carries no dynamically-shaped
/// records. The key is borrowed from the caller's line buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyOffsets<'a> {
    /// The key the offsets were derived from
    pub key: &'a str,
    /// Ordered bit positions, each in [0, size_bits)
    pub offsets: Vec<u64>,
}

/// Derive `hash_count` bit offsets for `key` in a filter of `size_bits` bits
///
/// `size_bits` must be a power of two. The same (key, size, count) triple
/// yields an identical offset sequence on every invocation and platform.
pub fn derive_offsets(key: &str, size_bits: u64, hash_count: usize) -> KeyOffsets<'_> {
    debug_assert!(size_bits.is_power_of_two(), "filter sizes are powers of two");

    let mut offsets = Vec::with_capacity(hash_count);
    for h in 0..hash_count {
        let mut hasher = Md5::new();
        hasher.update(h.to_string().as_bytes());
        hasher.update(key.as_bytes());
        let digest: [u8; 16] = hasher.finalize().into();
        let value = u128::from_le_bytes(digest);
        offsets.push((value % size_bits as u128) as u64);
    }

    KeyOffsets { key, offsets }
}

/// One-way lookup digest for plaintext wordlist entries
///
/// SHA-1 of the word's bytes, rendered as uppercase hex to match the
/// corpus digest convention. Build and query must both go through this
/// function so case normalization cannot drift between the two.
pub fn lookup_digest(word: &str) -> String {
    let digest = Sha1::digest(word.as_bytes());
    hex::encode_upper(digest)
}
