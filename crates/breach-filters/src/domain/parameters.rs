//! False-positive-rate estimation
//!
//! FPR = (1 - e^(-kn/m))^k for n inserted keys, m bits, k hash functions.
//! Reported per partition on the build summary so operators can judge
//! whether a partition's geometry still fits its corpus band.

/// Expected false positive rate for the given filter parameters
pub fn expected_fpr(size_bits: u64, inserted: u64, hash_count: usize) -> f64 {
    if size_bits == 0 {
        return 1.0;
    }
    let exponent = -(hash_count as f64) * (inserted as f64) / (size_bits as f64);
    (1.0 - exponent.exp()).powi(hash_count as i32)
}
