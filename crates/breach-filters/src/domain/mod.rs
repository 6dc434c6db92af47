//! Domain layer - pure filter engine logic
//!
//! This layer contains:
//! - Partition scheme and frequency-based selection
//! - Deterministic multi-offset derivation
//! - The fixed-size bit filter and its on-disk byte layout
//! - Corpus record parsing
//! - Run configuration and filter file naming
//! - False-positive-rate estimation
//!
//! RULES:
//! - No I/O operations
//! - Pure functions where possible

pub mod bit_filter;
pub mod config;
pub mod offsets;
pub mod parameters;
pub mod partition;
pub mod record;

pub use bit_filter::BitFilter;
pub use config::{IndexConfig, IndexConfigBuilder, DEFAULT_BLACKLIST_LABEL};
pub use offsets::{derive_offsets, lookup_digest, KeyOffsets};
pub use parameters::expected_fpr;
pub use partition::{Partition, PartitionScheme};
pub use record::{CorpusRecord, RecordParseError};
