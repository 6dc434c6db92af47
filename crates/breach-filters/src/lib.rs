//! # breach-filters
//!
//! Partitioned Bloom-filter membership index over digest+frequency
//! corpora (e.g. a breach-password corpus). Downstream software can
//! cheaply test "is this value known" without ever storing the raw
//! corpus.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure engine logic, no I/O
//!   - `PartitionScheme`: frequency-banded shards with first-match selection
//!   - `derive_offsets`: k salted-digest bit positions per key
//!   - `BitFilter`: fixed-size bit vector with a frozen on-disk layout
//!   - `CorpusRecord`: `<hexDigest>:<frequency>` line parsing
//!   - `IndexConfig`: validated per-run configuration and file naming
//!
//! - **Service Layer** (`service/`): orchestration and file I/O
//!   - `FilterSetBuilder`: streams a corpus into per-partition filters,
//!     ingests a plaintext blacklist, publishes atomically
//!   - `FilterSetVerifier`: read-only classification passes over a
//!     finalized filter set
//!
//! ## Invariants
//!
//! - No false negatives: every key inserted into a partition is found
//!   when that partition is queried for it.
//! - Offset derivation is frozen: md5(decimal(h) ++ key) as little-endian
//!   u128 mod size. Filter files are byte-portable across processes,
//!   platforms and reimplementations.
//! - Finalized filters are immutable; bits are only ever set, never
//!   cleared, during population.
//!
//! ## Usage Example
//!
//! ```ignore
//! use breach_filters::{
//!     build_index, FilterSetVerifier, IndexConfigBuilder, Partition, PartitionScheme,
//! };
//!
//! let scheme = PartitionScheme::new(vec![Partition {
//!     size_exponent: 30,
//!     min_frequency: 0,
//!     max_frequency: u64::MAX,
//!     label: "all".to_string(),
//! }])?;
//! let config = IndexConfigBuilder::new()
//!     .scheme(scheme)
//!     .hash_count(3)
//!     .content_id("pwned-passwords-sha1")
//!     .content_date("2026-08")
//!     .build()?;
//!
//! let summary = build_index(config.clone(), corpus_path, out_dir)?;
//! let verifier = FilterSetVerifier::load(config, out_dir)?;
//! let report = verifier.verify_corpus(corpus_reader)?;
//! assert_eq!(report.not_found, 0);
//! ```

pub mod domain;
pub mod error;
pub mod service;

// Re-exports for convenience
pub use domain::{
    derive_offsets, expected_fpr, lookup_digest, BitFilter, CorpusRecord, IndexConfig,
    IndexConfigBuilder, KeyOffsets, Partition, PartitionScheme, RecordParseError,
    DEFAULT_BLACKLIST_LABEL,
};
pub use error::FilterError;
pub use service::{
    build_index, BuildStats, BuildSummary, CorpusReport, FilterReport, FilterSetBuilder,
    FilterSetVerifier, FilterState, Mismatch, WordMatch, WordlistReport,
};
