//! Service layer - build and verify orchestration
//!
//! The two offline batch operations over local files: `builder` streams a
//! corpus into per-partition filters and publishes them atomically;
//! `verifier` loads published filters read-only and classifies query
//! outcomes. `store` owns the on-disk lifecycle shared by both.

pub mod builder;
pub mod store;
pub mod verifier;

pub use builder::{build_index, BuildStats, BuildSummary, FilterReport, FilterSetBuilder, FilterState};
pub use store::{load_filter, persist_filter};
pub use verifier::{
    CorpusReport, FilterSetVerifier, Mismatch, WordMatch, WordlistReport, SAMPLE_LIMIT,
};
