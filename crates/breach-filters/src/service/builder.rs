//! Filter set builder
//!
//! One `FilterSetBuilder` is the explicit context for one build run: it
//! owns every partition's bit array and all counters, so independent runs
//! (and tests) share no process-wide state.
//!
//! Per-partition lifecycle: New -> Populating -> Finalized. Bits are only
//! ever set during population, and `finalize` consumes the builder, so a
//! finalized filter is immutable by construction. Each record's partition
//! is chosen exclusively by frequency selection, which keeps partition
//! state mutually exclusive and the build shardable per partition.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::bit_filter::BitFilter;
use crate::domain::config::IndexConfig;
use crate::domain::offsets::{derive_offsets, lookup_digest};
use crate::domain::parameters::expected_fpr;
use crate::domain::record::CorpusRecord;
use crate::error::FilterError;
use crate::service::store;

/// Lifecycle state of one partition's filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterState {
    /// Allocated, nothing inserted yet
    New,
    /// At least one key inserted
    Populating,
    /// Persisted; no further mutation
    Finalized,
}

struct PartitionFilter {
    filter: BitFilter,
    state: FilterState,
    inserted: u64,
}

/// Counters accumulated during a build run
#[derive(Clone, Debug, Default)]
pub struct BuildStats {
    /// Corpus records successfully parsed and inserted
    pub records: u64,
    /// Lines skipped as malformed (missing separator, bad frequency)
    pub malformed: u64,
    /// Records whose frequency matched no partition and fell back to 0
    pub out_of_range: u64,
    /// Blacklist words inserted
    pub blacklist_words: u64,
    /// True when blacklist ingestion was skipped for lack of a labeled partition
    pub blacklist_skipped: bool,
    /// Inserted-key count per partition, in scheme order
    pub per_partition: Vec<u64>,
}

/// Per-partition report emitted by `finalize`
#[derive(Clone, Debug)]
pub struct FilterReport {
    /// Partition label
    pub label: String,
    /// Canonical path the filter was published at
    pub path: PathBuf,
    /// Filter size in bits
    pub size_bits: u64,
    /// Bits set after population
    pub bits_set: u64,
    /// Keys inserted into this partition
    pub inserted: u64,
    /// Expected false positive rate, (1 - e^(-kn/m))^k
    pub expected_fpr: f64,
}

/// Result of a completed build run
#[derive(Clone, Debug)]
pub struct BuildSummary {
    /// Ingestion counters
    pub stats: BuildStats,
    /// One report per partition, in scheme order
    pub filters: Vec<FilterReport>,
}

/// Streams corpus records into per-partition bit filters
pub struct FilterSetBuilder {
    config: IndexConfig,
    filters: Vec<PartitionFilter>,
    stats: BuildStats,
}

impl FilterSetBuilder {
    /// Validate the configuration and allocate every partition's filter
    ///
    /// Bit arrays are allocated zero-filled at their full fixed size here;
    /// they are never resized afterward.
    pub fn new(config: IndexConfig) -> Result<Self, FilterError> {
        config.validate()?;

        let filters: Vec<PartitionFilter> = config
            .scheme
            .partitions()
            .iter()
            .map(|p| {
                info!(
                    partition = %p.label,
                    size_bits = p.size_bits(),
                    size_bytes = p.size_bytes(),
                    "allocating filter"
                );
                PartitionFilter {
                    filter: BitFilter::new(p.size_exponent),
                    state: FilterState::New,
                    inserted: 0,
                }
            })
            .collect();

        let stats = BuildStats {
            per_partition: vec![0; filters.len()],
            ..Default::default()
        };

        Ok(Self {
            config,
            filters,
            stats,
        })
    }

    /// The configuration this builder was created with
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Lifecycle state per partition, in scheme order
    pub fn states(&self) -> Vec<FilterState> {
        self.filters.iter().map(|f| f.state).collect()
    }

    /// Stream a corpus file into the filters
    ///
    /// A missing file is fatal; prefer [`build_index`] which checks the
    /// path before any bit array is allocated.
    pub fn ingest_corpus_file(&mut self, path: &Path) -> Result<(), FilterError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                FilterError::CorpusNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FilterError::Io(e)
            }
        })?;
        self.ingest_corpus(BufReader::new(file))
    }

    /// Stream `<hexDigest>:<frequency>` lines into the filters
    ///
    /// Malformed lines are counted and skipped rather than aborting the
    /// stream. In testing mode, ingestion stops at the configured record
    /// limit.
    pub fn ingest_corpus<R: BufRead>(&mut self, mut reader: R) -> Result<(), FilterError> {
        let mut line = String::new();
        loop {
            if self.config.testing_mode && self.stats.records >= self.config.testing_limit {
                info!(
                    limit = self.config.testing_limit,
                    "testing-mode record limit reached, stopping ingestion"
                );
                break;
            }

            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            match CorpusRecord::parse(&line) {
                Ok(record) => {
                    let partition = match self.config.scheme.select(record.frequency) {
                        Some(i) => i,
                        None => {
                            // Documented policy: out-of-range counts route
                            // to partition 0, and we keep score.
                            self.stats.out_of_range += 1;
                            0
                        }
                    };
                    self.insert_digest(record.key_digest, partition);
                    self.stats.records += 1;
                }
                Err(e) => {
                    self.stats.malformed += 1;
                    debug!(error = %e, "skipping malformed corpus line");
                }
            }
        }

        info!(
            records = self.stats.records,
            malformed = self.stats.malformed,
            out_of_range = self.stats.out_of_range,
            per_partition = ?self.stats.per_partition,
            "corpus ingestion complete"
        );
        Ok(())
    }

    /// Stream a plaintext wordlist into the blacklist partition
    ///
    /// Words bypass frequency routing: each is hashed with the wordlist
    /// lookup digest and inserted into the partition carrying the
    /// configured blacklist label. A missing label is a recoverable
    /// configuration error: ingestion is skipped and reported, and the
    /// rest of the build continues.
    pub fn ingest_blacklist<R: BufRead>(&mut self, mut words: R) -> Result<(), FilterError> {
        let Some(partition) = self.config.scheme.index_of_label(&self.config.blacklist_label)
        else {
            warn!(
                label = %self.config.blacklist_label,
                "no partition carries the blacklist label, skipping blacklist ingestion"
            );
            self.stats.blacklist_skipped = true;
            return Ok(());
        };

        let mut line = String::new();
        loop {
            line.clear();
            if words.read_line(&mut line)? == 0 {
                break;
            }
            let word = line.trim();
            if word.is_empty() {
                continue;
            }

            let digest = lookup_digest(word);
            self.insert_digest(&digest, partition);
            self.stats.blacklist_words += 1;
        }

        info!(
            words = self.stats.blacklist_words,
            partition = %self.config.blacklist_label,
            "blacklist ingestion complete"
        );
        Ok(())
    }

    /// Stream a plaintext wordlist file into the blacklist partition
    pub fn ingest_blacklist_file(&mut self, path: &Path) -> Result<(), FilterError> {
        let file = File::open(path)?;
        self.ingest_blacklist(BufReader::new(file))
    }

    /// Persist every filter and consume the builder
    ///
    /// All filters are staged to temp names first and renamed onto their
    /// canonical names only once every stage succeeded, so an interrupted
    /// build cannot publish a partial set.
    pub fn finalize(mut self, out_dir: &Path) -> Result<BuildSummary, FilterError> {
        let mut staged = Vec::with_capacity(self.filters.len());
        for (i, slot) in self.filters.iter().enumerate() {
            let partition = &self.config.scheme.partitions()[i];
            let name = self.config.filter_file_name(partition);
            staged.push(store::stage_filter(out_dir, &name, &slot.filter)?);
        }

        let mut reports = Vec::with_capacity(staged.len());
        for (i, stage) in staged.into_iter().enumerate() {
            let path = stage.publish()?;
            let slot = &mut self.filters[i];
            slot.state = FilterState::Finalized;

            let partition = &self.config.scheme.partitions()[i];
            let report = FilterReport {
                label: partition.label.clone(),
                path,
                size_bits: slot.filter.size_bits(),
                bits_set: slot.filter.bits_set(),
                inserted: slot.inserted,
                expected_fpr: expected_fpr(
                    slot.filter.size_bits(),
                    slot.inserted,
                    self.config.hash_count,
                ),
            };
            info!(
                partition = %report.label,
                path = %report.path.display(),
                inserted = report.inserted,
                bits_set = report.bits_set,
                expected_fpr = report.expected_fpr,
                "filter finalized"
            );
            reports.push(report);
        }

        Ok(BuildSummary {
            stats: self.stats,
            filters: reports,
        })
    }

    fn insert_digest(&mut self, key: &str, partition_idx: usize) {
        let size_bits = self.config.scheme.partitions()[partition_idx].size_bits();
        let ko = derive_offsets(key, size_bits, self.config.hash_count);

        let slot = &mut self.filters[partition_idx];
        slot.state = FilterState::Populating;
        for &offset in &ko.offsets {
            slot.filter.set(offset);
        }
        slot.inserted += 1;
        self.stats.per_partition[partition_idx] += 1;

        if self.config.testing_mode {
            self.self_check(key, partition_idx, &ko.offsets);
        }
    }

    /// Re-test just-set offsets; a miss is an internal defect, not an error
    ///
    /// Set-then-test cannot fail under correct bit semantics, so this
    /// aborts with full context instead of returning a recoverable error.
    /// Only active in testing mode.
    fn self_check(&self, key: &str, partition_idx: usize, offsets: &[u64]) {
        let slot = &self.filters[partition_idx];
        assert!(
            slot.filter.membership(offsets),
            "bit-set invariant violated: key {key:?} not present after insert \
             into partition {partition_idx} at offsets {offsets:?}"
        );
    }
}

/// Run a complete build: corpus, optional blacklist, finalize
///
/// The corpus path is checked before any filter is allocated, so a missing
/// source fails fast without committing gigabytes of memory. A configured
/// blacklist path that does not exist is a recoverable configuration
/// error: it is logged and skipped.
pub fn build_index(
    config: IndexConfig,
    corpus_path: &Path,
    out_dir: &Path,
) -> Result<BuildSummary, FilterError> {
    if !corpus_path.exists() {
        return Err(FilterError::CorpusNotFound {
            path: corpus_path.to_path_buf(),
        });
    }

    let blacklist_path = config.blacklist_path.clone();
    let mut builder = FilterSetBuilder::new(config)?;
    builder.ingest_corpus_file(corpus_path)?;

    if let Some(path) = blacklist_path {
        if path.exists() {
            builder.ingest_blacklist_file(&path)?;
        } else {
            warn!(path = %path.display(), "blacklist source missing, skipping");
        }
    }

    builder.finalize(out_dir)
}
