//! Filter set verifier
//!
//! Read-only batch passes over finalized filter files. Every record is
//! probed against every partition, not only its expected one:
//!
//! - *success*: found in the expected partition
//! - *not-found*: absent from the expected partition. Bloom filters have
//!   no false negatives, so this is a correctness violation and is logged
//!   at error level.
//! - *lost*: found in a partition it was never inserted into. A
//!   rate-bounded false-positive side effect of sharing finite bit space,
//!   reported as a quality metric.
//!
//! A missing or unreadable filter file degrades that partition to
//! "reports no matches" instead of failing the run.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::domain::bit_filter::BitFilter;
use crate::domain::config::IndexConfig;
use crate::domain::offsets::{derive_offsets, lookup_digest};
use crate::domain::record::CorpusRecord;
use crate::error::FilterError;
use crate::service::store;

/// Upper bound on retained mismatch/match samples per report
pub const SAMPLE_LIMIT: usize = 50;

/// A key that was not where verification expected it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    /// The probed key digest
    pub key_digest: String,
    /// Partition the key's frequency routed it to
    pub expected_partition: usize,
    /// `Some(i)`: found in foreign partition i (lost);
    /// `None`: absent from the expected partition (not-found)
    pub found_partition: Option<usize>,
}

/// Outcome of a corpus verification pass
#[derive(Clone, Debug, Default)]
pub struct CorpusReport {
    /// Records successfully parsed and probed
    pub records: u64,
    /// Lines skipped as malformed
    pub malformed: u64,
    /// Keys found in their expected partition
    pub success: u64,
    /// Keys absent from their expected partition (correctness violations)
    pub not_found: u64,
    /// Foreign-partition hits (accepted false positives)
    pub lost: u64,
    /// Membership hits per partition, in scheme order
    pub per_partition_hits: Vec<u64>,
    /// Bounded sample of not-found keys
    pub not_found_samples: Vec<Mismatch>,
    /// Bounded sample of lost keys
    pub lost_samples: Vec<Mismatch>,
}

/// One wordlist entry that matched somewhere
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordMatch {
    /// The plaintext word
    pub word: String,
    /// Partition index it matched in
    pub partition: usize,
    /// That partition's label
    pub label: String,
}

/// Outcome of a wordlist verification pass
#[derive(Clone, Debug, Default)]
pub struct WordlistReport {
    /// Words probed
    pub words: u64,
    /// Words found in at least one partition
    pub found: u64,
    /// Words found nowhere
    pub not_found: u64,
    /// Bounded sample of matches (one entry per matching partition)
    pub matches: Vec<WordMatch>,
    /// Bounded sample of words found nowhere
    pub misses: Vec<String>,
}

/// Queries a finalized, immutable filter set
///
/// Loading never mutates the files, so any number of verifiers can share
/// one corpus version concurrently.
pub struct FilterSetVerifier {
    config: IndexConfig,
    filters: Vec<Option<BitFilter>>,
}

impl FilterSetVerifier {
    /// Load every partition's filter for this configuration from `dir`
    ///
    /// Partitions whose file is missing or unreadable are kept as absent
    /// and report no matches; the rest of the run proceeds.
    pub fn load(config: IndexConfig, dir: &Path) -> Result<Self, FilterError> {
        config.validate()?;

        let mut filters = Vec::with_capacity(config.scheme.len());
        for p in config.scheme.partitions() {
            let name = config.filter_file_name(p);
            match store::load_filter(dir, &name, p.size_exponent) {
                Ok(filter) => {
                    info!(partition = %p.label, file = %name, bits_set = filter.bits_set(), "filter loaded");
                    filters.push(Some(filter));
                }
                Err(e) => {
                    warn!(
                        partition = %p.label,
                        file = %name,
                        error = %e,
                        "could not load filter, partition will report no matches"
                    );
                    filters.push(None);
                }
            }
        }

        Ok(Self { config, filters })
    }

    /// Number of partitions whose filter actually loaded
    pub fn loaded_count(&self) -> usize {
        self.filters.iter().filter(|f| f.is_some()).count()
    }

    /// Membership of one key digest across all partitions, in scheme order
    ///
    /// Offsets are derived per partition because each partition has its
    /// own size. An absent filter reports `false`.
    pub fn probe(&self, key_digest: &str) -> Vec<bool> {
        self.config
            .scheme
            .partitions()
            .iter()
            .zip(&self.filters)
            .map(|(p, filter)| match filter {
                Some(f) => {
                    let ko = derive_offsets(key_digest, p.size_bits(), self.config.hash_count);
                    f.membership(&ko.offsets)
                }
                None => false,
            })
            .collect()
    }

    /// Probe every corpus record against every partition and classify
    pub fn verify_corpus<R: BufRead>(&self, mut reader: R) -> Result<CorpusReport, FilterError> {
        let mut report = CorpusReport {
            per_partition_hits: vec![0; self.config.scheme.len()],
            ..Default::default()
        };

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let record = match CorpusRecord::parse(&line) {
                Ok(r) => r,
                Err(e) => {
                    report.malformed += 1;
                    debug!(error = %e, "skipping malformed corpus line");
                    continue;
                }
            };

            // Same routing as the build, fallback included.
            let expected = self.config.scheme.select_or_fallback(record.frequency);
            let hits = self.probe(record.key_digest);
            report.records += 1;

            for (i, &hit) in hits.iter().enumerate() {
                if hit {
                    report.per_partition_hits[i] += 1;
                }
                if i == expected {
                    if hit {
                        report.success += 1;
                    } else {
                        report.not_found += 1;
                        error!(
                            key = record.key_digest,
                            partition = expected,
                            "key missing from its expected partition (no-false-negative violation)"
                        );
                        if report.not_found_samples.len() < SAMPLE_LIMIT {
                            report.not_found_samples.push(Mismatch {
                                key_digest: record.key_digest.to_string(),
                                expected_partition: expected,
                                found_partition: None,
                            });
                        }
                    }
                } else if hit {
                    report.lost += 1;
                    debug!(
                        key = record.key_digest,
                        expected = expected,
                        found = i,
                        "key matched a foreign partition"
                    );
                    if report.lost_samples.len() < SAMPLE_LIMIT {
                        report.lost_samples.push(Mismatch {
                            key_digest: record.key_digest.to_string(),
                            expected_partition: expected,
                            found_partition: Some(i),
                        });
                    }
                }
            }
        }

        info!(
            records = report.records,
            success = report.success,
            not_found = report.not_found,
            lost = report.lost,
            malformed = report.malformed,
            "corpus verification complete"
        );
        Ok(report)
    }

    /// Hash plaintext words with the wordlist lookup digest and probe all
    /// partitions, reporting which (if any) matched
    ///
    /// Uses the same digest function and case normalization as blacklist
    /// ingestion, so build and query cannot drift. In testing mode, the
    /// pass stops at the configured record limit.
    pub fn verify_wordlist<R: BufRead>(&self, mut reader: R) -> Result<WordlistReport, FilterError> {
        let mut report = WordlistReport::default();

        let mut line = String::new();
        loop {
            if self.config.testing_mode && report.words >= self.config.testing_limit {
                break;
            }
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let word = line.trim();
            if word.is_empty() {
                continue;
            }

            let digest = lookup_digest(word);
            let hits = self.probe(&digest);
            report.words += 1;

            let mut found_somewhere = false;
            for (i, &hit) in hits.iter().enumerate() {
                if !hit {
                    continue;
                }
                found_somewhere = true;
                if report.matches.len() < SAMPLE_LIMIT {
                    report.matches.push(WordMatch {
                        word: word.to_string(),
                        partition: i,
                        label: self.config.scheme.partitions()[i].label.clone(),
                    });
                }
            }

            if found_somewhere {
                report.found += 1;
            } else {
                report.not_found += 1;
                if report.misses.len() < SAMPLE_LIMIT {
                    report.misses.push(word.to_string());
                }
            }
        }

        info!(
            words = report.words,
            found = report.found,
            not_found = report.not_found,
            "wordlist verification complete"
        );
        Ok(report)
    }
}
