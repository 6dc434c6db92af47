//! Build/verify run configuration
//!
//! The configuration arrives already parsed from an external collaborator;
//! this module only validates it and derives the deterministic filter file
//! names. One `IndexConfig` is constructed per run and passed explicitly
//! to every operation, so independent runs share no hidden state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::domain::partition::{Partition, PartitionScheme};

/// Default label of the partition that receives blacklist words
pub const DEFAULT_BLACKLIST_LABEL: &str = "blacklist";

/// Configuration for one build or verify run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Ordered partition scheme
    pub scheme: PartitionScheme,
    /// Number of hash functions (k)
    pub hash_count: usize,
    /// Corpus identifier, first filename component
    pub content_id: String,
    /// Corpus date, second filename component
    pub content_date: String,
    /// Testing mode: caps ingestion and enables the insert self-check
    #[serde(default)]
    pub testing_mode: bool,
    /// Record limit applied when testing mode is on
    #[serde(default)]
    pub testing_limit: u64,
    /// Label of the partition that receives blacklist words
    #[serde(default = "default_blacklist_label")]
    pub blacklist_label: String,
    /// Optional plaintext blacklist source
    #[serde(default)]
    pub blacklist_path: Option<PathBuf>,
}

fn default_blacklist_label() -> String {
    DEFAULT_BLACKLIST_LABEL.to_string()
}

impl IndexConfig {
    /// Largest supported hash count
    pub const MAX_HASH_COUNT: usize = 32;

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.hash_count == 0 || self.hash_count > Self::MAX_HASH_COUNT {
            return Err(FilterError::InvalidConfig(format!(
                "hash count {} must be in 1..={}",
                self.hash_count,
                Self::MAX_HASH_COUNT
            )));
        }

        for (name, value) in [
            ("content_id", &self.content_id),
            ("content_date", &self.content_date),
        ] {
            if value.is_empty() {
                return Err(FilterError::InvalidConfig(format!(
                    "{name} must not be empty"
                )));
            }
            if value.contains(['/', '\\']) {
                return Err(FilterError::InvalidConfig(format!(
                    "{name} {value:?} must not contain path separators"
                )));
            }
        }

        if self.testing_mode && self.testing_limit == 0 {
            return Err(FilterError::InvalidConfig(
                "testing mode requires a non-zero record limit".to_string(),
            ));
        }

        Ok(())
    }

    /// Deterministic filter file name for one partition
    ///
    /// `<contentId>_<contentDate>_<sizeExponent>bits_<label>.filter`,
    /// fully determined by configuration plus partition identity.
    pub fn filter_file_name(&self, partition: &Partition) -> String {
        format!(
            "{}_{}_{}bits_{}.filter",
            self.content_id, self.content_date, partition.size_exponent, partition.label
        )
    }
}

/// Fluent builder for [`IndexConfig`]
#[derive(Default)]
pub struct IndexConfigBuilder {
    scheme: Option<PartitionScheme>,
    hash_count: Option<usize>,
    content_id: Option<String>,
    content_date: Option<String>,
    testing_mode: bool,
    testing_limit: u64,
    blacklist_label: Option<String>,
    blacklist_path: Option<PathBuf>,
}

impl IndexConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the partition scheme (required)
    pub fn scheme(mut self, scheme: PartitionScheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// Set the hash count k (default 3)
    pub fn hash_count(mut self, k: usize) -> Self {
        self.hash_count = Some(k);
        self
    }

    /// Set the corpus identifier (required)
    pub fn content_id(mut self, id: impl Into<String>) -> Self {
        self.content_id = Some(id.into());
        self
    }

    /// Set the corpus date (required)
    pub fn content_date(mut self, date: impl Into<String>) -> Self {
        self.content_date = Some(date.into());
        self
    }

    /// Enable testing mode with a record limit
    pub fn testing_mode(mut self, limit: u64) -> Self {
        self.testing_mode = true;
        self.testing_limit = limit;
        self
    }

    /// Override the blacklist partition label (default "blacklist")
    pub fn blacklist_label(mut self, label: impl Into<String>) -> Self {
        self.blacklist_label = Some(label.into());
        self
    }

    /// Set the plaintext blacklist source path
    pub fn blacklist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.blacklist_path = Some(path.into());
        self
    }

    /// Build the configuration, validating all parameters
    pub fn build(self) -> Result<IndexConfig, FilterError> {
        let scheme = self.scheme.ok_or_else(|| {
            FilterError::InvalidConfig("partition scheme is required".to_string())
        })?;
        let content_id = self
            .content_id
            .ok_or_else(|| FilterError::InvalidConfig("content_id is required".to_string()))?;
        let content_date = self
            .content_date
            .ok_or_else(|| FilterError::InvalidConfig("content_date is required".to_string()))?;

        let config = IndexConfig {
            scheme,
            hash_count: self.hash_count.unwrap_or(3),
            content_id,
            content_date,
            testing_mode: self.testing_mode,
            testing_limit: self.testing_limit,
            blacklist_label: self
                .blacklist_label
                .unwrap_or_else(default_blacklist_label),
            blacklist_path: self.blacklist_path,
        };
        config.validate()?;
        Ok(config)
    }
}
