//! Corpus record parsing
//!
//! One record per line, `<keyDigestHex>:<frequencyDecimal>`. Malformed
//! lines are a typed, recoverable error: streams skip and count them
//! instead of aborting, and that policy is tested explicitly.

use thiserror::Error;

/// A parsed corpus line: key digest plus its frequency count
///
/// The digest borrows from the caller's line buffer so a streaming pass
/// allocates nothing per record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusRecord<'a> {
    /// Hex key digest, as it appeared in the corpus
    pub key_digest: &'a str,
    /// Non-negative frequency count
    pub frequency: u64,
}

/// Why a corpus line failed to parse
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecordParseError {
    #[error("missing ':' separator")]
    MissingSeparator,

    #[error("empty key digest")]
    EmptyDigest,

    #[error("invalid frequency {0:?}")]
    InvalidFrequency(String),
}

impl<'a> CorpusRecord<'a> {
    /// Parse one corpus line; trailing newlines are tolerated
    pub fn parse(line: &'a str) -> Result<Self, RecordParseError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (digest, frequency) = line
            .split_once(':')
            .ok_or(RecordParseError::MissingSeparator)?;

        if digest.is_empty() {
            return Err(RecordParseError::EmptyDigest);
        }

        let frequency = frequency
            .trim()
            .parse::<u64>()
            .map_err(|_| RecordParseError::InvalidFrequency(frequency.trim().to_string()))?;

        Ok(Self {
            key_digest: digest,
            frequency,
        })
    }
}
