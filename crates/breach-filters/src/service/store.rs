//! Filter file persistence
//!
//! Filters are published in two phases: bytes go to a `.tmp` sibling and
//! are synced first, then renamed onto the canonical name. `finalize`
//! stages every partition before publishing any of them, so a crashed
//! build never leaves a partial filter set at canonical names.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::bit_filter::BitFilter;
use crate::error::FilterError;

/// A fully written temp file awaiting its atomic rename
#[derive(Debug)]
pub struct StagedFilter {
    tmp_path: PathBuf,
    final_path: PathBuf,
}

impl StagedFilter {
    /// Rename the staged bytes onto the canonical file name
    pub fn publish(self) -> Result<PathBuf, FilterError> {
        fs::rename(&self.tmp_path, &self.final_path)?;
        debug!(path = %self.final_path.display(), "filter published");
        Ok(self.final_path)
    }
}

/// Write a filter's bytes to `dir/file_name.tmp` and sync them
pub fn stage_filter(
    dir: &Path,
    file_name: &str,
    filter: &BitFilter,
) -> Result<StagedFilter, FilterError> {
    let final_path = dir.join(file_name);
    let tmp_path = dir.join(format!("{file_name}.tmp"));

    let mut file = File::create(&tmp_path)?;
    file.write_all(filter.as_bytes())?;
    file.sync_all()?;

    Ok(StagedFilter {
        tmp_path,
        final_path,
    })
}

/// Stage and immediately publish a single filter
pub fn persist_filter(
    dir: &Path,
    file_name: &str,
    filter: &BitFilter,
) -> Result<PathBuf, FilterError> {
    stage_filter(dir, file_name, filter)?.publish()
}

/// Load a filter from `dir/file_name`, verifying its exact byte length
pub fn load_filter(
    dir: &Path,
    file_name: &str,
    size_exponent: u32,
) -> Result<BitFilter, FilterError> {
    let path = dir.join(file_name);
    let bytes = fs::read(&path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            FilterError::FilterFileNotFound { path: path.clone() }
        } else {
            FilterError::Io(e)
        }
    })?;

    BitFilter::from_bytes(&bytes, size_exponent).map_err(|e| match e {
        FilterError::FilterSizeMismatch {
            expected, actual, ..
        } => FilterError::FilterSizeMismatch {
            path,
            expected,
            actual,
        },
        other => other,
    })
}
