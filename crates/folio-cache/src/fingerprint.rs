//! Source file fingerprints.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a source file's size and modification time.
///
/// Serialized as `{"size": 123, "date": "2024-05-01T10:00:00.123456789Z"}`.
/// Comparison is exact: two fingerprints match only if both the byte size and
/// the modification time (down to the nanosecond) are identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub date: DateTime<Utc>,
}

impl Fingerprint {
    /// Capture the fingerprint of the file at `path`.
    pub fn of(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            size: meta.len(),
            date: DateTime::<Utc>::from(meta.modified()?),
        })
    }
}
