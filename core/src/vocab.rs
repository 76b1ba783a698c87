//! Character vocabulary (V): the counter's NUL-separated string table.

use crate::error::DiscoveryError;
use std::path::Path;

/// Indices 0, 1, 2 are reserved sentinels (BOS, EOS, and a spare/unknown
/// slot); per the spec's own resolution of the sentinel ambiguity, all
/// three are uniformly treated as "skip" when collecting real characters.
pub const RESERVED_INDEX_COUNT: u32 = 3;

#[derive(Debug, Clone, Default)]
pub struct CharVocab {
    strings: Vec<String>,
}

impl CharVocab {
    /// Parse a vocab file: a single byte buffer of NUL-separated UTF-8 strings.
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Self, DiscoveryError> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            DiscoveryError::format(path, e.valid_up_to() as u64, "vocab file is not valid UTF-8")
        })?;
        // Splitting on NUL preserves a trailing empty entry if the buffer
        // ends with NUL, which keeps index alignment with the n-gram file.
        let strings: Vec<String> = text.split('\0').map(|s| s.to_string()).collect();
        Ok(Self { strings })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DiscoveryError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| DiscoveryError::io(path, e))?;
        Self::parse(&bytes, path)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Look up the string at `index`, or an error identifying the out-of-bounds index.
    pub fn get(&self, index: u32, path: &Path) -> Result<&str, DiscoveryError> {
        self.strings
            .get(index as usize)
            .map(|s| s.as_str())
            .ok_or_else(|| {
                DiscoveryError::format(
                    path,
                    index as u64,
                    format!("vocab index {} out of bounds (table has {} entries)", index, self.strings.len()),
                )
            })
    }

    /// True if `index` is one of the reserved sentinel slots (0, 1, 2).
    pub fn is_reserved(index: u32) -> bool {
        index < RESERVED_INDEX_COUNT
    }
}
