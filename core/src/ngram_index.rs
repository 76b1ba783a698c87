//! C3 — NgramIndex: parse the counter's binary n-gram file (plus the vocab
//! file) into per-order frequency tables, reconstructing substring counts
//! the counter only emits left-anchored within sentence windows.

use crate::error::DiscoveryError;
use crate::vocab::CharVocab;
use ahash::AHashMap;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use std::path::Path;

/// Vocab index marking begin-of-sentence, per the Python reference's
/// `(1, 2)` BOS/EOS pairing (see the open-question resolution in §9(c)
/// of SPEC_FULL.md). Index 0 is an always-reserved, unused pad slot.
pub const BOS_INDEX: u32 = 1;
/// Vocab index marking end-of-sentence.
pub const EOS_INDEX: u32 = 2;

/// Per-order frequency tables `T[0..order)`, plus the reference total `N`.
#[derive(Debug, Default)]
pub struct NgramIndex {
    pub order: usize,
    /// `tables[k]` maps strings of exactly `k+1` characters to their count.
    pub tables: Vec<AHashMap<String, u64>>,
    pub total: u64,
}

/// One raw record decoded from the n-gram file, before back-fill.
#[derive(Debug, Clone)]
struct RawRecord {
    indices: Vec<u32>,
    count: u64,
}

impl NgramIndex {
    fn record_size(order: usize) -> usize {
        order * 4 + 8
    }

    /// Parse the counter's n-gram file against an already-loaded vocab,
    /// applying the min_count truncation and back-fill reconstruction.
    pub fn build(
        ngram_bytes: &[u8],
        vocab: &CharVocab,
        order: usize,
        min_count: u64,
        path: &Path,
    ) -> Result<Self, DiscoveryError> {
        let record_size = Self::record_size(order);
        // Trailing short reads are silently discarded (file length need not
        // be an exact multiple if the counter was interrupted mid-flush).
        let usable_len = (ngram_bytes.len() / record_size) * record_size;

        let mut index = NgramIndex {
            order,
            tables: (0..order).map(|_| AHashMap::default()).collect(),
            total: 0,
        };

        let mut offset = 0usize;
        while offset < usable_len {
            let chunk = &ngram_bytes[offset..offset + record_size];
            let record = Self::decode_record(chunk, order, offset as u64, path)?;
            if record.count >= min_count {
                index.ingest(&record, vocab, path)?;
            }
            offset += record_size;
        }

        Ok(index)
    }

    pub fn load<P: AsRef<Path>>(
        ngram_path: P,
        vocab: &CharVocab,
        order: usize,
        min_count: u64,
    ) -> Result<Self, DiscoveryError> {
        let ngram_path = ngram_path.as_ref();
        let bytes = std::fs::read(ngram_path).map_err(|e| DiscoveryError::io(ngram_path, e))?;
        Self::build(&bytes, vocab, order, min_count, ngram_path)
    }

    fn decode_record(
        chunk: &[u8],
        order: usize,
        offset: u64,
        path: &Path,
    ) -> Result<RawRecord, DiscoveryError> {
        let mut cursor = Cursor::new(chunk);
        let mut indices = Vec::with_capacity(order);
        for _ in 0..order {
            let idx = cursor
                .read_u32::<LittleEndian>()
                .map_err(|e| DiscoveryError::format(path, offset, e.to_string()))?;
            indices.push(idx);
        }
        let count = cursor
            .read_u64::<LittleEndian>()
            .map_err(|e| DiscoveryError::format(path, offset, e.to_string()))?;
        Ok(RawRecord { indices, count })
    }

    /// Apply one record's count into the order tables, after back-fill.
    ///
    /// The spec's bos/eos/interior branches (§4.3) are each special cases
    /// of one underlying invariant: `T[k][s]` must equal the number of
    /// times `s` occurred as a contiguous substring of this record. For a
    /// single record in isolation that is exactly "every contiguous
    /// substring of every length". A bos-only window only ever supplies
    /// its left-anchored prefixes (§4.3): any other substring it contains
    /// is also the left-anchored prefix of some *other* window starting
    /// later in the same sentence, so adding it here would double-count
    /// it once that other window is processed. An eos (or interior)
    /// window has no such guaranteed later window to rely on for its
    /// right-anchored substrings, so it contributes every substring
    /// directly; this is the dimensionally-corrected reading of §4.3's
    /// eos back-fill (the substring's own length picks its table, not
    /// `j - k`) generalized to also cover interior windows, since an
    /// interior record and an eos record need the identical treatment
    /// once the formula is corrected — see DESIGN.md.
    fn ingest(
        &mut self,
        record: &RawRecord,
        vocab: &CharVocab,
        path: &Path,
    ) -> Result<(), DiscoveryError> {
        let kc = self.real_chars(record, vocab, path)?;
        let kl = kc.len();
        if kl == 0 {
            return Ok(());
        }
        self.total += record.count;

        // Pre-join into a Vec<char> once; substrings are sliced by char index.
        let chars: Vec<char> = kc.join("").chars().collect();
        debug_assert_eq!(chars.len(), kl, "each real token must be exactly one char");

        let bos = Self::is_bos(&record.indices);
        let eos = Self::is_eos(&record.indices);

        if bos && !eos {
            for len in 1..=kl {
                let s: String = chars[..len].iter().collect();
                *self.tables[len - 1].entry(s).or_insert(0) += record.count;
            }
        } else {
            for len in 1..=kl {
                for start in 0..=(kl - len) {
                    let s: String = chars[start..start + len].iter().collect();
                    *self.tables[len - 1].entry(s).or_insert(0) += record.count;
                }
            }
        }
        Ok(())
    }

    /// Collect the real (non-reserved) characters of a record, in order.
    fn real_chars(
        &self,
        record: &RawRecord,
        vocab: &CharVocab,
        path: &Path,
    ) -> Result<Vec<String>, DiscoveryError> {
        let mut out = Vec::with_capacity(record.indices.len());
        for &idx in &record.indices {
            if CharVocab::is_reserved(idx) {
                continue;
            }
            out.push(vocab.get(idx, path)?.to_string());
        }
        Ok(out)
    }

    /// True if any index in the record is the BOS sentinel.
    fn is_bos(indices: &[u32]) -> bool {
        indices.iter().any(|&i| i == BOS_INDEX)
    }

    /// True if any index in the record is the EOS sentinel.
    fn is_eos(indices: &[u32]) -> bool {
        indices.iter().any(|&i| i == EOS_INDEX)
    }

    /// Table index `k` (strings of length `k+1`), or `None` if out of range.
    pub fn get(&self, s: &str) -> Option<u64> {
        let len = s.chars().count();
        if len == 0 || len > self.order {
            return None;
        }
        self.tables[len - 1].get(s).copied()
    }

    /// Serialize the exact top-order table (`T[order-1]`) back into packed
    /// `count_ngrams`-format records, for round-trip testing (§8 property 5).
    pub fn pack_top_order(&self, vocab: &CharVocab) -> anyhow::Result<Vec<u8>> {
        use byteorder::WriteBytesExt;
        use std::collections::HashMap;

        let mut reverse: HashMap<&str, u32> = HashMap::new();
        for i in 0..vocab.len() as u32 {
            let s = vocab.get(i, Path::new("<vocab>"))?;
            reverse.entry(s).or_insert(i);
        }

        let mut out = Vec::new();
        for (s, &count) in self.tables[self.order - 1].iter() {
            for ch in s.chars() {
                let ch_str = ch.to_string();
                let idx = *reverse
                    .get(ch_str.as_str())
                    .ok_or_else(|| anyhow::anyhow!("character {:?} not found in vocab", ch))?;
                out.write_u32::<LittleEndian>(idx)?;
            }
            out.write_u64::<LittleEndian>(count)?;
        }
        Ok(out)
    }

    /// Checkpoint the parsed index to a bincode file for re-use across runs.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let snapshot: CheckpointSnapshot = self.into();
        let file = std::fs::File::create(path).map_err(|e| DiscoveryError::io(path, e))?;
        bincode::serialize_into(std::io::BufWriter::new(file), &snapshot)?;
        Ok(())
    }

    pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| DiscoveryError::io(path, e))?;
        let snapshot: CheckpointSnapshot = bincode::deserialize_from(std::io::BufReader::new(file))?;
        Ok(snapshot.into())
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct CheckpointSnapshot {
    order: usize,
    tables: Vec<Vec<(String, u64)>>,
    total: u64,
}

impl From<&NgramIndex> for CheckpointSnapshot {
    fn from(idx: &NgramIndex) -> Self {
        CheckpointSnapshot {
            order: idx.order,
            tables: idx
                .tables
                .iter()
                .map(|t| t.iter().map(|(k, &v)| (k.clone(), v)).collect())
                .collect(),
            total: idx.total,
        }
    }
}

impl From<CheckpointSnapshot> for NgramIndex {
    fn from(snap: CheckpointSnapshot) -> Self {
        NgramIndex {
            order: snap.order,
            tables: snap
                .tables
                .into_iter()
                .map(|entries| entries.into_iter().collect())
                .collect(),
            total: snap.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn vocab() -> CharVocab {
        let bytes = "\0<s>\0</s>\0甲\0乙\0丙".as_bytes();
        CharVocab::parse(bytes, Path::new("v")).unwrap()
    }

    fn pack_record(indices: &[u32], count: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        for &i in indices {
            buf.write_u32::<LittleEndian>(i).unwrap();
        }
        buf.write_u64::<LittleEndian>(count).unwrap();
        buf
    }

    #[test]
    fn interior_record_produces_all_substrings() {
        let v = vocab();
        let bytes = pack_record(&[3, 4, 5], 10);
        let idx = NgramIndex::build(&bytes, &v, 3, 1, Path::new("n")).unwrap();

        assert_eq!(idx.tables[0]["甲"], 10);
        assert_eq!(idx.tables[0]["乙"], 10);
        assert_eq!(idx.tables[0]["丙"], 10);
        assert_eq!(idx.tables[1]["甲乙"], 10);
        assert_eq!(idx.tables[1]["乙丙"], 10);
        assert_eq!(idx.tables[2]["甲乙丙"], 10);
        assert_eq!(idx.total, 10);
    }

    #[test]
    fn eos_marked_record_still_produces_all_substrings() {
        let v = vocab();
        // (2, 3, 4): index 2 is the EOS sentinel; only 3,4 are real chars.
        let bytes = pack_record(&[2, 3, 4], 10);
        let idx = NgramIndex::build(&bytes, &v, 3, 1, Path::new("n")).unwrap();

        assert_eq!(idx.tables[0]["甲"], 10);
        assert_eq!(idx.tables[0]["乙"], 10);
        assert_eq!(idx.tables[1]["甲乙"], 10);
    }

    #[test]
    fn bos_only_record_back_fills_prefixes_only() {
        let v = vocab();
        // (1, 3, 4): index 1 is the BOS sentinel; only 3,4 are real chars.
        let bytes = pack_record(&[1, 3, 4], 10);
        let idx = NgramIndex::build(&bytes, &v, 3, 1, Path::new("n")).unwrap();

        assert_eq!(idx.tables[0]["甲"], 10);
        assert_eq!(idx.tables[1]["甲乙"], 10);
        // The right-anchored suffix "乙" is not this window's to supply:
        // it is the left-anchored prefix of a later window in the sentence.
        assert!(!idx.tables[0].contains_key("乙"));
    }

    #[test]
    fn min_count_truncation_drops_low_count_records() {
        let v = vocab();
        let bytes = pack_record(&[3, 4, 5], 2);
        let idx = NgramIndex::build(&bytes, &v, 3, 5, Path::new("n")).unwrap();
        assert!(idx.tables[0].is_empty());
        assert_eq!(idx.total, 0);
    }

    #[test]
    fn record_with_only_reserved_indices_is_skipped() {
        let v = vocab();
        let bytes = pack_record(&[0, 1, 2], 10);
        let idx = NgramIndex::build(&bytes, &v, 3, 1, Path::new("n")).unwrap();
        assert_eq!(idx.total, 0);
    }

    #[test]
    fn trailing_short_read_is_discarded() {
        let v = vocab();
        let mut bytes = pack_record(&[3, 4, 5], 10);
        bytes.extend_from_slice(&[0u8; 5]); // short trailing garbage
        let idx = NgramIndex::build(&bytes, &v, 3, 1, Path::new("n")).unwrap();
        assert_eq!(idx.total, 10);
    }

    #[test]
    fn round_trip_pack_top_order() {
        let v = vocab();
        let bytes = pack_record(&[3, 4, 5], 10);
        let idx = NgramIndex::build(&bytes, &v, 3, 1, Path::new("n")).unwrap();
        let repacked = idx.pack_top_order(&v).unwrap();
        assert_eq!(repacked, bytes);
    }

    #[test]
    fn checkpoint_round_trips() {
        let v = vocab();
        let bytes = pack_record(&[3, 4, 5], 10);
        let idx = NgramIndex::build(&bytes, &v, 3, 1, Path::new("n")).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ckpt.bin");
        idx.save_checkpoint(&path).unwrap();
        let loaded = NgramIndex::load_checkpoint(&path).unwrap();
        assert_eq!(loaded.total, idx.total);
        assert_eq!(loaded.tables[2]["甲乙丙"], 10);
    }

    #[test]
    fn bos_eos_detection() {
        assert!(NgramIndex::is_bos(&[1, 3, 4]));
        assert!(!NgramIndex::is_bos(&[3, 4, 5]));
        assert!(NgramIndex::is_eos(&[2, 3, 4]));
        assert!(!NgramIndex::is_eos(&[3, 4, 5]));
    }
}
