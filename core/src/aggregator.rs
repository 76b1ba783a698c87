//! C6 — CandidateAggregator: a second pass over the normalized corpus that
//! tokenizes each newline-delimited sentence with the trie and tallies
//! candidate word counts.

use crate::error::DiscoveryError;
use crate::trie::Trie;
use ahash::AHashMap;
use std::io::BufRead;
use std::path::Path;

/// Tokenize the corpus and count surviving candidates (>= `min_count`).
///
/// Each line of the corpus is one barrier-free run; space-joined tokens
/// within a line are concatenated back into a single character stream
/// before tokenizing, since the space itself is a crossable boundary
/// (only the newline is a hard one — see CorpusNormalizer).
pub fn aggregate_candidates(
    corpus_path: &Path,
    trie: &Trie,
    min_count: u64,
    progress_period: usize,
) -> Result<AHashMap<String, u64>, DiscoveryError> {
    let file = std::fs::File::open(corpus_path).map_err(|e| DiscoveryError::io(corpus_path, e))?;
    let reader = std::io::BufReader::new(file);

    let mut counts: AHashMap<String, u64> = AHashMap::default();
    let mut lines_done = 0usize;
    for line in reader.lines() {
        let line = line.map_err(|e| DiscoveryError::io(corpus_path, e))?;
        let joined: String = line.split(' ').collect();
        if !joined.is_empty() {
            let chars: Vec<char> = joined.chars().collect();
            for token in trie.tokenize(&chars) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        lines_done += 1;
        if progress_period > 0 && lines_done % progress_period == 0 {
            tracing::info!(lines = lines_done, "aggregating candidates");
        }
    }

    counts.retain(|_, &mut count| count >= min_count);
    Ok(counts)
}
