//! C4 — PmiFilter: keep only substrings whose minimum splitting PMI clears
//! the per-length threshold.

use crate::config::Config;
use crate::ngram_index::NgramIndex;
use std::collections::HashSet;

/// Minimum splitting pointwise mutual information of `word`, over every way
/// of splitting it into two non-empty halves.
///
/// `log(N * T[k][w] / (T[j][w[..=j]] * T[k-1-j][w[j+1..]]))`, minimized over
/// split points `j`, where `k = word.len() - 1` and the two terms on the
/// right are indexed by their own length minus one (the "newer",
/// dimensionally-correct form: each half is looked up in the table sized
/// for its own length, not the whole word's length).
///
/// A split piece missing from the index defaults its count to `N`, matching
/// `original_source/word_discovery.py`'s `ngrams[j].get(w[:j+1], total)`.
///
/// Returns `None` if `word` itself is missing from the index (the word
/// cannot be judged, and is treated as not passing).
pub fn min_splitting_pmi(word: &str, index: &NgramIndex) -> Option<f64> {
    let chars: Vec<char> = word.chars().collect();
    let k = chars.len() - 1;
    let whole: u64 = index.get(word)?;
    if whole == 0 {
        return None;
    }
    let n = index.total as f64;

    let mut min_pmi = f64::INFINITY;
    for j in 0..k {
        let left: String = chars[..=j].iter().collect();
        let right: String = chars[j + 1..].iter().collect();
        let left_count = index.get(&left).unwrap_or(index.total);
        let right_count = index.get(&right).unwrap_or(index.total);
        let pmi = (n * whole as f64 / (left_count as f64 * right_count as f64)).ln();
        if pmi < min_pmi {
            min_pmi = pmi;
        }
    }
    Some(min_pmi)
}

/// Run the PMI filter over every candidate substring present in the index's
/// order tables, producing the retained set `R`.
///
/// `R` never contains single characters — there is no split to score a
/// length-1 string on, so the unigram table is skipped entirely rather than
/// passed through `min_splitting_pmi` (whose split loop would otherwise be
/// empty and trivially report infinite PMI).
pub fn filter_ngrams(index: &NgramIndex, config: &Config) -> HashSet<String> {
    let mut retained = HashSet::new();
    for (order_idx, table) in index.tables.iter().enumerate().skip(1) {
        let len = order_idx + 1;
        let threshold = config.min_pmi_for_len(len);
        for word in table.keys() {
            if let Some(pmi) = min_splitting_pmi(word, index) {
                if pmi >= threshold {
                    retained.insert(word.clone());
                }
            }
        }
    }
    retained
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;

    fn index_from(tables: Vec<Vec<(&str, u64)>>, total: u64) -> NgramIndex {
        NgramIndex {
            order: tables.len(),
            tables: tables
                .into_iter()
                .map(|entries| {
                    entries
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v))
                        .collect::<AHashMap<_, _>>()
                })
                .collect(),
            total,
        }
    }

    #[test]
    fn strongly_associated_bigram_has_positive_pmi() {
        // "葡萄" (grape) co-occurring far more than chance predicts.
        let index = index_from(
            vec![
                vec![("葡", 100), ("萄", 100), ("的", 1000)],
                vec![("葡萄", 95)],
            ],
            10_000,
        );
        let pmi = min_splitting_pmi("葡萄", &index).unwrap();
        assert!(pmi > 0.0, "expected positive PMI, got {pmi}");
    }

    #[test]
    fn independent_pair_has_low_or_negative_pmi() {
        let index = index_from(
            vec![
                vec![("甲", 5000), ("乙", 5000)],
                vec![("甲乙", 1)],
            ],
            10_000,
        );
        let pmi = min_splitting_pmi("甲乙", &index).unwrap();
        assert!(pmi < 1.0, "expected low PMI, got {pmi}");
    }

    #[test]
    fn missing_split_piece_defaults_to_total_count() {
        // "乙" is absent from the unigram table, so its denominator defaults
        // to the index total (100) instead of excluding the word.
        let index = index_from(vec![vec![("甲", 10)], vec![("甲乙", 5)]], 100);
        let pmi = min_splitting_pmi("甲乙", &index).unwrap();
        let expected = (100.0_f64 * 5.0 / (10.0 * 100.0)).ln();
        assert!((pmi - expected).abs() < 1e-9);
    }

    #[test]
    fn trigram_takes_minimum_over_both_splits() {
        // "甲乙丙": splits are (甲 | 乙丙) and (甲乙 | 丙).
        let index = index_from(
            vec![
                vec![("甲", 100), ("乙", 100), ("丙", 100)],
                vec![("甲乙", 50), ("乙丙", 2)],
                vec![("甲乙丙", 50)],
            ],
            10_000,
        );
        let pmi = min_splitting_pmi("甲乙丙", &index).unwrap();
        // The (甲 | 乙丙) split: ln(10000*50/(100*2)) = ln(2500) ~= 7.82
        // The (甲乙 | 丙) split: ln(10000*50/(50*100)) = ln(100) ~= 4.6
        // minimum should be the second, smaller value.
        assert!((pmi - (10_000.0_f64 * 50.0 / (50.0 * 100.0)).ln()).abs() < 1e-9);
    }

    #[test]
    fn filter_ngrams_never_retains_single_characters() {
        let index = index_from(vec![vec![("甲", 1), ("乙", 1)]], 2);
        let config = Config::default();
        let retained = filter_ngrams(&index, &config);
        assert!(retained.is_empty());
    }

    #[test]
    fn filter_ngrams_drops_low_pmi_bigrams() {
        let index = index_from(
            vec![
                vec![("甲", 5000), ("乙", 5000)],
                vec![("甲乙", 1)],
            ],
            10_000,
        );
        let mut config = Config::default();
        config.min_pmi = vec![100.0]; // unreachable threshold
        let retained = filter_ngrams(&index, &config);
        assert!(!retained.contains("甲乙"));
    }
}
