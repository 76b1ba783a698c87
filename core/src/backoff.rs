//! C7 — VocabularyBackoff: reject candidates the trie over-merged into
//! spans that were never themselves validated by the PMI filter.

use std::collections::{HashMap, HashSet};

/// Keep `candidates` whose evidence actually supports them:
/// - length outside `[min_len, max_len]`: dropped outright.
/// - length < 3: always kept (too short to meaningfully mis-split).
/// - length <= order: kept only if the whole candidate is in `retained`.
/// - length > order: kept only if every contiguous `order`-length window
///   of the candidate is in `retained` (no sub-span is pure filler).
pub fn filter_vocabulary(
    candidates: &HashMap<String, u64>,
    retained: &HashSet<String>,
    order: usize,
    min_len: usize,
    max_len: usize,
) -> HashMap<String, u64> {
    let mut out = HashMap::new();
    for (word, &count) in candidates {
        let chars: Vec<char> = word.chars().collect();
        let len = chars.len();

        if len < min_len || len > max_len {
            continue;
        }

        let keep = if len < 3 {
            true
        } else if len <= order {
            retained.contains(word)
        } else {
            (0..=(len - order)).all(|start| {
                let window: String = chars[start..start + order].iter().collect();
                retained.contains(&window)
            })
        };

        if keep {
            out.insert(word.clone(), count);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, u64)]) -> HashMap<String, u64> {
        entries.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    fn set(entries: &[&str]) -> HashSet<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn short_candidates_always_survive() {
        let candidates = map(&[("甲", 10), ("甲乙", 5)]);
        let retained = set(&[]);
        let out = filter_vocabulary(&candidates, &retained, 4, 1, 10);
        assert_eq!(out.get("甲"), Some(&10));
        assert_eq!(out.get("甲乙"), Some(&5));
    }

    #[test]
    fn mid_length_candidates_need_direct_membership() {
        let candidates = map(&[("甲乙丙", 10)]);
        let retained = set(&["甲乙丙"]);
        let out = filter_vocabulary(&candidates, &retained, 4, 1, 10);
        assert_eq!(out.get("甲乙丙"), Some(&10));

        let retained_empty = set(&[]);
        let out_empty = filter_vocabulary(&candidates, &retained_empty, 4, 1, 10);
        assert!(out_empty.is_empty());
    }

    #[test]
    fn long_candidates_need_every_order_window_retained() {
        let candidates = map(&[("甲乙丙丁戊", 10)]); // length 5, order 3
        let retained = set(&["甲乙丙", "乙丙丁", "丙丁戊"]);
        let out = filter_vocabulary(&candidates, &retained, 3, 1, 10);
        assert_eq!(out.get("甲乙丙丁戊"), Some(&10));
    }

    #[test]
    fn long_candidate_rejected_if_any_window_missing() {
        let candidates = map(&[("甲乙丙丁戊", 10)]);
        let retained = set(&["甲乙丙", "丙丁戊"]); // missing 乙丙丁
        let out = filter_vocabulary(&candidates, &retained, 3, 1, 10);
        assert!(out.is_empty());
    }

    #[test]
    fn candidates_outside_length_bounds_are_dropped() {
        let candidates = map(&[("甲", 10), ("甲乙丙丁戊己", 10)]);
        let retained = set(&["甲"]);
        let out = filter_vocabulary(&candidates, &retained, 4, 2, 5);
        assert!(!out.contains_key("甲")); // length 1 < min_len 2
        assert!(!out.contains_key("甲乙丙丁戊己")); // length 6 > max_len 5
    }
}
