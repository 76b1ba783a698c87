//! C5 — Trie: prefix tree over the retained substrings `R`, used to
//! tokenize the corpus via longest-connective matching.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, Box<TrieNode>>,
    terminal: bool,
}

#[derive(Debug, Default)]
pub struct Trie {
    root: TrieNode,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::new();
        for w in words {
            trie.insert(w.as_ref());
        }
        trie
    }

    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(c).or_insert_with(Box::default);
        }
        node.terminal = true;
    }

    pub fn contains_word(&self, word: &str) -> bool {
        let mut node = &self.root;
        for c in word.chars() {
            match node.children.get(&c) {
                Some(next) => node = next,
                None => return false,
            }
        }
        node.terminal
    }

    /// Tokenize one barrier-free run of code points using longest-connective
    /// matching: for every start position, follow the longest trie path
    /// from there, letting any reachable word's end extend the current
    /// span; a position the current span's reach doesn't cover starts a
    /// new span. This merges overlapping candidate words into one token
    /// rather than picking a single maximal match at each position.
    pub fn tokenize(&self, sent: &[char]) -> Vec<String> {
        let mut result = Vec::new();
        if sent.is_empty() {
            return result;
        }
        let mut start = 0usize;
        let mut end = 1usize;
        for i in 0..sent.len() {
            if i == end {
                result.push(sent[start..end].iter().collect());
                start = i;
                end = i + 1;
            }
            let mut node = &self.root;
            for j in 0..(sent.len() - i) {
                let c = sent[i + j];
                match node.children.get(&c) {
                    Some(next) => {
                        node = next;
                        if next.terminal {
                            let reach = i + j + 1;
                            if reach > end {
                                end = reach;
                            }
                        }
                    }
                    None => break,
                }
            }
        }
        result.push(sent[start..end].iter().collect());
        result
    }

    /// Convenience wrapper over `&str` input for callers outside the hot path.
    pub fn tokenize_str(&self, sent: &str) -> Vec<String> {
        let chars: Vec<char> = sent.chars().collect();
        self.tokenize(&chars)
    }
}
