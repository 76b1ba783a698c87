//! C1 — CorpusNormalizer: stream documents into a single corpus file with
//! space-separated combinable tokens and newline-separated hard boundaries.

use crate::error::DiscoveryError;
use regex::Regex;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn filler_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // HTML-like tag spans, plus a fixed set of filler particles that
        // never participate in a word boundary and are treated as noise.
        Regex::new(r"<[^>]*>|的话|呢|吧|啊|呀|嘛").unwrap()
    })
}

fn non_permitted_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Everything NOT in the permitted class becomes a hard boundary.
        // (ASCII space is permitted here too: it is the separator §4.1
        // step 1 produces from the ideographic space and must survive.)
        Regex::new(r"[^\p{Han}0-9A-Za-z_#@$:/.&\s-]+").unwrap()
    })
}

fn token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // A single Han character, or a maximal identifier-like run of the
        // form (alnum+[:/.&-]+)+alnum+ (e.g. "foo.bar/baz-1").
        Regex::new(r"\p{Han}|(?:[0-9A-Za-z_]+[:/.&-]+)*[0-9A-Za-z_]+").unwrap()
    })
}

fn barrier_run_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\n:/.&-]+").unwrap())
}

/// Normalize one document into the corpus's space/newline token stream.
///
/// This is a pure function over a single document; `Pipeline` drives it
/// over the document source and writes the result to the corpus file.
pub fn normalize_document(doc: &str) -> String {
    // 1. Ideographic space -> ASCII space, trim.
    let doc = doc.replace('\u{3000}', " ");
    let doc = doc.trim();
    // NFC so combining-character input doesn't fracture CJK runs.
    let doc: String = doc.nfc().collect();

    // 2. HTML-like tags and filler particles become hard boundaries.
    let doc = filler_pattern().replace_all(&doc, "\n");

    // 3. Everything outside the permitted class becomes a hard boundary.
    let doc = non_permitted_pattern().replace_all(&doc, "\n");

    // 4. Token merging: emit each token followed by a space, collapse
    // barrier runs (\n : / . & -) to a single newline, permitting the
    // longest-match tokenizer to cross spaces but never newlines.
    let mut out = String::with_capacity(doc.len() * 2);
    let mut last_end = 0usize;
    for m in token_pattern().find_iter(&doc) {
        let gap = &doc[last_end..m.start()];
        if !gap.is_empty() {
            if barrier_run_pattern().is_match(gap) {
                out.push('\n');
            }
        }
        out.push_str(m.as_str());
        out.push(' ');
        last_end = m.end();
    }
    let tail = &doc[last_end..];
    if barrier_run_pattern().is_match(tail) {
        out.push('\n');
    }
    out
}

/// Stream a sequence of documents into a single UTF-8 corpus file.
///
/// `documents` is consumed exactly once; callers needing a second pass
/// (see CandidateAggregator) must re-read the resulting file from disk
/// rather than restart this iterator (see concurrency/resource model).
pub fn write_corpus<I, S>(
    documents: I,
    out_path: &Path,
    progress_period: usize,
) -> Result<usize, DiscoveryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let file = std::fs::File::create(out_path).map_err(|e| DiscoveryError::io(out_path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    let mut count = 0usize;
    for doc in documents {
        let normalized = normalize_document(doc.as_ref());
        writer
            .write_all(normalized.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| DiscoveryError::io(out_path, e))?;
        count += 1;
        if progress_period > 0 && count % progress_period == 0 {
            tracing::info!(exported = count, "exporting corpus");
        }
    }
    writer.flush().map_err(|e| DiscoveryError::io(out_path, e))?;
    Ok(count)
}
