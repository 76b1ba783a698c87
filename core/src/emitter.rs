//! C8 — Emitter: write the final vocabulary, sorted by descending count,
//! via a temp file + atomic rename so readers never see a partial file.

use crate::error::DiscoveryError;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub fn write_vocabulary(
    words: &HashMap<String, u64>,
    out_path: &Path,
) -> Result<usize, DiscoveryError> {
    let mut entries: Vec<(&String, &u64)> = words.iter().collect();
    // Stable sort by descending count; ties keep HashMap iteration order,
    // which is good enough since nothing downstream depends on tie order.
    entries.sort_by(|a, b| b.1.cmp(a.1));

    let mut tmp_name = out_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = out_path.with_file_name(tmp_name);

    {
        let file = std::fs::File::create(&tmp_path).map_err(|e| DiscoveryError::io(&tmp_path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        for (word, count) in &entries {
            writeln!(writer, "{word} {count}").map_err(|e| DiscoveryError::io(&tmp_path, e))?;
        }
        writer.flush().map_err(|e| DiscoveryError::io(&tmp_path, e))?;
    }

    std::fs::rename(&tmp_path, out_path).map_err(|e| DiscoveryError::io(out_path, e))?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_sorted_descending_by_count() {
        let words: HashMap<String, u64> =
            [("甲".to_string(), 5), ("乙".to_string(), 50), ("丙".to_string(), 20)]
                .into_iter()
                .collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        let n = write_vocabulary(&words, &path).unwrap();
        assert_eq!(n, 3);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["乙 50", "丙 20", "甲 5"]);
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let words: HashMap<String, u64> = [("甲".to_string(), 1)].into_iter().collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        write_vocabulary(&words, &path).unwrap();
        let mut tmp_name = path.file_name().unwrap().to_os_string();
        tmp_name.push(".tmp");
        assert!(!path.with_file_name(tmp_name).exists());
    }

    #[test]
    fn empty_vocabulary_writes_empty_file() {
        let words: HashMap<String, u64> = HashMap::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        let n = write_vocabulary(&words, &path).unwrap();
        assert_eq!(n, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
