//! Machine-readable run summary, written alongside the vocabulary file so
//! scripted callers don't have to scrape log output.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunReport {
    pub documents_normalized: usize,
    pub total_ngram_count: u64,
    pub retained_substrings: usize,
    pub candidates_before_backoff: usize,
    pub final_vocabulary_size: usize,
    pub stage_millis: StageMillis,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StageMillis {
    pub normalize: u128,
    pub count: u128,
    pub index: u128,
    pub pmi: u128,
    pub aggregate: u128,
    pub backoff: u128,
    pub emit: u128,
}

impl RunReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
