//! C9 — Pipeline: wires C1 through C8 together over a working directory of
//! intermediate hand-off files, emitting a `RunReport` alongside the final
//! vocabulary.

use crate::aggregator;
use crate::backoff;
use crate::config::Config;
use crate::counter::NgramCounterDriver;
use crate::emitter;
use crate::ngram_index::NgramIndex;
use crate::normalizer;
use crate::pmi;
use crate::report::RunReport;
use crate::trie::Trie;
use crate::vocab::CharVocab;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline. `documents` is consumed once to build the
    /// corpus; `work_dir` holds the intermediate hand-off files (corpus
    /// text, counter vocab, binary n-grams); the final vocabulary is
    /// written to `vocab_out_path`.
    pub fn run<I, S>(
        &self,
        documents: I,
        work_dir: &Path,
        vocab_out_path: &Path,
    ) -> anyhow::Result<RunReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.validate()?;
        std::fs::create_dir_all(work_dir)?;

        let corpus_path = work_dir.join("corpus.txt");
        let counter_vocab_path = work_dir.join("chars.vocab");
        let ngram_path = work_dir.join("ngrams.bin");

        let mut report = RunReport::default();

        {
            let _span = tracing::info_span!("normalize").entered();
            let t0 = Instant::now();
            report.documents_normalized =
                normalizer::write_corpus(documents, &corpus_path, self.config.progress_period)?;
            report.stage_millis.normalize = t0.elapsed().as_millis();
            tracing::info!(documents = report.documents_normalized, "normalized corpus");
        }

        {
            let _span = tracing::info_span!("count").entered();
            let t0 = Instant::now();
            let driver = NgramCounterDriver::new(self.config.counter_binary_dir.clone());
            driver.run(
                self.config.order,
                self.config.memory_fraction,
                &corpus_path,
                &ngram_path,
                &counter_vocab_path,
            )?;
            report.stage_millis.count = t0.elapsed().as_millis();
        }

        let index = {
            let _span = tracing::info_span!("index").entered();
            let t0 = Instant::now();
            let vocab = CharVocab::load(&counter_vocab_path)?;
            let index = NgramIndex::load(&ngram_path, &vocab, self.config.order, self.config.min_count)?;
            report.total_ngram_count = index.total;
            report.stage_millis.index = t0.elapsed().as_millis();
            tracing::info!(total = index.total, "indexed n-grams");
            index
        };

        let retained = {
            let _span = tracing::info_span!("pmi").entered();
            let t0 = Instant::now();
            let retained = pmi::filter_ngrams(&index, &self.config);
            report.retained_substrings = retained.len();
            report.stage_millis.pmi = t0.elapsed().as_millis();
            tracing::info!(retained = retained.len(), "filtered by PMI");
            retained
        };

        let trie = Trie::build(retained.iter());

        let candidates = {
            let _span = tracing::info_span!("aggregate").entered();
            let t0 = Instant::now();
            let candidates = aggregator::aggregate_candidates(
                &corpus_path,
                &trie,
                self.config.min_count,
                self.config.progress_period,
            )?;
            report.candidates_before_backoff = candidates.len();
            report.stage_millis.aggregate = t0.elapsed().as_millis();
            tracing::info!(candidates = candidates.len(), "aggregated candidates");
            candidates
        };

        let filtered = {
            let _span = tracing::info_span!("backoff").entered();
            let t0 = Instant::now();
            let candidates_std: HashMap<String, u64> = candidates.into_iter().collect();
            let filtered = backoff::filter_vocabulary(
                &candidates_std,
                &retained,
                self.config.order,
                self.config.min_len,
                self.config.max_len,
            );
            report.stage_millis.backoff = t0.elapsed().as_millis();
            filtered
        };

        {
            let _span = tracing::info_span!("emit").entered();
            let t0 = Instant::now();
            let n = emitter::write_vocabulary(&filtered, vocab_out_path)?;
            report.final_vocabulary_size = n;
            report.stage_millis.emit = t0.elapsed().as_millis();
            tracing::info!(words = n, "emitted vocabulary");
        }

        Ok(report)
    }
}
