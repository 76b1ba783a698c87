//! Pipeline configuration.
//!
//! Mirrors the teacher crate's `Config` load/save pair (TOML-backed,
//! validated at construction) but scoped to the parameters the
//! word-discovery pipeline actually needs.

use crate::error::DiscoveryError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default minimum splitting-PMI thresholds, indexed by `min(len - 1, len(array) - 1)`.
/// Bigrams need >= 2 nats, trigrams >= 4, 4-grams and beyond >= 6; index 0 is
/// never reached (single characters bypass the PMI filter entirely).
pub const DEFAULT_MIN_PMI: &[f64] = &[0.0, 2.0, 4.0, 6.0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Truncation frequency: n-grams and candidates below this count are dropped.
    pub min_count: u64,
    /// Minimum surviving word length, in Unicode code points.
    pub min_len: usize,
    /// Maximum surviving word length, in Unicode code points.
    pub max_len: usize,
    /// N-gram order used by the external counter (>= 2).
    pub order: usize,
    /// Fraction of *available* memory to hand the counter (0, 1].
    pub memory_fraction: f64,
    /// Per-order minimum splitting PMI thresholds, indexed by n-gram length - 1
    /// and clamped to the last entry for longer lengths.
    pub min_pmi: Vec<f64>,
    /// Directory to look for the `count_ngrams`/`count_ngrams.exe` binary in.
    /// Defaults to the directory containing the running executable.
    pub counter_binary_dir: Option<PathBuf>,
    /// How many documents/records to process between progress log events.
    pub progress_period: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_count: 32,
            min_len: 2,
            max_len: 5,
            order: 4,
            memory_fraction: 0.5,
            min_pmi: DEFAULT_MIN_PMI.to_vec(),
            counter_binary_dir: None,
            progress_period: 100_000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DiscoveryError::io(path.as_ref(), e))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content).map_err(|e| DiscoveryError::io(path.as_ref(), e))?;
        Ok(())
    }

    /// Validate the configuration constraints from the error-handling design (d).
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if !(self.memory_fraction > 0.0 && self.memory_fraction <= 1.0) {
            return Err(DiscoveryError::Config(format!(
                "memory_fraction must be in (0, 1], got {}",
                self.memory_fraction
            )));
        }
        if self.order < 2 {
            return Err(DiscoveryError::Config(format!(
                "order must be >= 2, got {}",
                self.order
            )));
        }
        if self.min_len > self.max_len {
            return Err(DiscoveryError::Config(format!(
                "min_len ({}) must be <= max_len ({})",
                self.min_len, self.max_len
            )));
        }
        if self.min_pmi.is_empty() {
            return Err(DiscoveryError::Config(
                "min_pmi must have at least one threshold".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimum splitting-PMI threshold for a candidate of character length
    /// `len`. Indexed by `len - 1` (a length-2 bigram's split is scored
    /// against `min_pmi[1]`; `min_pmi[0]` is never reached by any splittable
    /// word, since single characters bypass the PMI filter entirely),
    /// clamped to the last configured entry for longer lengths.
    pub fn min_pmi_for_len(&self, len: usize) -> f64 {
        let idx = len.saturating_sub(1).min(self.min_pmi.len() - 1);
        self.min_pmi[idx]
    }
}
