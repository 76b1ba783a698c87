//! C2 — NgramCounterDriver: invoke the external `count_ngrams` binary and
//! translate its exit status into a typed error.

use crate::error::DiscoveryError;
use std::path::{Path, PathBuf};
use std::process::Command;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

#[cfg(windows)]
const COUNTER_BIN: &str = "count_ngrams.exe";
#[cfg(not(windows))]
const COUNTER_BIN: &str = "count_ngrams";

/// Windows-specific STATUS_* exit codes the bundled counter is known to
/// return; POSIX builds only ever see a plain nonzero status.
const STATUS_INSUFFICIENT_MEMORY: i32 = -1073740791;
const STATUS_DLL_NOT_FOUND: i32 = -1073741515;

pub struct NgramCounterDriver {
    binary_dir: Option<PathBuf>,
}

impl NgramCounterDriver {
    pub fn new(binary_dir: Option<PathBuf>) -> Self {
        Self { binary_dir }
    }

    fn binary_path(&self) -> PathBuf {
        match &self.binary_dir {
            Some(dir) => dir.join(COUNTER_BIN),
            None => Self::exe_dir().unwrap_or_default().join(COUNTER_BIN),
        }
    }

    /// Directory containing the running executable, used as the default
    /// lookup location instead of relying on process-wide `PATH`/cwd.
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()?
            .parent()
            .map(|p| p.to_path_buf())
    }

    /// Rescale a fraction of *available* memory into a fraction of *total*
    /// memory, floored to one decimal place, which is what the counter's
    /// `--memory=N%` flag actually expects.
    pub fn rescale_memory_fraction(memory_fraction: f64) -> f64 {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        let total = sys.total_memory() as f64;
        let available = sys.available_memory() as f64;
        if total <= 0.0 {
            return memory_fraction;
        }
        let of_total = (available / total) * memory_fraction;
        (of_total * 10.0).floor() / 10.0
    }

    /// Run the counter, producing the n-gram and vocab files from the
    /// normalized corpus. Returns the count of bytes the counter wrote to
    /// the n-gram file (callers generally re-read it from disk instead).
    pub fn run(
        &self,
        order: usize,
        memory_fraction: f64,
        corpus_path: &Path,
        ngram_out_path: &Path,
        vocab_out_path: &Path,
    ) -> Result<(), DiscoveryError> {
        let percent = (Self::rescale_memory_fraction(memory_fraction) * 100.0) as u32;
        let corpus_in =
            std::fs::File::open(corpus_path).map_err(|e| DiscoveryError::io(corpus_path, e))?;
        let ngram_out = std::fs::File::create(ngram_out_path)
            .map_err(|e| DiscoveryError::io(ngram_out_path, e))?;

        tracing::info!(order, percent, "invoking count_ngrams");
        let output = Command::new(self.binary_path())
            .arg("-o")
            .arg(order.to_string())
            .arg(format!("--memory={percent}%"))
            .arg("--write_vocab_list")
            .arg(vocab_out_path)
            .stdin(corpus_in)
            .stdout(ngram_out)
            .output()
            .map_err(|e| DiscoveryError::io(self.binary_path(), e))?;

        if !output.status.success() {
            return Err(Self::classify_failure(&output));
        }
        Ok(())
    }

    fn classify_failure(output: &std::process::Output) -> DiscoveryError {
        let exit_code = output.status.code();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr_tail: String = stderr.chars().rev().take(512).collect::<String>().chars().rev().collect();

        let reason = match exit_code {
            Some(STATUS_INSUFFICIENT_MEMORY) => {
                "count_ngrams ran out of memory; lower memory_fraction".to_string()
            }
            Some(STATUS_DLL_NOT_FOUND) => {
                "count_ngrams is missing its boost runtime dependency".to_string()
            }
            _ => "count_ngrams exited with a non-zero status".to_string(),
        };

        DiscoveryError::Counter {
            exit_code,
            reason,
            stderr_tail,
        }
    }
}
