//! Folder scanning and batch aggregation

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared_types::BatchSummary;

use crate::agent::ValidationRun;
use crate::error::ValidatorError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    pub runs: Vec<ValidationRun>,
}

impl BatchOutcome {
    pub fn from_runs(runs: Vec<ValidationRun>) -> Self {
        let summary = BatchSummary::from_outcomes(
            runs.iter()
                .map(|run| (&run.result, run.processing_time_seconds)),
        );
        Self { summary, runs }
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// PDF files directly inside `folder`, sorted by path
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>, ValidatorError> {
    if !folder.is_dir() {
        return Err(ValidatorError::NotADirectory(folder.to_path_buf()));
    }

    let entries = std::fs::read_dir(folder).map_err(|e| ValidatorError::io(folder, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ValidatorError::io(folder, e))?.path();
        if path.is_file() && is_pdf(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Write runs as pretty JSON
pub fn save_runs<T: Serialize>(path: &Path, runs: &T) -> Result<(), ValidatorError> {
    let json = serde_json::to_string_pretty(runs)?;
    std::fs::write(path, json).map_err(|e| ValidatorError::io(path, e))
}
