use crate::fitness::encoding::EncodedBatch;
use crate::fitness::model::{ModelBackend, ModelSession};
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Independently trained replicates of one model architecture.
pub struct ModelEnsemble {
    pub kind: String,
    sessions: Vec<ModelSession>,
    missing: Vec<usize>,
}

/// Model files under `<root>/<kind>s/model_<i>/` for `i in 0..expected`, plus the missing ids.
pub fn find_model_files(
    root: &Path,
    kind: &str,
    expected: usize,
    extension: &str,
) -> Result<(Vec<PathBuf>, Vec<usize>)> {
    let needle = format!(".{}", extension);
    let mut paths = Vec::new();
    let mut missing = Vec::new();

    for i in 0..expected {
        let dir = root.join(format!("{}s", kind)).join(format!("model_{}", i));
        let mut found = Vec::new();
        if dir.is_dir() {
            for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
                let entry = entry?;
                if entry.file_name().to_string_lossy().contains(&needle) {
                    found.push(entry.path());
                }
            }
        }
        if found.is_empty() {
            missing.push(i);
        }
        found.sort();
        paths.extend(found);
    }

    Ok((paths, missing))
}

impl ModelEnsemble {
    pub fn discover(root: &Path, kind: &str, expected: usize, backend: &dyn ModelBackend) -> Result<Self> {
        let (paths, missing) = find_model_files(root, kind, expected, backend.extension())?;
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(|i| i.to_string()).collect();
            warn!("Could not find all {} models, missing models: {}", kind, ids.join(","));
        }

        let sessions = paths
            .iter()
            .map(|path| ModelSession::open(backend, path))
            .collect::<Result<Vec<_>>>()?;
        info!("Restored {} {} models", sessions.len(), kind);

        Ok(Self {
            kind: kind.to_string(),
            sessions,
            missing,
        })
    }

    pub fn from_sessions(kind: impl Into<String>, sessions: Vec<ModelSession>) -> Self {
        Self {
            kind: kind.into(),
            sessions,
            missing: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn missing(&self) -> &[usize] {
        &self.missing
    }

    /// Predictions indexed `[model][sequence]`.
    pub fn predict_all(&self, batch: &EncodedBatch) -> Result<Vec<Vec<f64>>> {
        self.sessions.iter().map(|s| s.predict(batch)).collect()
    }
}

/// Transposes `[model][sequence]` into `[sequence][model]`.
pub fn per_sequence(per_model: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n_seqs = per_model.first().map(Vec::len).unwrap_or(0);
    (0..n_seqs)
        .map(|s| per_model.iter().map(|preds| preds[s]).collect())
        .collect()
}

/// Median of each sequence's predictions across models (mean of the middle pair for even counts).
pub fn median_per_sequence(per_model: &[Vec<f64>]) -> Vec<f64> {
    per_sequence(per_model).into_iter().map(median).collect()
}

pub fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
