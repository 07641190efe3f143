use crate::fitness::encoding::EncodedBatch;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A restored, ready-to-run fitness predictor.
pub trait FitnessModel {
    /// One prediction per encoded sequence.
    fn predict(&self, batch: &EncodedBatch) -> Result<Vec<f64>>;
}

/// Knows how to restore models of one on-disk format.
pub trait ModelBackend {
    /// Extension (without the dot) of model files this backend can restore.
    fn extension(&self) -> &str;

    fn restore(&self, path: &Path) -> Result<Box<dyn FitnessModel>>;
}

/// A model held for the duration of a scope; released when dropped.
pub struct ModelSession {
    path: PathBuf,
    model: Box<dyn FitnessModel>,
}

impl ModelSession {
    pub fn open(backend: &dyn ModelBackend, path: &Path) -> Result<Self> {
        let model = backend
            .restore(path)
            .with_context(|| format!("Failed to restore model {}", path.display()))?;
        debug!("Restored model session {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            model,
        })
    }

    pub fn predict(&self, batch: &EncodedBatch) -> Result<Vec<f64>> {
        let predictions = self.model.predict(batch)?;
        if predictions.len() != batch.n_seqs {
            anyhow::bail!(
                "Model {} returned {} predictions for {} sequences",
                self.path.display(),
                predictions.len(),
                batch.n_seqs
            );
        }
        Ok(predictions)
    }
}

impl Drop for ModelSession {
    fn drop(&mut self) {
        debug!("Released model session {}", self.path.display());
    }
}

/// Linear regression over the one-hot encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub bias: f64,
    pub weights: Vec<f64>,
}

impl FitnessModel for LinearModel {
    fn predict(&self, batch: &EncodedBatch) -> Result<Vec<f64>> {
        if self.weights.len() != batch.features_per_seq() {
            anyhow::bail!(
                "Model expects {} features, batch has {}",
                self.weights.len(),
                batch.features_per_seq()
            );
        }
        Ok((0..batch.n_seqs)
            .map(|i| {
                batch
                    .row(i)
                    .iter()
                    .zip(&self.weights)
                    .map(|(&x, &w)| x as f64 * w)
                    .sum::<f64>()
                    + self.bias
            })
            .collect())
    }
}

/// Restores [`LinearModel`]s from JSON weight files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearBackend;

impl ModelBackend for LinearBackend {
    fn extension(&self) -> &str {
        "json"
    }

    fn restore(&self, path: &Path) -> Result<Box<dyn FitnessModel>> {
        let content = fs::read_to_string(path)?;
        let model: LinearModel = serde_json::from_str(&content)?;
        info!("Loaded linear model with {} weights from {}", model.weights.len(), path.display());
        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::encoding::OneHotEncoder;

    #[test]
    fn linear_model_sums_active_weights() {
        let model = LinearModel {
            bias: 0.5,
            weights: vec![1.0, 2.0, 3.0, 4.0],
        };
        let batch = OneHotEncoder::new("AC").encode(&["AC", "CA"]).unwrap();
        assert_eq!(model.predict(&batch).unwrap(), vec![0.5 + 1.0 + 4.0, 0.5 + 2.0 + 3.0]);
    }

    #[test]
    fn session_restores_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gb1_lr.json");
        fs::write(&path, r#"{"bias": 1.0, "weights": [0.0, 1.0]}"#).unwrap();

        let session = ModelSession::open(&LinearBackend, &path).unwrap();
        let batch = OneHotEncoder::new("AC").encode(&["C", "A"]).unwrap();
        assert_eq!(session.predict(&batch).unwrap(), vec![2.0, 1.0]);
    }

    #[test]
    fn feature_mismatch_is_an_error() {
        let model = LinearModel {
            bias: 0.0,
            weights: vec![1.0],
        };
        let batch = OneHotEncoder::new("AC").encode(&["AC"]).unwrap();
        assert!(model.predict(&batch).is_err());
    }
}
