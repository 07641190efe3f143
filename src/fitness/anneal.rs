//! Simulated-annealing driver. The optimizer itself is supplied by the caller
//! through [`Annealer`]; this module only prepares the problem, wires the
//! learned fitness function in, and exports the result.

use crate::fitness::encoding::OneHotEncoder;
use crate::fitness::model::{ModelBackend, ModelSession};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealConfig {
    #[serde(rename = "WT")]
    pub wild_type: String,
    pub num_mut: usize,
    pub mut_rate: f64,
    pub nsteps: usize,
    pub cool_sched: String,
    #[serde(default)]
    pub seed: u64,
    /// Model file restored for the fitness callback.
    pub model: PathBuf,
    pub export_best_seqs: PathBuf,
}

impl AnnealConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read annealing config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse annealing config {}", path.display()))
    }
}

/// Allowed residues per position; the initiator methionine is pinned.
pub fn residue_options(wild_type: &str, alphabet: &str) -> Vec<Vec<char>> {
    let all: Vec<char> = alphabet.chars().collect();
    (0..wild_type.chars().count())
        .map(|pos| if pos == 0 { vec!['M'] } else { all.clone() })
        .collect()
}

/// Everything the optimizer needs besides the fitness function.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealProblem {
    pub wild_type: String,
    pub residue_options: Vec<Vec<char>>,
    pub num_mut: usize,
    pub mut_rate: f64,
    pub nsteps: usize,
    pub cool_sched: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnealOutcome {
    pub best_mutations: Vec<String>,
    pub fitness: f64,
}

pub trait Annealer {
    fn optimize(
        &mut self,
        problem: &AnnealProblem,
        fitness: &dyn Fn(&str) -> Result<f64>,
        seed: u64,
    ) -> Result<AnnealOutcome>;
}

/// Sequence-to-fitness callback backed by a restored model.
pub struct SeqToFitness {
    session: ModelSession,
    encoder: OneHotEncoder,
}

impl SeqToFitness {
    pub fn new(session: ModelSession, encoder: OneHotEncoder) -> Self {
        Self { session, encoder }
    }

    /// Restores the model named by `config.model`.
    pub fn open(config: &AnnealConfig, backend: &dyn ModelBackend, alphabet: &str) -> Result<Self> {
        let session = ModelSession::open(backend, &config.model)?;
        Ok(Self::new(session, OneHotEncoder::new(alphabet)))
    }

    pub fn fitness(&self, seq: &str) -> Result<f64> {
        let batch = self.encoder.encode(&[seq])?;
        let predictions = self.session.predict(&batch)?;
        predictions
            .first()
            .copied()
            .context("Model returned no prediction")
    }
}

pub fn run_annealing(
    config: &AnnealConfig,
    alphabet: &str,
    annealer: &mut dyn Annealer,
    seq2fitness: &SeqToFitness,
) -> Result<AnnealOutcome> {
    let problem = AnnealProblem {
        wild_type: config.wild_type.clone(),
        residue_options: residue_options(&config.wild_type, alphabet),
        num_mut: config.num_mut,
        mut_rate: config.mut_rate,
        nsteps: config.nsteps,
        cool_sched: config.cool_sched.clone(),
    };

    info!(
        "Running optimization: {} mutations, {} steps, {} cooling",
        problem.num_mut, problem.nsteps, problem.cool_sched
    );
    let outcome = annealer.optimize(&problem, &|seq| seq2fitness.fitness(seq), config.seed)?;

    if let Some(dir) = config.export_best_seqs.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    fs::write(&config.export_best_seqs, serde_json::to_string_pretty(&outcome)?)
        .with_context(|| format!("Failed to write {}", config.export_best_seqs.display()))?;
    info!("Best fitness {} written to {}", outcome.fitness, config.export_best_seqs.display());

    Ok(outcome)
}
