use crate::fitness::encoding::OneHotEncoder;
use crate::fitness::ensemble::{median, median_per_sequence, per_sequence, ModelEnsemble};
use crate::fitness::variants::{apply_mutations, Mutation};
use anyhow::Result;
use log::info;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    /// Greedily climb: take the mutation with the highest median prediction.
    #[value(name = "all")]
    Up,
    /// Greedily descend: take the lowest median prediction.
    #[value(name = "all_down")]
    Down,
    /// Score the wild type only.
    #[value(name = "wt")]
    WildType,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "all",
            Direction::Down => "all_down",
            Direction::WildType => "wt",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Direction::Up),
            "all_down" => Ok(Direction::Down),
            "wt" => Ok(Direction::WildType),
            other => anyhow::bail!("Unknown trajectory direction '{}'", other),
        }
    }
}

/// One accepted mutation and the ensemble's view of the resulting sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryStep {
    /// `None` for the wild-type direction.
    pub mutation: Option<Mutation>,
    pub predictions: Vec<f64>,
    pub median: f64,
}

/// Every single substitution at positions `1..len` not yet mutated.
pub fn candidate_mutations(wild_type: &str, alphabet: &str, taken: &[Mutation]) -> Vec<Mutation> {
    let mut out = Vec::new();
    for (pos, wt) in wild_type.chars().enumerate().skip(1) {
        if taken.iter().any(|m| m.pos == pos) {
            continue;
        }
        for aa in alphabet.chars().filter(|&aa| aa != wt) {
            out.push(Mutation { wt, pos, aa });
        }
    }
    out
}

/// Walks a greedy mutational trajectory guided by the ensemble median.
pub fn greedy_trajectory(
    ensemble: &ModelEnsemble,
    encoder: &OneHotEncoder,
    wild_type: &str,
    alphabet: &str,
    direction: Direction,
    max_steps: usize,
) -> Result<Vec<TrajectoryStep>> {
    if direction == Direction::WildType {
        let batch = encoder.encode(&[wild_type])?;
        let predictions: Vec<f64> = ensemble.predict_all(&batch)?.into_iter().map(|p| p[0]).collect();
        let median = median(predictions.clone());
        return Ok(vec![TrajectoryStep {
            mutation: None,
            predictions,
            median,
        }]);
    }

    let mut taken: Vec<Mutation> = Vec::new();
    let mut steps = Vec::new();

    for step in 0..max_steps {
        let candidates = candidate_mutations(wild_type, alphabet, &taken);
        if candidates.is_empty() {
            break;
        }
        info!("{} trajectory: step {} with {} candidates", ensemble.kind, step, candidates.len());

        let sequences = candidates
            .iter()
            .map(|m| {
                let mut muts = taken.clone();
                muts.push(*m);
                apply_mutations(wild_type, &muts)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let batch = encoder.encode(&sequences)?;
        let per_model = ensemble.predict_all(&batch)?;
        let medians = median_per_sequence(&per_model);
        let per_seq = per_sequence(&per_model);

        // First candidate wins ties.
        let mut best = 0;
        for (i, &m) in medians.iter().enumerate().skip(1) {
            let better = match direction {
                Direction::Up => m > medians[best],
                _ => m < medians[best],
            };
            if better {
                best = i;
            }
        }

        taken.push(candidates[best]);
        steps.push(TrajectoryStep {
            mutation: Some(candidates[best]),
            predictions: per_seq.get(best).cloned().unwrap_or_default(),
            median: medians.get(best).copied().unwrap_or(f64::NAN),
        });
    }

    Ok(steps)
}
