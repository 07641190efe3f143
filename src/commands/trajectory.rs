use crate::config::Config;
use crate::fitness::trajectory::{greedy_trajectory, Direction, TrajectoryStep};
use crate::fitness::{LinearBackend, ModelEnsemble, OneHotEncoder};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Writes one `<kind>_mut`/`<kind>_func` column pair per kind, truncated to the shortest trajectory.
pub fn write_trajectories(
    path: &Path,
    direction: Direction,
    trajectories: &[(String, Vec<TrajectoryStep>)],
) -> Result<()> {
    let mut headers = Vec::new();
    for (kind, _) in trajectories {
        if direction != Direction::WildType {
            headers.push(format!("{}_mut", kind));
        }
        headers.push(format!("{}_func", kind));
    }

    let rows = trajectories.iter().map(|(_, steps)| steps.len()).min().unwrap_or(0);
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&headers)?;
    for row in 0..rows {
        let mut record = Vec::with_capacity(headers.len());
        for (_, steps) in trajectories {
            let step = &steps[row];
            if direction != Direction::WildType {
                record.push(step.mutation.map(|m| m.to_string()).unwrap_or_default());
            }
            record.push(serde_json::to_string(&step.predictions)?);
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn run(
    config: &Config,
    direction: Direction,
    output_csv: PathBuf,
    models_dir: PathBuf,
    kinds: Vec<String>,
    ensemble_size: usize,
    steps: usize,
) -> Result<()> {
    let encoder = OneHotEncoder::new(&config.landscape.alphabet);
    let mut trajectories = Vec::with_capacity(kinds.len());

    for kind in kinds {
        let ensemble = ModelEnsemble::discover(&models_dir, &kind, ensemble_size, &LinearBackend)?;
        if ensemble.is_empty() {
            anyhow::bail!("No {} models found under {}", kind, models_dir.display());
        }
        let walk = greedy_trajectory(
            &ensemble,
            &encoder,
            &config.landscape.wild_type,
            &config.landscape.alphabet,
            direction,
            steps,
        )?;
        trajectories.push((kind, walk));
    }

    write_trajectories(&output_csv, direction, &trajectories)?;
    println!("Wrote {} trajectories to {}", direction, output_csv.display());
    Ok(())
}
