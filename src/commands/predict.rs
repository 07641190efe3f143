use crate::config::Config;
use crate::fitness::library::LibraryPrediction;
use crate::fitness::{CombinatorialLibrary, LinearBackend, OneHotEncoder};
use anyhow::Result;
use std::path::PathBuf;

pub fn run(
    config: &Config,
    library_csv: PathBuf,
    output_csv: PathBuf,
    models_dir: PathBuf,
    single_dir: PathBuf,
    kinds: Vec<String>,
    ensemble_size: usize,
) -> Result<()> {
    let prediction = LibraryPrediction {
        library: CombinatorialLibrary::gb1_four_site(),
        wild_type: config.landscape.wild_type.clone(),
        encoder: OneHotEncoder::new(&config.landscape.alphabet),
        kinds,
        single_model_dir: single_dir,
        ensemble_root: models_dir,
        ensemble_size,
        backend: &LinearBackend,
    };

    let scored = prediction.run(&library_csv, &output_csv)?;
    println!("Scored {} variants, results in {}", scored, output_csv.display());
    Ok(())
}
