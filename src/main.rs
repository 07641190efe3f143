use clap::Parser;
use env_logger::Env;
use landscape_tools::cli::{self, Commands};
use landscape_tools::commands;
use landscape_tools::config::Config;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();

    let result = Config::resolve(args.config.as_deref()).and_then(|config| match args.command {
        Commands::Merge { r1, r2, output } => commands::merge::run(&config, r1, r2, output, args.quiet),
        Commands::Count {
            reference_csv,
            output_csv,
            merged,
            date,
        } => commands::count::run(&config, reference_csv, output_csv, merged, date),
        Commands::Preprocess {
            input_directory,
            date,
            merged_reads_directory,
            input_seq_csv,
            output_counts_file,
            manifest,
        } => commands::preprocess::run(
            &config,
            input_directory,
            date,
            merged_reads_directory,
            input_seq_csv,
            output_counts_file,
            manifest,
            args.quiet,
        ),
        Commands::Predict {
            library_csv,
            output_csv,
            models_dir,
            single_dir,
            kinds,
            ensemble_size,
        } => commands::predict::run(&config, library_csv, output_csv, models_dir, single_dir, kinds, ensemble_size),
        Commands::Trajectory {
            direction,
            output_csv,
            models_dir,
            kinds,
            ensemble_size,
            steps,
        } => commands::trajectory::run(&config, direction, output_csv, models_dir, kinds, ensemble_size, steps),
        Commands::InitConfig { path, force } => commands::init_config::run(path, force),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
