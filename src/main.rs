mod algorithm;
mod algorithms;
mod config;
mod instance;
mod moves;
mod solution;

use algorithm::{format_stats_row, run_experiment, write_result_file, write_solution_file};
use clap::Parser;
use config::{AlgorithmId, Args, ConfigError, build_algorithm};
use instance::{Instance, InstanceError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::create_dir_all;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error("load failed: {0}")]
    Load(#[from] InstanceError),
    #[error("config rejected: {0}")]
    Config(#[from] ConfigError),
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let algorithm_id: AlgorithmId = args.algorithm.parse()?;

    let mut instance = Instance::from_file(&args.instance)?;
    log::info!(
        "loaded {} with {} points",
        instance.name,
        instance.size()
    );

    let algorithm = build_algorithm(algorithm_id, args, instance.size())?;
    if algorithm_id.uses_candidate_lists() {
        instance.precompute_candidates(args.candidate_list_size);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let expected_len = instance.select_count(args.fraction_nodes);
    let stats = run_experiment(
        algorithm.as_ref(),
        &instance,
        expected_len,
        args.num_runs,
        &mut rng,
    );

    create_dir_all(&args.output_dir)?;
    let base = format!("{}_{}", instance.name, args.algorithm);
    write_solution_file(args.output_dir.join(format!("{}.txt", base)), &stats)?;
    write_result_file(
        args.output_dir.join(format!("{}_result.txt", base)),
        &stats,
        &instance,
    )?;

    println!("| Instance | Algorithm | Cost (min - max) | Time (ms) |");
    println!("|----------|-----------|------------------|-----------|");
    println!("| {} | {}", stats.instance_name, format_stats_row(&stats).trim_start_matches("| "));
    Ok(())
}
