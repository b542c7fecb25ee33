use crate::instance::Instance;
use crate::solution::Solution;
use indicatif::{ProgressBar, ProgressStyle};
use rand::RngCore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

// Type alias for the progress callback
pub type ProgressCallback<'a> = &'a mut dyn FnMut(String);

/// Trait that all solvers must implement. The random source is passed in
/// explicitly so runs are reproducible from a seed.
pub trait Algorithm {
    fn name(&self) -> &str;

    /// Solves the instance, optionally providing status updates via callback.
    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        progress_callback: ProgressCallback,
    ) -> Solution;
}

// Results of a single algorithm run
#[derive(Debug)]
pub struct RunResult {
    pub cost: i32,
    pub solution: Solution,
    pub time_ms: u128,
}

// Statistics for multiple runs
#[derive(Debug)]
pub struct ExperimentStats {
    pub algorithm_name: String,
    pub instance_name: String,
    pub min_cost: i32,
    pub max_cost: i32,
    pub avg_cost: f64,
    pub best_solution: Solution,
    pub avg_time_ms: f64,
    pub num_runs: usize,
}

/// Runs an algorithm `num_runs` times and collects cost and time statistics.
pub fn run_experiment(
    algorithm: &dyn Algorithm,
    instance: &Instance,
    expected_len: usize,
    num_runs: usize,
    rng: &mut dyn RngCore,
) -> ExperimentStats {
    assert!(num_runs > 0, "experiment needs at least one run");

    let mut results = Vec::with_capacity(num_runs);

    let pb = ProgressBar::new(num_runs as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .unwrap()
            .progress_chars("# >-"),
    );
    pb.set_prefix(format!("Running {}", algorithm.name()));
    pb.set_message("Starting...");

    for run_index in 0..num_runs {
        let start = Instant::now();

        let mut callback = |status: String| {
            pb.set_message(format!("[Run {}/{}] {}", run_index + 1, num_runs, status));
        };

        let solution = algorithm.solve_with_feedback(instance, rng, &mut callback);
        let elapsed = start.elapsed();

        debug_assert!(
            solution.is_valid(instance, expected_len),
            "invalid solution produced by {}",
            algorithm.name()
        );

        results.push(RunResult {
            cost: solution.evaluate(instance),
            solution,
            time_ms: elapsed.as_millis(),
        });
        pb.inc(1);
    }
    pb.finish_with_message("Finished all runs.");

    let mut min_cost = i32::MAX;
    let mut max_cost = i32::MIN;
    let mut sum_cost: i64 = 0;
    let mut sum_time: u128 = 0;
    let mut best_solution = None;

    for result in &results {
        if result.cost < min_cost {
            min_cost = result.cost;
            best_solution = Some(result.solution.clone());
        }
        max_cost = max_cost.max(result.cost);
        sum_cost += result.cost as i64;
        sum_time += result.time_ms;
    }

    let best_solution = best_solution.expect("best solution exists when num_runs > 0");

    log::info!(
        "{} on {}: best {} worst {} over {} runs",
        algorithm.name(),
        instance.name,
        min_cost,
        max_cost,
        num_runs
    );

    ExperimentStats {
        algorithm_name: algorithm.name().to_string(),
        instance_name: instance.name.clone(),
        min_cost,
        max_cost,
        avg_cost: sum_cost as f64 / num_runs as f64,
        best_solution,
        avg_time_ms: sum_time as f64 / num_runs as f64,
        num_runs,
    }
}

// Helper function to format experiment results as a table row
pub fn format_stats_row(stats: &ExperimentStats) -> String {
    if stats.num_runs == 0 {
        return format!("| {} | No runs executed | N/A |", stats.algorithm_name);
    }
    format!(
        "| {} | {:.2} ({} - {}) | {:.2} |",
        stats.algorithm_name, stats.avg_cost, stats.min_cost, stats.max_cost, stats.avg_time_ms
    )
}

fn cost_breakdown(solution: &Solution, instance: &Instance) -> (i32, i32) {
    let nodes = solution.nodes();
    let mut path_length = 0;
    let mut node_costs = 0;
    for i in 0..nodes.len() {
        path_length += instance.distance(nodes[i], nodes[(i + 1) % nodes.len()]);
        node_costs += instance.cost(nodes[i]);
    }
    (path_length, node_costs)
}

/// Writes the best cycle as indices in visit order on a single line, with the
/// total cost as a trailing field.
pub fn write_solution_file<P: AsRef<Path>>(
    path: P,
    stats: &ExperimentStats,
) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for &node in stats.best_solution.nodes() {
        write!(out, "{} ", node)?;
    }
    writeln!(out, "{}", stats.min_cost)?;
    Ok(())
}

/// Writes the aggregate result file: best/worst/average cost, the cost
/// breakdown of the best solution and the best cycle itself.
pub fn write_result_file<P: AsRef<Path>>(
    path: P,
    stats: &ExperimentStats,
    instance: &Instance,
) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "Best cost: {}", stats.min_cost)?;
    writeln!(out, "Worst cost: {}", stats.max_cost)?;
    writeln!(out, "Average cost: {:.2}", stats.avg_cost)?;

    let (path_length, node_costs) = cost_breakdown(&stats.best_solution, instance);
    writeln!(out, "Best solution total cost breakdown:")?;
    writeln!(out, " - Path length: {}", path_length)?;
    writeln!(out, " - Node costs: {}", node_costs)?;

    write!(out, "Best solution: ")?;
    for &node in stats.best_solution.nodes() {
        write!(out, "{} ", node)?;
    }
    writeln!(out)?;
    Ok(())
}
