use crate::algorithm::Algorithm;
use crate::algorithms::greedy_cycle::GreedyCycle;
use crate::algorithms::local_search::base::{
    InitialSolutionType, IntraNeighborhood, LocalSearch, SearchVariant,
};
use crate::algorithms::local_search::candidate::CandidateLocalSearch;
use crate::algorithms::local_search::drivers::{AcceptanceRule, SearchDriver};
use crate::algorithms::local_search::move_cache::MoveCacheLocalSearch;
use crate::algorithms::nearest_neighbor::NearestNeighbor;
use crate::algorithms::random::RandomSearch;
use crate::algorithms::regret_cycle::{RegretCycle, WeightedRegretCycle};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Debug, Parser)]
#[command(
    name = "halftour",
    about = "Heuristic workbench for cost-weighted node-selection cycle routing"
)]
pub struct Args {
    /// Instance file with one `x;y;cost` record per line.
    pub instance: PathBuf,

    /// Algorithm id, e.g. ls_steepest_2e_random, candidate_ls, msls, ils.
    #[arg(long, default_value = "ls_steepest_2e_random")]
    pub algorithm: String,

    /// Candidate list size for candidate_ls.
    #[arg(long, default_value_t = 10)]
    pub candidate_list_size: usize,

    /// Restart count for iteration-bounded drivers.
    #[arg(long, default_value_t = 200)]
    pub num_iterations: usize,

    /// Wall-clock budget for time-bounded drivers.
    #[arg(long, default_value_t = 10_000)]
    pub max_time_ms: u64,

    /// Number of random two-edge exchanges per ILS perturbation.
    #[arg(long, default_value_t = 4)]
    pub perturbation_strength: usize,

    /// Fraction of the nodes a solution must cover.
    #[arg(long, default_value_t = 0.5)]
    pub fraction_nodes: f64,

    /// Make ILS fall back to the global best after a non-improving
    /// perturbation instead of always accepting the perturbed optimum.
    #[arg(long)]
    pub accept_improving_only: bool,

    /// Independent runs to aggregate into the result statistics.
    #[arg(long, default_value_t = 1)]
    pub num_runs: usize,

    /// Seed for the random source; taken from the OS when absent.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for the solution and result files.
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,
}

/// The recognized algorithm ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmId {
    RandomSearch,
    NearestNeighbor,
    GreedyCycle,
    Regret2,
    Regret2Weighted,
    LsSteepest2nRandom,
    LsSteepest2eRandom,
    LsGreedy2nRandom,
    LsGreedy2eRandom,
    LsSteepest2nGreedyStart,
    LsSteepest2eGreedyStart,
    LsGreedy2nGreedyStart,
    LsGreedy2eGreedyStart,
    CandidateLs,
    MoveCacheLs,
    Msls,
    Ils,
    Lsns,
    LsnsNoInner,
}

impl FromStr for AlgorithmId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random_search" => Ok(Self::RandomSearch),
            "nearest_neighbor" => Ok(Self::NearestNeighbor),
            "greedy_cycle" => Ok(Self::GreedyCycle),
            "regret2" => Ok(Self::Regret2),
            "regret2_weighted" => Ok(Self::Regret2Weighted),
            "ls_steepest_2n_random" => Ok(Self::LsSteepest2nRandom),
            "ls_steepest_2e_random" => Ok(Self::LsSteepest2eRandom),
            "ls_greedy_2n_random" => Ok(Self::LsGreedy2nRandom),
            "ls_greedy_2e_random" => Ok(Self::LsGreedy2eRandom),
            "ls_steepest_2n_greedy_start" => Ok(Self::LsSteepest2nGreedyStart),
            "ls_steepest_2e_greedy_start" => Ok(Self::LsSteepest2eGreedyStart),
            "ls_greedy_2n_greedy_start" => Ok(Self::LsGreedy2nGreedyStart),
            "ls_greedy_2e_greedy_start" => Ok(Self::LsGreedy2eGreedyStart),
            "candidate_ls" => Ok(Self::CandidateLs),
            "movecache_ls" => Ok(Self::MoveCacheLs),
            "msls" => Ok(Self::Msls),
            "ils" => Ok(Self::Ils),
            "lsns" => Ok(Self::Lsns),
            "lsns_no_inner" => Ok(Self::LsnsNoInner),
            other => Err(ConfigError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl AlgorithmId {
    pub fn uses_candidate_lists(&self) -> bool {
        matches!(self, Self::CandidateLs)
    }
}

/// Validates the numeric parameters and instantiates the requested solver.
/// `total_nodes` is the instance size, used for range checks.
pub fn build_algorithm(
    id: AlgorithmId,
    args: &Args,
    total_nodes: usize,
) -> Result<Box<dyn Algorithm>, ConfigError> {
    if args.num_runs == 0 {
        return Err(ConfigError::InvalidParameter(
            "num_runs must be positive".to_string(),
        ));
    }
    if !(args.fraction_nodes > 0.0 && args.fraction_nodes <= 1.0) {
        return Err(ConfigError::InvalidParameter(format!(
            "fraction_nodes must lie in (0, 1], got {}",
            args.fraction_nodes
        )));
    }
    if id.uses_candidate_lists()
        && (args.candidate_list_size == 0 || args.candidate_list_size > total_nodes - 1)
    {
        return Err(ConfigError::InvalidParameter(format!(
            "candidate_list_size must lie in [1, {}], got {}",
            total_nodes - 1,
            args.candidate_list_size
        )));
    }
    if id == AlgorithmId::Msls && args.num_iterations == 0 {
        return Err(ConfigError::InvalidParameter(
            "num_iterations must be positive".to_string(),
        ));
    }
    if matches!(id, AlgorithmId::Ils | AlgorithmId::Lsns | AlgorithmId::LsnsNoInner)
        && args.max_time_ms == 0
    {
        return Err(ConfigError::InvalidParameter(
            "max_time_ms must be positive".to_string(),
        ));
    }
    if id == AlgorithmId::Ils && args.perturbation_strength == 0 {
        return Err(ConfigError::InvalidParameter(
            "perturbation_strength must be positive".to_string(),
        ));
    }

    let k = ((total_nodes as f64 * args.fraction_nodes).ceil() as usize).clamp(1, total_nodes);
    let time_limit = Duration::from_millis(args.max_time_ms);

    let ls = |variant, intra, initial| {
        Box::new(LocalSearch::new(variant, intra, initial, k)) as Box<dyn Algorithm>
    };
    use InitialSolutionType::{GreedyCycle as GreedyStart, Random};
    use IntraNeighborhood::{TwoEdges, TwoNodes};
    use SearchVariant::{Greedy, Steepest};

    let algorithm: Box<dyn Algorithm> = match id {
        AlgorithmId::RandomSearch => Box::new(RandomSearch::new(k)),
        AlgorithmId::NearestNeighbor => Box::new(NearestNeighbor::new(k)),
        AlgorithmId::GreedyCycle => Box::new(GreedyCycle::new(k)),
        AlgorithmId::Regret2 => Box::new(RegretCycle::new(k)),
        AlgorithmId::Regret2Weighted => Box::new(WeightedRegretCycle::with_default_weights(k)),
        AlgorithmId::LsSteepest2nRandom => ls(Steepest, TwoNodes, Random),
        AlgorithmId::LsSteepest2eRandom => ls(Steepest, TwoEdges, Random),
        AlgorithmId::LsGreedy2nRandom => ls(Greedy, TwoNodes, Random),
        AlgorithmId::LsGreedy2eRandom => ls(Greedy, TwoEdges, Random),
        AlgorithmId::LsSteepest2nGreedyStart => ls(Steepest, TwoNodes, GreedyStart),
        AlgorithmId::LsSteepest2eGreedyStart => ls(Steepest, TwoEdges, GreedyStart),
        AlgorithmId::LsGreedy2nGreedyStart => ls(Greedy, TwoNodes, GreedyStart),
        AlgorithmId::LsGreedy2eGreedyStart => ls(Greedy, TwoEdges, GreedyStart),
        AlgorithmId::CandidateLs => Box::new(CandidateLocalSearch::new(Random, k)),
        AlgorithmId::MoveCacheLs => Box::new(MoveCacheLocalSearch::new(Random, k)),
        AlgorithmId::Msls => Box::new(SearchDriver::msls(args.num_iterations, k)),
        AlgorithmId::Ils => {
            let mut driver = SearchDriver::ils(time_limit, args.perturbation_strength, k);
            if args.accept_improving_only {
                driver = driver.with_acceptance(AcceptanceRule::AcceptImproving);
            }
            Box::new(driver)
        }
        AlgorithmId::Lsns => Box::new(SearchDriver::lsns(time_limit, true, k)),
        AlgorithmId::LsnsNoInner => Box::new(SearchDriver::lsns(time_limit, false, k)),
    };
    Ok(algorithm)
}
