use crate::algorithm::{Algorithm, ProgressCallback};
use crate::algorithms::local_search::base::{
    InitialSolutionType, IntraNeighborhood, LocalSearch, SearchVariant, destroy_and_repair,
    perturb,
};
use crate::algorithms::random::generate_random_solution;
use crate::instance::Instance;
use crate::solution::Solution;
use rand::RngCore;
use std::time::{Duration, Instant};

/// How a driver obtains the next starting point after a converged descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartStrategy {
    /// Fresh uniform random solution (multi-start).
    RandomRestart,
    /// Random two-edge exchanges applied to the working solution (iterated).
    Perturbation { strength: usize },
    /// Segment removal plus greedy-cycle repair (large-scale neighborhood).
    DestroyRepair { inner_search: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    Iterations(usize),
    TimeLimit(Duration),
}

/// Whether a worse local optimum may replace the working solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceRule {
    /// Keep working from the new local optimum regardless of its cost.
    AcceptAlways,
    /// Fall back to the global best when the new optimum is not better.
    AcceptImproving,
}

/// Outer loop shared by the multi-start, iterated and large-scale
/// neighborhood drivers: the three differ only in how the next start is
/// produced and when to stop. The globally best solution seen is returned
/// and its cost never increases across iterations.
pub struct SearchDriver {
    restart: RestartStrategy,
    stop: StopRule,
    acceptance: AcceptanceRule,
    core: LocalSearch,
    select_count: usize,
    name_str: String,
}

impl SearchDriver {
    fn new(
        restart: RestartStrategy,
        stop: StopRule,
        acceptance: AcceptanceRule,
        select_count: usize,
        name_str: String,
    ) -> Self {
        let core = LocalSearch::new(
            SearchVariant::Steepest,
            IntraNeighborhood::TwoEdges,
            InitialSolutionType::Random,
            select_count,
        );
        Self {
            restart,
            stop,
            acceptance,
            core,
            select_count,
            name_str,
        }
    }

    /// Multi-start local search: a fixed number of independent descents from
    /// random solutions.
    pub fn msls(iterations: usize, select_count: usize) -> Self {
        Self::new(
            RestartStrategy::RandomRestart,
            StopRule::Iterations(iterations),
            AcceptanceRule::AcceptAlways,
            select_count,
            format!("MSLS ({} starts)", iterations),
        )
    }

    /// Iterated local search: perturb the working solution and re-descend
    /// until the wall-clock budget runs out.
    pub fn ils(time_limit: Duration, strength: usize, select_count: usize) -> Self {
        Self::new(
            RestartStrategy::Perturbation { strength },
            StopRule::TimeLimit(time_limit),
            AcceptanceRule::AcceptAlways,
            select_count,
            format!("ILS (strength {})", strength),
        )
    }

    /// Large-scale neighborhood search: destroy-and-repair restarts,
    /// optionally polished by the inner local search.
    pub fn lsns(time_limit: Duration, inner_search: bool, select_count: usize) -> Self {
        let name = if inner_search {
            "LSNS".to_string()
        } else {
            "LSNS (no inner search)".to_string()
        };
        Self::new(
            RestartStrategy::DestroyRepair { inner_search },
            StopRule::TimeLimit(time_limit),
            AcceptanceRule::AcceptAlways,
            select_count,
            name,
        )
    }

    pub fn with_acceptance(mut self, acceptance: AcceptanceRule) -> Self {
        self.acceptance = acceptance;
        self
    }

    fn should_continue(&self, iterations: usize, started: Instant) -> bool {
        match self.stop {
            StopRule::Iterations(limit) => iterations < limit,
            StopRule::TimeLimit(limit) => started.elapsed() < limit,
        }
    }

    /// Folds a freshly converged local optimum into the incumbents: a new
    /// global best is recorded, and under `AcceptImproving` anything that
    /// fails to beat the global best reverts the working solution to it, so
    /// the next perturbation always starts from the best-so-far.
    fn update_incumbents(
        &self,
        current: &mut Solution,
        current_eval: &mut i32,
        best: &mut Solution,
        best_eval: &mut i32,
    ) {
        if *current_eval < *best_eval {
            *best = current.clone();
            *best_eval = *current_eval;
        } else if self.acceptance == AcceptanceRule::AcceptImproving {
            *current = best.clone();
            *current_eval = *best_eval;
        }
    }
}

impl Algorithm for SearchDriver {
    fn name(&self) -> &str {
        &self.name_str
    }

    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        progress_callback: ProgressCallback,
    ) -> Solution {
        let started = Instant::now();

        let mut current = generate_random_solution(instance, self.select_count, rng);
        let mut current_eval = self.core.run(instance, &mut current, rng);
        let mut best = current.clone();
        let mut best_eval = current_eval;
        let mut iterations = 1usize;

        while self.should_continue(iterations, started) {
            iterations += 1;

            match self.restart {
                RestartStrategy::RandomRestart => {
                    current = generate_random_solution(instance, self.select_count, rng);
                    current_eval = self.core.run(instance, &mut current, rng);
                }
                RestartStrategy::Perturbation { strength } => {
                    perturb(&mut current, instance, strength, rng);
                    current_eval = self.core.run(instance, &mut current, rng);
                }
                RestartStrategy::DestroyRepair { inner_search } => {
                    current_eval =
                        destroy_and_repair(&mut current, instance, self.select_count, rng);
                    if inner_search {
                        current_eval = self.core.run(instance, &mut current, rng);
                    }
                }
            }

            self.update_incumbents(&mut current, &mut current_eval, &mut best, &mut best_eval);

            if iterations % 10 == 0 {
                progress_callback(format!("[Iter {}] Best: {}", iterations, best_eval));
            }
        }

        log::info!(
            "{} finished after {} outer iterations, best {}",
            self.name_str,
            iterations,
            best_eval
        );
        progress_callback(format!(
            "[Finished] {} iterations, best {}",
            iterations, best_eval
        ));
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_instance(rng: &mut StdRng, n: usize) -> Instance {
        let coordinates = (0..n)
            .map(|_| (rng.random_range(0..=100), rng.random_range(0..=100)))
            .collect();
        let costs = (0..n).map(|_| rng.random_range(0..=50)).collect();
        Instance::from_parts("random".to_string(), coordinates, costs)
    }

    #[test]
    fn msls_is_at_least_as_good_as_its_individual_starts() {
        let mut rng = StdRng::seed_from_u64(42);
        let instance = random_instance(&mut rng, 16);

        let driver = SearchDriver::msls(8, 8);
        let mut driver_rng = StdRng::seed_from_u64(7);
        let mut noop = |_: String| {};
        let best = driver.solve_with_feedback(&instance, &mut driver_rng, &mut noop);
        let best_eval = best.evaluate(&instance);
        assert!(best.is_valid(&instance, 8));

        // Replay the same seed: every individual descent must be >= the
        // driver's reported best.
        let core = LocalSearch::new(
            SearchVariant::Steepest,
            IntraNeighborhood::TwoEdges,
            InitialSolutionType::Random,
            8,
        );
        let mut replay_rng = StdRng::seed_from_u64(7);
        for _ in 0..8 {
            let mut solution = generate_random_solution(&instance, 8, &mut replay_rng);
            let eval = core.run(&instance, &mut solution, &mut replay_rng);
            assert!(best_eval <= eval);
        }
    }

    #[test]
    fn ils_returns_a_valid_solution_within_budget() {
        let mut rng = StdRng::seed_from_u64(3);
        let instance = random_instance(&mut rng, 16);
        let driver = SearchDriver::ils(Duration::from_millis(50), 4, 8);
        let mut noop = |_: String| {};
        let best = driver.solve_with_feedback(&instance, &mut rng, &mut noop);
        assert!(best.is_valid(&instance, 8));
    }

    #[test]
    fn lsns_variants_return_valid_solutions() {
        let mut rng = StdRng::seed_from_u64(4);
        let instance = random_instance(&mut rng, 16);
        for inner in [true, false] {
            let driver = SearchDriver::lsns(Duration::from_millis(50), inner, 8);
            let mut noop = |_: String| {};
            let best = driver.solve_with_feedback(&instance, &mut rng, &mut noop);
            assert!(best.is_valid(&instance, 8));
        }
    }

    #[test]
    fn improvement_only_acceptance_reverts_to_the_global_best() {
        let driver = SearchDriver::ils(Duration::from_millis(50), 4, 5)
            .with_acceptance(AcceptanceRule::AcceptImproving);

        let mut best = Solution::new(vec![0, 1, 2, 3, 4], 10);
        let mut best_eval = 100;

        // A local optimum that fails to beat the global best must not
        // survive as the working solution, even if it improved on the
        // iteration it came from: the next perturbation starts from `best`.
        let mut current = Solution::new(vec![5, 6, 7, 8, 9], 10);
        let mut current_eval = 120;
        driver.update_incumbents(&mut current, &mut current_eval, &mut best, &mut best_eval);
        assert_eq!(current_eval, best_eval);
        assert_eq!(current.nodes(), best.nodes());
        assert_eq!(best_eval, 100);

        // A genuine improvement replaces the global best instead.
        let mut improved = Solution::new(vec![0, 2, 4, 6, 8], 10);
        let mut improved_eval = 60;
        driver.update_incumbents(&mut improved, &mut improved_eval, &mut best, &mut best_eval);
        assert_eq!(best_eval, 60);
        assert_eq!(best.nodes(), improved.nodes());
        assert_eq!(improved_eval, 60);
    }
}
