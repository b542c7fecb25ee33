use crate::algorithm::{Algorithm, ProgressCallback};
use crate::algorithms::greedy_cycle;
use crate::algorithms::random::generate_random_solution;
use crate::instance::Instance;
use crate::moves::inter_route::evaluate_inter_route_exchange;
use crate::moves::intra_route::{
    evaluate_intra_route_edge_exchange, evaluate_intra_route_node_exchange,
};
use crate::moves::types::EvaluatedMove;
use crate::solution::Solution;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchVariant {
    /// Apply the single most improving move of the whole neighborhood.
    Steepest,
    /// Apply the first improving move found in a randomized enumeration.
    Greedy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntraNeighborhood {
    TwoNodes,
    TwoEdges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSolutionType {
    Random,
    GreedyCycle,
}

/// Full-neighborhood local search over the inter-route swap plus one
/// intra-route neighborhood.
pub struct LocalSearch {
    variant: SearchVariant,
    intra: IntraNeighborhood,
    initial_solution_type: InitialSolutionType,
    select_count: usize,
    name_str: String,
}

impl LocalSearch {
    pub fn new(
        variant: SearchVariant,
        intra: IntraNeighborhood,
        initial_solution_type: InitialSolutionType,
        select_count: usize,
    ) -> Self {
        let name_str = format!(
            "Local Search ({:?}, {:?}, Init: {:?})",
            variant, intra, initial_solution_type
        );
        Self {
            variant,
            intra,
            initial_solution_type,
            select_count,
            name_str,
        }
    }

    pub(crate) fn initial_solution(
        initial: InitialSolutionType,
        instance: &Instance,
        select_count: usize,
        rng: &mut dyn RngCore,
    ) -> Solution {
        match initial {
            InitialSolutionType::Random => generate_random_solution(instance, select_count, rng),
            InitialSolutionType::GreedyCycle => {
                let mut solution = Solution::empty(instance.size());
                solution.add(rng.random_range(0..instance.size()));
                greedy_cycle::grow_cycle(&mut solution, instance, select_count, rng);
                solution
            }
        }
    }

    /// Descends to a local optimum, mutating the solution in place. Returns
    /// the final evaluation, which is maintained incrementally.
    pub fn run(
        &self,
        instance: &Instance,
        solution: &mut Solution,
        rng: &mut dyn RngCore,
    ) -> i32 {
        let mut evaluation = solution.evaluate(instance);
        loop {
            let found = match self.variant {
                SearchVariant::Steepest => self.best_improving_move(instance, solution),
                SearchVariant::Greedy => self.first_improving_move(instance, solution, rng),
            };
            match found {
                Some(evaluated) => {
                    evaluated.move_type.apply(solution);
                    evaluation += evaluated.delta;
                    debug_assert_eq!(evaluation, solution.evaluate(instance));
                }
                None => break,
            }
        }
        evaluation
    }

    /// The most negative-delta move across both enabled neighborhoods, or
    /// `None` at a local optimum. Ties are broken by scan order.
    pub(crate) fn best_improving_move(
        &self,
        instance: &Instance,
        solution: &Solution,
    ) -> Option<EvaluatedMove> {
        let mut best: Option<EvaluatedMove> = None;
        let mut consider = |candidate: EvaluatedMove| {
            if candidate.delta < best.map_or(0, |b| b.delta) {
                best = Some(candidate);
            }
        };

        let k = solution.len();
        for pos in 0..k {
            for node in 0..instance.size() {
                if !solution.contains(node) {
                    if let Some(m) = evaluate_inter_route_exchange(solution, instance, pos, node)
                    {
                        consider(m);
                    }
                }
            }
        }

        for pos1 in 0..k {
            for pos2 in pos1 + 1..k {
                let evaluated = match self.intra {
                    IntraNeighborhood::TwoNodes => {
                        evaluate_intra_route_node_exchange(solution, instance, pos1, pos2)
                    }
                    IntraNeighborhood::TwoEdges => {
                        evaluate_intra_route_edge_exchange(solution, instance, pos1, pos2)
                    }
                };
                if let Some(m) = evaluated {
                    consider(m);
                }
            }
        }
        best
    }

    /// The first improving move of a freshly randomized enumeration: the
    /// neighborhood order is decided by a coin flip and the position
    /// iterators are shuffled anew each pass.
    fn first_improving_move(
        &self,
        instance: &Instance,
        solution: &Solution,
        rng: &mut dyn RngCore,
    ) -> Option<EvaluatedMove> {
        let k = solution.len();
        let mut cycle_order: Vec<usize> = (0..k).collect();
        let mut second_order: Vec<usize> = (0..k).collect();
        let mut node_order: Vec<usize> = (0..instance.size()).collect();
        cycle_order.shuffle(&mut *rng);
        second_order.shuffle(&mut *rng);
        node_order.shuffle(&mut *rng);

        let inter_first = rng.random_bool(0.5);
        if inter_first {
            self.first_inter(instance, solution, &cycle_order, &node_order)
                .or_else(|| self.first_intra(instance, solution, &cycle_order, &second_order))
        } else {
            self.first_intra(instance, solution, &cycle_order, &second_order)
                .or_else(|| self.first_inter(instance, solution, &cycle_order, &node_order))
        }
    }

    fn first_inter(
        &self,
        instance: &Instance,
        solution: &Solution,
        cycle_order: &[usize],
        node_order: &[usize],
    ) -> Option<EvaluatedMove> {
        for &node in node_order {
            if solution.contains(node) {
                continue;
            }
            for &pos in cycle_order {
                if let Some(m) = evaluate_inter_route_exchange(solution, instance, pos, node) {
                    if m.delta < 0 {
                        return Some(m);
                    }
                }
            }
        }
        None
    }

    fn first_intra(
        &self,
        instance: &Instance,
        solution: &Solution,
        cycle_order: &[usize],
        second_order: &[usize],
    ) -> Option<EvaluatedMove> {
        for &pos1 in cycle_order {
            for &pos2 in second_order {
                let evaluated = match self.intra {
                    IntraNeighborhood::TwoNodes => {
                        evaluate_intra_route_node_exchange(solution, instance, pos1, pos2)
                    }
                    IntraNeighborhood::TwoEdges => {
                        evaluate_intra_route_edge_exchange(solution, instance, pos1, pos2)
                    }
                };
                if let Some(m) = evaluated {
                    if m.delta < 0 {
                        return Some(m);
                    }
                }
            }
        }
        None
    }
}

impl Algorithm for LocalSearch {
    fn name(&self) -> &str {
        &self.name_str
    }

    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        progress_callback: ProgressCallback,
    ) -> Solution {
        let mut solution = Self::initial_solution(
            self.initial_solution_type,
            instance,
            self.select_count,
            rng,
        );
        let evaluation = self.run(instance, &mut solution, rng);
        progress_callback(format!("[Finished] Local optimum: {}", evaluation));
        solution
    }
}

/// Applies `strength` random two-edge exchanges whose edge indices are
/// non-adjacent modulo the cycle length. Returns the total evaluation delta.
pub fn perturb(
    solution: &mut Solution,
    instance: &Instance,
    strength: usize,
    rng: &mut dyn RngCore,
) -> i32 {
    let k = solution.len();
    if k < 4 {
        return 0;
    }
    let mut total_delta = 0;
    for _ in 0..strength {
        loop {
            let edge1 = rng.random_range(0..k);
            let edge2 = rng.random_range(0..k);
            if let Some(evaluated) =
                evaluate_intra_route_edge_exchange(solution, instance, edge1, edge2)
            {
                evaluated.move_type.apply(solution);
                total_delta += evaluated.delta;
                break;
            }
        }
    }
    total_delta
}

/// Removes a few disjoint contiguous chains from the cycle and rebuilds it to
/// `target_len` nodes by cheapest insertion. Returns the recomputed
/// evaluation.
pub fn destroy_and_repair(
    solution: &mut Solution,
    instance: &Instance,
    target_len: usize,
    rng: &mut dyn RngCore,
) -> i32 {
    let segments = rng.random_range(2..=5);
    let length = target_len / (4 * segments);
    if length > 0 {
        for _ in 0..segments {
            if solution.len() <= length {
                break;
            }
            let start = rng.random_range(0..=solution.len() - length);
            solution.remove_segment(start, length);
        }
    }
    greedy_cycle::grow_cycle(solution, instance, target_len, rng);
    solution.evaluate(instance)
}
