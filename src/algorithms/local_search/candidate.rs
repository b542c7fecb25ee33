use crate::algorithm::{Algorithm, ProgressCallback};
use crate::algorithms::local_search::NodePositions;
use crate::algorithms::local_search::base::{InitialSolutionType, LocalSearch};
use crate::instance::Instance;
use crate::moves::inter_route::evaluate_inter_route_exchange;
use crate::moves::intra_route::evaluate_intra_route_edge_exchange;
use crate::moves::types::{EvaluatedMove, Move};
use crate::solution::Solution;
use rand::RngCore;

/// Steepest search restricted to moves that introduce an edge between a
/// covered node and one of its precomputed candidates.
///
/// For a candidate outside the cycle the two replacements of the node's
/// neighbors are evaluated; for a candidate inside, the two 2-opt moves that
/// create the edge in either orientation. Requires
/// `Instance::precompute_candidates`; with empty candidate lists every pass
/// finds nothing and the solution is left untouched.
pub struct CandidateLocalSearch {
    initial_solution_type: InitialSolutionType,
    select_count: usize,
    name_str: String,
}

impl CandidateLocalSearch {
    pub fn new(initial_solution_type: InitialSolutionType, select_count: usize) -> Self {
        let name_str = format!(
            "Local Search (Candidate, Init: {:?})",
            initial_solution_type
        );
        Self {
            initial_solution_type,
            select_count,
            name_str,
        }
    }

    /// Descends to a local optimum of the candidate neighborhood. Returns the
    /// final evaluation.
    pub fn run(&self, instance: &Instance, solution: &mut Solution) -> i32 {
        let mut evaluation = solution.evaluate(instance);
        let mut positions = NodePositions::new(solution, instance.size());

        while let Some(evaluated) = self.best_candidate_move(instance, solution, &positions) {
            match evaluated.move_type {
                Move::InterRouteExchange { pos, node } => {
                    let old_node = solution.node_at(pos);
                    evaluated.move_type.apply(solution);
                    positions.record_exchange(old_node, node, pos);
                }
                Move::IntraRouteEdgeExchange { pos1, pos2 } => {
                    evaluated.move_type.apply(solution);
                    positions.record_reversal(solution, pos1, pos2);
                }
                Move::IntraRouteNodeExchange { .. } => unreachable!(),
            }
            evaluation += evaluated.delta;
            debug_assert_eq!(evaluation, solution.evaluate(instance));
        }
        evaluation
    }

    fn best_candidate_move(
        &self,
        instance: &Instance,
        solution: &Solution,
        positions: &NodePositions,
    ) -> Option<EvaluatedMove> {
        let mut best: Option<EvaluatedMove> = None;
        let mut consider = |candidate: EvaluatedMove| {
            if candidate.delta < best.map_or(0, |b| b.delta) {
                best = Some(candidate);
            }
        };

        for pos in 0..solution.len() {
            let u = solution.node_at(pos);
            for &v in instance.candidates(u) {
                if solution.contains(v) {
                    // Two 2-opt moves create the edge (u, v): exchanging the
                    // edges leaving both positions, or the edges entering
                    // them.
                    let pos_v = positions.position(v);
                    debug_assert_eq!(solution.find_index(v), Some(pos_v));
                    let pairs = [
                        (pos, pos_v),
                        (solution.prev_index(pos), solution.prev_index(pos_v)),
                    ];
                    for (edge1, edge2) in pairs {
                        if let Some(m) =
                            evaluate_intra_route_edge_exchange(solution, instance, edge1, edge2)
                        {
                            consider(m);
                        }
                    }
                } else {
                    // Replacing either neighbor of u by v creates the edge
                    // (u, v).
                    for target in [solution.prev_index(pos), solution.next_index(pos)] {
                        if let Some(m) =
                            evaluate_inter_route_exchange(solution, instance, target, v)
                        {
                            consider(m);
                        }
                    }
                }
            }
        }
        best
    }
}

impl Algorithm for CandidateLocalSearch {
    fn name(&self) -> &str {
        &self.name_str
    }

    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        progress_callback: ProgressCallback,
    ) -> Solution {
        let mut solution = LocalSearch::initial_solution(
            self.initial_solution_type,
            instance,
            self.select_count,
            rng,
        );
        let evaluation = self.run(instance, &mut solution);
        progress_callback(format!("[Finished] Local optimum: {}", evaluation));
        solution
    }
}
