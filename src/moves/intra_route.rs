use crate::instance::Instance;
use crate::moves::types::{EvaluatedMove, Move};
use crate::solution::Solution;

/// Calculates the cost delta for swapping the nodes at positions `pos1` and
/// `pos2` within the cycle.
///
/// Adjacent positions (including the seam pair 0, K-1) exchange three edges;
/// non-adjacent positions exchange four. Node costs are unaffected.
///
/// Returns `None` if the move is invalid (equal or out-of-range positions,
/// or fewer than three nodes, where a swap cannot change the cost).
pub fn evaluate_intra_route_node_exchange(
    solution: &Solution,
    instance: &Instance,
    pos1: usize,
    pos2: usize,
) -> Option<EvaluatedMove> {
    let n = solution.len();
    if n < 3 || pos1 == pos2 || pos1 >= n || pos2 >= n {
        return None;
    }

    let (pos1, pos2) = (pos1.min(pos2), pos1.max(pos2));

    let v1 = solution.node_at(pos1);
    let v2 = solution.node_at(pos2);
    let prev1 = solution.node_at(solution.prev_index(pos1));
    let next1 = solution.node_at(solution.next_index(pos1));
    let prev2 = solution.node_at(solution.prev_index(pos2));
    let next2 = solution.node_at(solution.next_index(pos2));

    let delta = if solution.are_consecutive(pos1, pos2) {
        if solution.next_index(pos1) == pos2 {
            // ..., prev1, v1, v2, next2, ...  becomes  ..., prev1, v2, v1, next2, ...
            let removed = instance.distance(prev1, v1)
                + instance.distance(v1, v2)
                + instance.distance(v2, next2);
            let added = instance.distance(prev1, v2)
                + instance.distance(v2, v1)
                + instance.distance(v1, next2);
            added - removed
        } else {
            // The seam pair: v1, next1, ..., prev2, v2 becomes
            // v2, next1, ..., prev2, v1 with the closing edge between them.
            let removed = instance.distance(v2, v1)
                + instance.distance(v1, next1)
                + instance.distance(prev2, v2);
            let added = instance.distance(v1, v2)
                + instance.distance(v2, next1)
                + instance.distance(prev2, v1);
            added - removed
        }
    } else {
        let removed = instance.distance(prev1, v1)
            + instance.distance(v1, next1)
            + instance.distance(prev2, v2)
            + instance.distance(v2, next2);
        let added = instance.distance(prev1, v2)
            + instance.distance(v2, next1)
            + instance.distance(prev2, v1)
            + instance.distance(v1, next2);
        added - removed
    };

    Some(EvaluatedMove {
        move_type: Move::IntraRouteNodeExchange { pos1, pos2 },
        delta,
    })
}

/// Calculates the cost delta for exchanging the edges leaving positions
/// `pos1` and `pos2` (2-opt). With (a, b) and (c, d) the endpoints of those
/// edges, the reconnection replaces them by (a, c) and (b, d).
///
/// Returns `None` if the positions are equal or cycle-adjacent, or the cycle
/// has fewer than three nodes.
pub fn evaluate_intra_route_edge_exchange(
    solution: &Solution,
    instance: &Instance,
    pos1: usize,
    pos2: usize,
) -> Option<EvaluatedMove> {
    let n = solution.len();
    if n < 3
        || pos1 >= n
        || pos2 >= n
        || pos1 == pos2
        || solution.next_index(pos1) == pos2
        || solution.next_index(pos2) == pos1
    {
        return None;
    }

    let a = solution.node_at(pos1);
    let b = solution.node_at(solution.next_index(pos1));
    let c = solution.node_at(pos2);
    let d = solution.node_at(solution.next_index(pos2));

    let delta = instance.distance(a, c) + instance.distance(b, d)
        - instance.distance(a, b)
        - instance.distance(c, d);

    Some(EvaluatedMove {
        move_type: Move::IntraRouteEdgeExchange { pos1, pos2 },
        delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn random_instance(rng: &mut StdRng, n: usize, max_cost: i32) -> Instance {
        let coordinates = (0..n)
            .map(|_| (rng.random_range(0..=100), rng.random_range(0..=100)))
            .collect();
        let costs = (0..n).map(|_| rng.random_range(0..=max_cost)).collect();
        Instance::from_parts("random".to_string(), coordinates, costs)
    }

    fn random_solution(rng: &mut StdRng, n: usize, k: usize) -> Solution {
        let mut nodes: Vec<usize> = (0..n).collect();
        nodes.shuffle(rng);
        nodes.truncate(k);
        Solution::new(nodes, n)
    }

    #[test]
    fn node_exchange_delta_matches_reevaluation() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let instance = random_instance(&mut rng, 6, 0);
            let solution = random_solution(&mut rng, 6, 3);
            let before = solution.evaluate(&instance);

            for pos1 in 0..3 {
                for pos2 in pos1 + 1..3 {
                    let evaluated =
                        evaluate_intra_route_node_exchange(&solution, &instance, pos1, pos2)
                            .unwrap();
                    let mut applied = solution.clone();
                    evaluated.move_type.apply(&mut applied);
                    assert_eq!(
                        applied.evaluate(&instance),
                        before + evaluated.delta,
                        "seed {} positions ({}, {})",
                        seed,
                        pos1,
                        pos2
                    );
                }
            }
        }
    }

    #[test]
    fn edge_exchange_delta_matches_reevaluation() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let instance = random_instance(&mut rng, 10, 50);
            let solution = random_solution(&mut rng, 10, 5);
            let before = solution.evaluate(&instance);

            for pos1 in 0..5 {
                for pos2 in 0..5 {
                    if let Some(evaluated) =
                        evaluate_intra_route_edge_exchange(&solution, &instance, pos1, pos2)
                    {
                        let mut applied = solution.clone();
                        evaluated.move_type.apply(&mut applied);
                        assert_eq!(
                            applied.evaluate(&instance),
                            before + evaluated.delta,
                            "seed {} edges ({}, {})",
                            seed,
                            pos1,
                            pos2
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn inter_exchange_delta_matches_reevaluation() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let instance = random_instance(&mut rng, 6, 30);
            let solution = random_solution(&mut rng, 6, 3);
            let before = solution.evaluate(&instance);

            for pos in 0..3 {
                for node in 0..6 {
                    if let Some(evaluated) = crate::moves::inter_route::
                        evaluate_inter_route_exchange(&solution, &instance, pos, node)
                    {
                        let mut applied = solution.clone();
                        evaluated.move_type.apply(&mut applied);
                        assert_eq!(
                            applied.evaluate(&instance),
                            before + evaluated.delta,
                            "seed {} pos {} node {}",
                            seed,
                            pos,
                            node
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn adjacent_pairs_are_rejected_for_edges() {
        let instance = random_instance(&mut StdRng::seed_from_u64(1), 6, 0);
        let solution = random_solution(&mut StdRng::seed_from_u64(2), 6, 4);
        assert!(evaluate_intra_route_edge_exchange(&solution, &instance, 0, 1).is_none());
        assert!(evaluate_intra_route_edge_exchange(&solution, &instance, 0, 3).is_none());
        assert!(evaluate_intra_route_edge_exchange(&solution, &instance, 2, 2).is_none());
        assert!(evaluate_intra_route_edge_exchange(&solution, &instance, 0, 2).is_some());
    }
}
