use crate::algorithm::{Algorithm, ProgressCallback};
use crate::instance::Instance;
use crate::solution::Solution;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

/// Cost of inserting `node` before cycle position `pos`:
/// the two new edges minus the removed edge, plus the service cost.
pub(crate) fn insertion_cost(
    solution: &Solution,
    instance: &Instance,
    node: usize,
    pos: usize,
) -> i32 {
    match solution.len() {
        0 => instance.cost(node),
        1 => 2 * instance.distance(solution.node_at(0), node) + instance.cost(node),
        _ => {
            let next = solution.node_at(pos);
            let prev = solution.node_at(solution.prev_index(pos));
            instance.distance(prev, node) + instance.distance(node, next)
                - instance.distance(prev, next)
                + instance.cost(node)
        }
    }
}

/// Grows the cycle by cheapest insertion until it covers `target_len` nodes.
/// Ties between equal-cost (node, position) pairs are broken uniformly at
/// random. Reused by the destroy-and-repair perturbation.
pub(crate) fn grow_cycle(
    solution: &mut Solution,
    instance: &Instance,
    target_len: usize,
    rng: &mut dyn RngCore,
) {
    while solution.len() < target_len {
        let positions = solution.len().max(1);
        let mut best_cost = i32::MAX;
        let mut best: Vec<(usize, usize)> = Vec::new();

        for node in 0..instance.size() {
            if solution.contains(node) {
                continue;
            }
            for pos in 0..positions {
                let cost = insertion_cost(solution, instance, node, pos);
                if cost < best_cost {
                    best_cost = cost;
                    best.clear();
                    best.push((node, pos));
                } else if cost == best_cost {
                    best.push((node, pos));
                }
            }
        }

        match best.choose(&mut *rng) {
            Some(&(node, pos)) => {
                if solution.is_empty() {
                    solution.add(node);
                } else {
                    solution.insert_at(pos, node);
                }
            }
            None => break,
        }
    }
}

/// Constructs a cycle from a random start node by repeated cheapest
/// insertion.
pub struct GreedyCycle {
    select_count: usize,
}

impl GreedyCycle {
    pub fn new(select_count: usize) -> Self {
        Self { select_count }
    }
}

impl Algorithm for GreedyCycle {
    fn name(&self) -> &str {
        "Greedy Cycle"
    }

    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        _progress_callback: ProgressCallback,
    ) -> Solution {
        let mut solution = Solution::empty(instance.size());
        solution.add(rng.random_range(0..instance.size()));
        grow_cycle(&mut solution, instance, self.select_count, rng);
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn grid(n: usize) -> Instance {
        Instance::from_parts(
            "grid".to_string(),
            (0..n).map(|i| ((i % 4) as i64 * 3, (i / 4) as i64 * 3)).collect(),
            vec![0; n],
        )
    }

    #[test]
    fn builds_valid_cycles() {
        let instance = grid(12);
        let algorithm = GreedyCycle::new(6);
        let mut rng = StdRng::seed_from_u64(5);
        let mut noop = |_: String| {};
        for _ in 0..5 {
            let solution = algorithm.solve_with_feedback(&instance, &mut rng, &mut noop);
            assert!(solution.is_valid(&instance, 6));
        }
    }

    #[test]
    fn repair_restores_partial_cycles() {
        let instance = grid(12);
        let mut rng = StdRng::seed_from_u64(9);
        let mut solution = Solution::new(vec![0, 1, 5, 4], 12);
        grow_cycle(&mut solution, &instance, 6, &mut rng);
        assert!(solution.is_valid(&instance, 6));
    }

    #[test]
    fn insertion_cost_accounts_for_replaced_edge() {
        let instance = Instance::from_parts(
            "line".to_string(),
            vec![(0, 0), (10, 0), (5, 0)],
            vec![7, 7, 7],
        );
        let solution = Solution::new(vec![0, 1], 3);
        // Inserting node 2 between 0 and 1: 5 + 5 - 10 + 7.
        assert_eq!(insertion_cost(&solution, &instance, 2, 1), 7);
    }
}
