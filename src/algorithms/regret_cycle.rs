use crate::algorithm::{Algorithm, ProgressCallback};
use crate::algorithms::greedy_cycle::insertion_cost;
use crate::instance::Instance;
use crate::solution::Solution;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

/// Best and second-best insertion of `node` into the cycle: the minimum
/// insertion cost, every position attaining it, and the second-lowest cost.
/// With a single possible position the second-best equals the best, so the
/// regret is zero.
fn best_two_insertions(
    solution: &Solution,
    instance: &Instance,
    node: usize,
) -> (i32, Vec<usize>, i32) {
    let positions = solution.len().max(1);
    let mut best_cost = i32::MAX;
    let mut best_positions = Vec::new();
    let mut second_cost = i32::MAX;

    for pos in 0..positions {
        let cost = insertion_cost(solution, instance, node, pos);
        if cost < best_cost {
            second_cost = best_cost;
            best_cost = cost;
            best_positions.clear();
            best_positions.push(pos);
        } else if cost == best_cost {
            best_positions.push(pos);
            second_cost = second_cost.min(cost);
        } else {
            second_cost = second_cost.min(cost);
        }
    }

    if second_cost == i32::MAX {
        second_cost = best_cost;
    }
    (best_cost, best_positions, second_cost)
}

fn select_and_insert(
    solution: &mut Solution,
    instance: &Instance,
    rng: &mut dyn RngCore,
    regret_weight: f64,
    greedy_weight: f64,
) {
    let mut best_score = f64::NEG_INFINITY;
    let mut best: Vec<(usize, Vec<usize>)> = Vec::new();

    for node in 0..instance.size() {
        if solution.contains(node) {
            continue;
        }
        let (best_cost, positions, second_cost) = best_two_insertions(solution, instance, node);
        let regret = (second_cost - best_cost) as f64;
        let score = regret_weight * regret - greedy_weight * best_cost as f64;
        if score > best_score {
            best_score = score;
            best.clear();
            best.push((node, positions));
        } else if score == best_score {
            best.push((node, positions));
        }
    }

    if let Some((node, positions)) = best.choose(&mut *rng) {
        let pos = *positions.choose(&mut *rng).unwrap_or(&0);
        if solution.is_empty() {
            solution.add(*node);
        } else {
            solution.insert_at(pos, *node);
        }
    }
}

/// 2-regret cycle construction: repeatedly inserts the node whose second-best
/// insertion would hurt the most.
pub struct RegretCycle {
    select_count: usize,
}

impl RegretCycle {
    pub fn new(select_count: usize) -> Self {
        Self { select_count }
    }
}

impl Algorithm for RegretCycle {
    fn name(&self) -> &str {
        "2-Regret Cycle"
    }

    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        _progress_callback: ProgressCallback,
    ) -> Solution {
        let mut solution = Solution::empty(instance.size());
        solution.add(rng.random_range(0..instance.size()));
        while solution.len() < self.select_count {
            select_and_insert(&mut solution, instance, rng, 1.0, 0.0);
        }
        solution
    }
}

/// Weighted variant: `score = w1 * regret - w2 * best_insertion_cost`.
pub struct WeightedRegretCycle {
    select_count: usize,
    regret_weight: f64,
    greedy_weight: f64,
}

impl WeightedRegretCycle {
    pub fn new(select_count: usize, regret_weight: f64, greedy_weight: f64) -> Self {
        Self {
            select_count,
            regret_weight,
            greedy_weight,
        }
    }

    pub fn with_default_weights(select_count: usize) -> Self {
        Self::new(select_count, 1.0, 1.0)
    }
}

impl Algorithm for WeightedRegretCycle {
    fn name(&self) -> &str {
        "Weighted 2-Regret Cycle"
    }

    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        _progress_callback: ProgressCallback,
    ) -> Solution {
        let mut solution = Solution::empty(instance.size());
        solution.add(rng.random_range(0..instance.size()));
        while solution.len() < self.select_count {
            select_and_insert(
                &mut solution,
                instance,
                rng,
                self.regret_weight,
                self.greedy_weight,
            );
        }
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
            vec![2; n],
        )
    }

    #[test]
    fn single_position_means_zero_regret() {
        let instance = grid(4);
        let solution = Solution::new(vec![0], 4);
        let (best, positions, second) = best_two_insertions(&solution, &instance, 1);
        assert_eq!(best, second);
        assert_eq!(positions, vec![0]);
    }

    #[test]
    fn regret_variants_build_valid_cycles() {
        let instance = grid(12);
        let mut rng = StdRng::seed_from_u64(11);
        let mut noop = |_: String| {};

        let regret = RegretCycle::new(6);
        let solution = regret.solve_with_feedback(&instance, &mut rng, &mut noop);
        assert!(solution.is_valid(&instance, 6));

        let weighted = WeightedRegretCycle::with_default_weights(6);
        let solution = weighted.solve_with_feedback(&instance, &mut rng, &mut noop);
        assert!(solution.is_valid(&instance, 6));
    }

    #[test]
    fn regret_prefers_constrained_nodes() {
        // Node 3 sits far from the 0-1 edge on one side only, so its best
        // and second-best insertions differ sharply, while node 2 is
        // indifferent.
        let instance = Instance::from_parts(
            "asym".to_string(),
            vec![(0, 0), (10, 0), (5, 1), (0, 10)],
            vec![0; 4],
        );
        let mut solution = Solution::new(vec![0, 1, 2], 4);
        let (best, _, second) = best_two_insertions(&solution, &instance, 3);
        assert!(second > best);
        let mut rng = StdRng::seed_from_u64(1);
        select_and_insert(&mut solution, &instance, &mut rng, 1.0, 0.0);
        assert_eq!(solution.len(), 4);
        assert!(solution.contains(3));
    }
}
