use crate::algorithm::{Algorithm, ProgressCallback};
use crate::instance::Instance;
use crate::solution::Solution;
use rand::{Rng, RngCore};

/// Grows a path from a random start node, always appending the unselected
/// node that minimizes `dist(last, v) + cost(v)`.
pub struct NearestNeighbor {
    select_count: usize,
}

impl NearestNeighbor {
    pub fn new(select_count: usize) -> Self {
        Self { select_count }
    }

    fn most_beneficial_node(
        &self,
        from: usize,
        solution: &Solution,
        instance: &Instance,
    ) -> Option<usize> {
        (0..instance.size())
            .filter(|&v| !solution.contains(v))
            .min_by_key(|&v| instance.distance(from, v) + instance.cost(v))
    }
}

impl Algorithm for NearestNeighbor {
    fn name(&self) -> &str {
        "Nearest Neighbor"
    }

    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        _progress_callback: ProgressCallback,
    ) -> Solution {
        let mut solution = Solution::empty(instance.size());
        let start = rng.random_range(0..instance.size());
        solution.add(start);

        while solution.len() < self.select_count {
            let last = solution.node_at(solution.len() - 1);
            match self.most_beneficial_node(last, &solution, instance) {
                Some(next) => solution.add(next),
                None => break,
            }
        }
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn covers_exactly_the_requested_count() {
        let instance = Instance::from_parts(
            "grid".to_string(),
            (0..8).map(|i| (i * 2, i % 3)).collect(),
            vec![1; 8],
        );
        let algorithm = NearestNeighbor::new(4);
        let mut rng = StdRng::seed_from_u64(3);
        let mut noop = |_: String| {};
        let solution = algorithm.solve_with_feedback(&instance, &mut rng, &mut noop);
        assert!(solution.is_valid(&instance, 4));
    }

    #[test]
    fn prefers_cheap_nodes_over_near_ones() {
        // Node 1 is closest to node 0 but carries a prohibitive cost.
        let instance = Instance::from_parts(
            "costly".to_string(),
            vec![(0, 0), (1, 0), (3, 0), (50, 50)],
            vec![0, 1000, 0, 0],
        );
        let algorithm = NearestNeighbor::new(2);
        let solution = Solution::new(vec![0], 4);
        assert_eq!(
            algorithm.most_beneficial_node(0, &solution, &instance),
            Some(2)
        );
    }
}
