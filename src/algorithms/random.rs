use crate::algorithm::{Algorithm, ProgressCallback};
use crate::instance::Instance;
use crate::solution::Solution;
use rand::RngCore;
use rand::seq::SliceRandom;

/// Uniform random subset of `select_count` nodes in random order.
pub fn generate_random_solution(
    instance: &Instance,
    select_count: usize,
    rng: &mut dyn RngCore,
) -> Solution {
    let mut nodes: Vec<usize> = (0..instance.size()).collect();
    nodes.shuffle(rng);
    nodes.truncate(select_count);
    Solution::new(nodes, instance.size())
}

pub struct RandomSearch {
    select_count: usize,
}

impl RandomSearch {
    pub fn new(select_count: usize) -> Self {
        Self { select_count }
    }
}

impl Algorithm for RandomSearch {
    fn name(&self) -> &str {
        "Random Search"
    }

    fn solve_with_feedback(
        &self,
        instance: &Instance,
        rng: &mut dyn RngCore,
        _progress_callback: ProgressCallback,
    ) -> Solution {
        generate_random_solution(instance, self.select_count, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn produces_valid_subsets() {
        let instance = Instance::from_parts(
            "grid".to_string(),
            (0..10).map(|i| (i, 0)).collect(),
            vec![0; 10],
        );
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let solution = generate_random_solution(&instance, 5, &mut rng);
            assert!(solution.is_valid(&instance, 5));
        }
    }
}
