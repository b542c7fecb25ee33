use crate::algorithm::{Algorithm, ProgressCallback};
use crate::algorithms::local_search::NO_POSITION;
use crate::algorithms::local_search::base::{InitialSolutionType, LocalSearch};
use crate::instance::Instance;
use crate::moves::inter_route::evaluate_inter_route_exchange;
use crate::moves::intra_route::evaluate_intra_route_edge_exchange;
use crate::moves::types::Move;
use crate::solution::Solution;
use rand::RngCore;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A remembered improving move. Entries name the nodes involved, not their
/// positions, so a later cycle state can cheaply decide whether the move
/// still makes sense.
#[derive(Debug, Clone, Copy)]
enum CachedMove {
    /// 2-opt that removed edges (u1, u2) and (v1, v2).
    EdgeExchange {
        u1: usize,
        u2: usize,
        v1: usize,
        v2: usize,
    },
    /// Replacement of `node` (flanked by `prev` and `next`) with the outside
    /// `new_node`.
    NodeExchange {
        prev: usize,
        node: usize,
        next: usize,
        new_node: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    delta: i32,
    cached: CachedMove,
}

// Ordered by delta only, inverted so the binary heap pops the most improving
// entry first.
impl PartialEq for CacheEntry {
    fn eq(&self, other: &Self) -> bool {
        self.delta == other.delta
    }
}

impl Eq for CacheEntry {}

impl PartialOrd for CacheEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CacheEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.delta.cmp(&self.delta)
    }
}

enum Applicability {
    /// A named edge no longer exists; the delta is meaningless.
    Invalid,
    /// Both edges exist but with mixed orientations; retry later.
    Pending,
    /// Both edges exist consistently; the cached delta is still exact.
    Apply(Move),
}

/// Sentinel for nodes outside the cycle.
const NO_NODE: usize = usize::MAX;

/// Successor/predecessor maps plus a position lookup over the current cycle.
/// Nodes outside the cycle map to a sentinel.
struct CycleLinks {
    successor: Vec<usize>,
    predecessor: Vec<usize>,
    position: Vec<usize>,
}

impl CycleLinks {
    fn new(solution: &Solution, total_nodes: usize) -> Self {
        let mut links = Self {
            successor: vec![NO_NODE; total_nodes],
            predecessor: vec![NO_NODE; total_nodes],
            position: vec![NO_POSITION; total_nodes],
        };
        for (idx, &node) in solution.nodes().iter().enumerate() {
            let next = solution.node_at(solution.next_index(idx));
            links.successor[node] = next;
            links.predecessor[next] = node;
            links.position[node] = idx;
        }
        links
    }

    fn apply_node_exchange(&mut self, solution: &mut Solution, pos: usize, new_node: usize) {
        let old_node = solution.node_at(pos);
        solution.exchange_at(pos, new_node);
        self.successor[old_node] = NO_NODE;
        self.predecessor[old_node] = NO_NODE;
        self.position[old_node] = NO_POSITION;
        self.position[new_node] = pos;
        for idx in [solution.prev_index(pos), pos] {
            let a = solution.node_at(idx);
            let b = solution.node_at(solution.next_index(idx));
            self.successor[a] = b;
            self.predecessor[b] = a;
        }
    }

    fn apply_edge_exchange(&mut self, solution: &mut Solution, edge1: usize, edge2: usize) {
        let (first, second) = if edge1 <= edge2 {
            (edge1, edge2)
        } else {
            (edge2, edge1)
        };
        solution.exchange_edges(first, second);
        for idx in first..=second {
            let a = solution.node_at(idx);
            let b = solution.node_at(solution.next_index(idx));
            self.successor[a] = b;
            self.predecessor[b] = a;
            self.position[a] = idx;
        }
    }
}

/// Steepest search that keeps every improving move it has seen in a
/// priority-ordered cache and revalidates entries against the current cycle
/// instead of rescanning the whole neighborhood after each step.
///
/// Neighborhoods: inter-route swap and two-edge exchange.
pub struct MoveCacheLocalSearch {
    initial_solution_type: InitialSolutionType,
    select_count: usize,
    name_str: String,
}

impl MoveCacheLocalSearch {
    pub fn new(initial_solution_type: InitialSolutionType, select_count: usize) -> Self {
        let name_str = format!(
            "Local Search (MoveCache, Init: {:?})",
            initial_solution_type
        );
        Self {
            initial_solution_type,
            select_count,
            name_str,
        }
    }

    /// Descends to a local optimum of the inter + two-edge neighborhood.
    /// Returns the final evaluation, maintained from the cached deltas.
    pub fn run(&self, instance: &Instance, solution: &mut Solution) -> i32 {
        let mut evaluation = solution.evaluate(instance);
        let mut links = CycleLinks::new(solution, instance.size());
        let mut cache: BinaryHeap<CacheEntry> = BinaryHeap::new();
        let mut pending: Vec<CacheEntry> = Vec::new();

        let mut improved = true;
        while improved {
            improved = false;
            scan_improving_moves(instance, solution, &mut cache);

            while let Some(entry) = cache.pop() {
                match classify(&entry.cached, solution, &links) {
                    Applicability::Invalid => {}
                    Applicability::Pending => pending.push(entry),
                    Applicability::Apply(move_type) => {
                        match move_type {
                            Move::InterRouteExchange { pos, node } => {
                                links.apply_node_exchange(solution, pos, node);
                            }
                            Move::IntraRouteEdgeExchange { pos1, pos2 } => {
                                links.apply_edge_exchange(solution, pos1, pos2);
                            }
                            Move::IntraRouteNodeExchange { .. } => unreachable!(),
                        }
                        evaluation += entry.delta;
                        improved = true;
                        debug_assert_eq!(evaluation, solution.evaluate(instance));
                        // Mixed-orientation entries get another chance once
                        // the cycle has changed again.
                        for retry in pending.drain(..) {
                            cache.push(retry);
                        }
                    }
                }
            }
            for retry in pending.drain(..) {
                cache.push(retry);
            }
        }
        evaluation
    }
}

/// Full scan of the inter and two-edge neighborhoods; every improving move is
/// pushed with the node ids it relies on.
fn scan_improving_moves(
    instance: &Instance,
    solution: &Solution,
    cache: &mut BinaryHeap<CacheEntry>,
) {
    let k = solution.len();

    for pos in 0..k {
        for node in 0..instance.size() {
            if solution.contains(node) {
                continue;
            }
            if let Some(m) = evaluate_inter_route_exchange(solution, instance, pos, node) {
                if m.delta < 0 {
                    cache.push(CacheEntry {
                        delta: m.delta,
                        cached: CachedMove::NodeExchange {
                            prev: solution.node_at(solution.prev_index(pos)),
                            node: solution.node_at(pos),
                            next: solution.node_at(solution.next_index(pos)),
                            new_node: node,
                        },
                    });
                }
            }
        }
    }

    for pos1 in 0..k {
        for pos2 in pos1 + 1..k {
            if let Some(m) = evaluate_intra_route_edge_exchange(solution, instance, pos1, pos2) {
                if m.delta < 0 {
                    cache.push(CacheEntry {
                        delta: m.delta,
                        cached: CachedMove::EdgeExchange {
                            u1: solution.node_at(pos1),
                            u2: solution.node_at(solution.next_index(pos1)),
                            v1: solution.node_at(pos2),
                            v2: solution.node_at(solution.next_index(pos2)),
                        },
                    });
                }
            }
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum Orientation {
    Forward,
    Reversed,
}

fn edge_orientation(links: &CycleLinks, from: usize, to: usize) -> Option<Orientation> {
    if links.successor[from] == to {
        Some(Orientation::Forward)
    } else if links.predecessor[from] == to {
        Some(Orientation::Reversed)
    } else {
        None
    }
}

fn classify(cached: &CachedMove, solution: &Solution, links: &CycleLinks) -> Applicability {
    match *cached {
        CachedMove::EdgeExchange { u1, u2, v1, v2 } => {
            if !solution.contains(u1)
                || !solution.contains(u2)
                || !solution.contains(v1)
                || !solution.contains(v2)
            {
                return Applicability::Invalid;
            }
            let first = edge_orientation(links, u1, u2);
            let second = edge_orientation(links, v1, v2);
            match (first, second) {
                (Some(Orientation::Forward), Some(Orientation::Forward)) => {
                    Applicability::Apply(Move::IntraRouteEdgeExchange {
                        pos1: links.position[u1],
                        pos2: links.position[v1],
                    })
                }
                (Some(Orientation::Reversed), Some(Orientation::Reversed)) => {
                    Applicability::Apply(Move::IntraRouteEdgeExchange {
                        pos1: links.position[u2],
                        pos2: links.position[v2],
                    })
                }
                (Some(_), Some(_)) => Applicability::Pending,
                _ => Applicability::Invalid,
            }
        }
        CachedMove::NodeExchange {
            prev,
            node,
            next,
            new_node,
        } => {
            if !solution.contains(prev)
                || !solution.contains(node)
                || !solution.contains(next)
                || solution.contains(new_node)
            {
                return Applicability::Invalid;
            }
            let forward =
                links.successor[prev] == node && links.successor[node] == next;
            let reversed =
                links.predecessor[prev] == node && links.predecessor[node] == next;
            if forward || reversed {
                Applicability::Apply(Move::InterRouteExchange {
                    pos: links.position[node],
                    node: new_node,
                })
            } else {
                Applicability::Invalid
            }
        }
    }
}

impl Algorithm for MoveCacheLocalSearch {
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
