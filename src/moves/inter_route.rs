use crate::instance::Instance;
use crate::moves::types::{EvaluatedMove, Move};
use crate::solution::Solution;

/// Calculates the cost delta for replacing the node at cycle position `pos`
/// with the unselected `new_node`.
///
/// Returns `None` if the move is invalid (position out of range or the node
/// already covered).
pub fn evaluate_inter_route_exchange(
    solution: &Solution,
    instance: &Instance,
    pos: usize,
    new_node: usize,
) -> Option<EvaluatedMove> {
    let n = solution.len();
    if pos >= n || solution.contains(new_node) {
        return None;
    }

    let old_node = solution.node_at(pos);
    let node_cost_delta = instance.cost(new_node) - instance.cost(old_node);

    // A cycle of one node has no edges; only the service cost changes.
    if n == 1 {
        return Some(EvaluatedMove {
            move_type: Move::InterRouteExchange {
                pos,
                node: new_node,
            },
            delta: node_cost_delta,
        });
    }

    let prev = solution.node_at(solution.prev_index(pos));
    let next = solution.node_at(solution.next_index(pos));

    let delta = node_cost_delta - instance.distance(prev, old_node)
        - instance.distance(old_node, next)
        + instance.distance(prev, new_node)
        + instance.distance(new_node, next);

    Some(EvaluatedMove {
        move_type: Move::InterRouteExchange {
            pos,
            node: new_node,
        },
        delta,
    })
}
