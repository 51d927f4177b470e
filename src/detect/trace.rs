//! Cycle reconstruction from SPFA predecessor pointers.

use super::Adjacency;
use crate::models::{RouteInfo, RouteStep};
use tracing::debug;

/// Rebuild the cycle reached by walking predecessors back from `start`.
///
/// Every walk is bounded by the vertex count. Returns `None` for any
/// inconsistency: a missing predecessor, a walk that never repeats, two equal
/// consecutive vertices, a missing edge or a route that fails validation.
pub(crate) fn trace_cycle(
    graph: &Adjacency,
    pred: &[Option<usize>],
    start: usize,
) -> Option<RouteInfo> {
    let n = graph.len();
    let mut visited = vec![false; n];

    // Walk back until a vertex repeats; that vertex is on the cycle.
    let mut v = start;
    let mut steps = 0;
    while !visited[v] {
        if steps > n {
            return None;
        }
        visited[v] = true;
        v = pred[v]?;
        steps += 1;
    }
    let cycle_start = v;

    // Collect the cycle backwards: cycle_start, pred(cycle_start), ...
    let mut backwards = vec![cycle_start];
    let mut x = pred[cycle_start]?;
    while x != cycle_start {
        if backwards.len() > n {
            return None;
        }
        if backwards.last() == Some(&x) {
            debug!(vertex = graph.name(x), "[TRACE] stale predecessor");
            return None;
        }
        backwards.push(x);
        x = pred[x]?;
    }
    backwards.push(cycle_start);
    backwards.reverse();

    let mut route = Vec::with_capacity(backwards.len() - 1);
    for pair in backwards.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if from == to {
            return None;
        }
        let edge = graph.edge(from, to)?;
        route.push(RouteStep {
            from: graph.name(from).to_string(),
            to: graph.name(to).to_string(),
            edge: *edge,
        });
    }

    match RouteInfo::new(route) {
        Ok(route) => Some(route),
        Err(e) => {
            debug!(error = %e, "[TRACE] rejected reconstructed cycle");
            None
        }
    }
}
